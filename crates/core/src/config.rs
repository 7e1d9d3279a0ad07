use std::collections::{BTreeSet, HashMap};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Snapshot of the variables a config is built from.
///
/// Every lookup is profiled: with profile `PROD`, `PROD_{KEY}` is tried
/// before `{KEY}`.
struct EnvVars<'a> {
    profile: &'a str,
    vars: &'a HashMap<String, String>,
}

impl EnvVars<'_> {
    fn opt(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            let prefixed = format!("{}_{}", self.profile, key);
            if let Some(v) = self.vars.get(&prefixed).filter(|v| !v.is_empty()) {
                return Some(v.clone());
            }
        }
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> T {
        self.opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Config sections a command can demand before doing any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Adzuna,
    Storage,
    Warehouse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub adzuna: AdzunaConfig,
    pub storage: StorageConfig,
    pub aws: AwsConfig,
    pub warehouse: WarehouseConfig,
    pub transform: TransformConfig,
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SKILLBOARD_PROFILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars().collect();
        let profile = vars
            .get("SKILLBOARD_PROFILE")
            .map(|p| p.to_uppercase())
            .unwrap_or_default();
        Self::from_vars(&profile, &vars)
    }

    /// Build config from an explicit variable map for a named profile.
    pub fn from_vars(profile: &str, vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let profile = profile.to_uppercase();
        let env = EnvVars {
            profile: &profile,
            vars,
        };
        Ok(Self {
            adzuna: AdzunaConfig::from_env(&env),
            storage: StorageConfig::from_env(&env)?,
            aws: AwsConfig::from_env(&env),
            warehouse: WarehouseConfig::from_env(&env),
            transform: TransformConfig::from_env(&env),
            dashboard: DashboardConfig::from_env(&env),
            profile,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Fail with every missing key of the requested sections.
    pub fn require(&self, sections: &[Section]) -> Result<(), ConfigError> {
        let mut missing = BTreeSet::new();
        for section in sections {
            let keys = match section {
                Section::Adzuna => self.adzuna.missing_keys(),
                Section::Storage => match self.storage.backend {
                    StorageKind::Local => Vec::new(),
                    StorageKind::S3 => self.aws.missing_keys(),
                },
                Section::Warehouse => self.warehouse.missing_keys(),
            };
            missing.extend(keys.into_iter().map(str::to_string));
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing.into_iter().collect()))
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  adzuna:     country={}, query={:?}, pages={}",
            self.adzuna.country,
            self.adzuna.query,
            self.adzuna.max_pages
        );
        match self.storage.backend {
            StorageKind::Local => {
                tracing::info!("  storage:    local data_dir={}", self.storage.data_dir.display())
            }
            StorageKind::S3 => tracing::info!(
                "  storage:    s3 region={}, bucket={}",
                self.aws.region.as_deref().unwrap_or("(none)"),
                self.aws.s3_bucket.as_deref().unwrap_or("(none)")
            ),
        }
        tracing::info!(
            "  warehouse:  host={}, db={}, schema={}",
            self.warehouse.host.as_deref().unwrap_or("(none)"),
            self.warehouse.database.as_deref().unwrap_or("(none)"),
            self.warehouse.schema.as_deref().unwrap_or("(none)")
        );
        tracing::info!("  dashboard:  cache_ttl={}s", self.dashboard.cache_ttl_secs);
    }
}

fn missing<'k>(fields: &[(&'k str, &Option<String>)]) -> Vec<&'k str> {
    fields
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| *k)
        .collect()
}

// ── Adzuna ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdzunaConfig {
    pub app_id: Option<String>,
    #[serde(skip_serializing)]
    pub app_key: Option<String>,
    pub base_url: String,
    pub country: String,
    pub query: String,
    pub location: String,
    pub results_per_page: u32,
    pub max_pages: u32,
    pub max_retries: u32,
    /// Pause between pages; retries back off by multiples of it.
    pub rate_limit_ms: u64,
}

impl AdzunaConfig {
    fn from_env(env: &EnvVars<'_>) -> Self {
        Self {
            app_id: env.opt("ADZUNA_APP_ID"),
            app_key: env.opt("ADZUNA_APP_KEY"),
            base_url: env.or("ADZUNA_BASE_URL", "https://api.adzuna.com/v1/api/jobs"),
            country: env.or("ADZUNA_COUNTRY", "us"),
            query: env.or("FETCH_QUERY", "software"),
            location: env.or("FETCH_LOCATION", ""),
            results_per_page: env.parse_or("FETCH_RESULTS_PER_PAGE", 50),
            max_pages: env.parse_or("FETCH_MAX_PAGES", 10),
            max_retries: env.parse_or("FETCH_MAX_RETRIES", 3),
            rate_limit_ms: env.parse_or("FETCH_RATE_LIMIT_MS", 1200),
        }
    }

    fn missing_keys(&self) -> Vec<&'static str> {
        missing(&[("ADZUNA_APP_ID", &self.app_id), ("ADZUNA_APP_KEY", &self.app_key)])
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageKind,
    /// Root of the local backend.
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env(env: &EnvVars<'_>) -> Result<Self, ConfigError> {
        let backend = match env.or("STORAGE_BACKEND", "s3").to_lowercase().as_str() {
            "s3" => StorageKind::S3,
            "local" => StorageKind::Local,
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND".into(),
                    value: other.to_string(),
                })
            }
        };
        Ok(Self {
            backend,
            data_dir: PathBuf::from(env.or("DATA_DIR", "data")),
        })
    }
}

// ── AWS / S3 ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_prefix: Option<String>,
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    fn from_env(env: &EnvVars<'_>) -> Self {
        Self {
            region: env.opt("AWS_REGION"),
            access_key_id: env.opt("AWS_ACCESS_KEY_ID"),
            secret_access_key: env.opt("AWS_SECRET_ACCESS_KEY"),
            session_token: env.opt("AWS_SESSION_TOKEN"),
            s3_bucket: env.opt("S3_BUCKET"),
            s3_prefix: env.opt("S3_PREFIX"),
            endpoint_url: env.opt("AWS_ENDPOINT_URL"),
        }
    }

    fn missing_keys(&self) -> Vec<&'static str> {
        missing(&[
            ("AWS_REGION", &self.region),
            ("AWS_ACCESS_KEY_ID", &self.access_key_id),
            ("AWS_SECRET_ACCESS_KEY", &self.secret_access_key),
            ("S3_BUCKET", &self.s3_bucket),
        ])
    }
}

// ── Warehouse (PostgreSQL) ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub role: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub ssl_mode: String,
    pub max_connections: u32,
}

impl WarehouseConfig {
    fn from_env(env: &EnvVars<'_>) -> Self {
        Self {
            host: env.opt("WAREHOUSE_HOST"),
            port: env.parse_or("WAREHOUSE_PORT", 5432),
            user: env.opt("WAREHOUSE_USER"),
            password: env.opt("WAREHOUSE_PASSWORD"),
            role: env.opt("WAREHOUSE_ROLE"),
            database: env.opt("WAREHOUSE_DATABASE"),
            schema: env.opt("WAREHOUSE_SCHEMA"),
            ssl_mode: env.or("WAREHOUSE_SSL_MODE", "prefer"),
            max_connections: env.parse_or("WAREHOUSE_MAX_CONNECTIONS", 4),
        }
    }

    fn missing_keys(&self) -> Vec<&'static str> {
        missing(&[
            ("WAREHOUSE_HOST", &self.host),
            ("WAREHOUSE_USER", &self.user),
            ("WAREHOUSE_PASSWORD", &self.password),
            ("WAREHOUSE_ROLE", &self.role),
            ("WAREHOUSE_DATABASE", &self.database),
            ("WAREHOUSE_SCHEMA", &self.schema),
        ])
    }
}

// ── Transform ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// TOML skill vocabulary; the built-in list is used when unset.
    pub vocabulary_path: Option<PathBuf>,
}

impl TransformConfig {
    fn from_env(env: &EnvVars<'_>) -> Self {
        Self {
            vocabulary_path: env.opt("SKILL_VOCABULARY_PATH").map(PathBuf::from),
        }
    }
}

// ── Dashboard ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl DashboardConfig {
    fn from_env(env: &EnvVars<'_>) -> Self {
        Self {
            cache_ttl_secs: env.parse_or("QUERY_CACHE_TTL_SECS", 600),
            cache_capacity: env.parse_or("QUERY_CACHE_CAPACITY", 64),
        }
    }
}
