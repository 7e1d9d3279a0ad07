use std::fmt;
use std::sync::Arc;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::info;

use skillboard_core::config::WarehouseConfig;

use crate::error::WarehouseError;

/// Connection to the warehouse database.
///
/// Built explicitly per run and closed with [`Warehouse::close`] when the
/// run ends. Every pooled connection assumes the configured role and uses
/// the configured schema as its search path.
pub struct Warehouse {
    pool: PgPool,
    schema: String,
}

/// Session facts reported by [`Warehouse::check_connection`].
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub version: String,
    pub user: String,
    pub role: String,
    pub database: String,
    pub schema: Option<String>,
    pub jobs_table_exists: bool,
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "version:  {}", self.version)?;
        writeln!(f, "user:     {} (role {})", self.user, self.role)?;
        writeln!(f, "database: {}", self.database)?;
        writeln!(f, "schema:   {}", self.schema.as_deref().unwrap_or("(none)"))?;
        write!(f, "jobs table: {}", if self.jobs_table_exists { "present" } else { "missing" })
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, WarehouseError> {
    value
        .as_deref()
        .ok_or_else(|| WarehouseError::NotConfigured(format!("{key} not set")))
}

/// Quote an SQL identifier for statements that cannot take bind parameters.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Statements run on every new pooled connection.
fn session_statements(role: &str, schema: &str) -> Vec<String> {
    vec![
        format!("SET ROLE {}", quote_ident(role)),
        format!("SET search_path TO {}", quote_ident(schema)),
    ]
}

impl Warehouse {
    pub async fn connect(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let host = required(&config.host, "WAREHOUSE_HOST")?;
        let user = required(&config.user, "WAREHOUSE_USER")?;
        let password = required(&config.password, "WAREHOUSE_PASSWORD")?;
        let database = required(&config.database, "WAREHOUSE_DATABASE")?;
        let role = required(&config.role, "WAREHOUSE_ROLE")?;
        let schema = required(&config.schema, "WAREHOUSE_SCHEMA")?;

        let ssl_mode: PgSslMode = config.ssl_mode.parse().map_err(|_| {
            WarehouseError::NotConfigured(format!("invalid WAREHOUSE_SSL_MODE {:?}", config.ssl_mode))
        })?;

        let options = PgConnectOptions::new()
            .host(host)
            .port(config.port)
            .username(user)
            .password(password)
            .database(database)
            .ssl_mode(ssl_mode)
            .application_name("skillboard");

        let statements = Arc::new(session_statements(role, schema));
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .after_connect(move |conn, _meta| {
                let statements = statements.clone();
                Box::pin(async move {
                    for stmt in statements.iter() {
                        sqlx::query(stmt.as_str()).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;

        info!(host = %host, database = %database, schema = %schema, "warehouse connected");
        Ok(Self {
            pool,
            schema: schema.to_string(),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema if needed and apply the table migrations.
    pub async fn ensure_schema(&self) -> Result<(), WarehouseError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema)))
            .execute(&self.pool)
            .await?;
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!(schema = %self.schema, "warehouse schema up to date");
        Ok(())
    }

    pub async fn check_connection(&self) -> Result<ConnectionInfo, WarehouseError> {
        let (version, user, role, database, schema, jobs_table_exists) =
            sqlx::query_as::<_, (String, String, String, String, Option<String>, bool)>(
                "SELECT version(), session_user::text, current_user::text,
                        current_database()::text, current_schema()::text,
                        to_regclass('jobs') IS NOT NULL",
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(ConnectionInfo {
            version,
            user,
            role,
            database,
            schema,
            jobs_table_exists,
        })
    }

    /// Release every pooled connection.
    pub async fn close(self) {
        self.pool.close().await;
        info!("warehouse connection closed");
    }
}
