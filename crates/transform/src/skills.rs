//! Skill extraction over free text.
//!
//! The transform only relies on the [`SkillExtractor`] contract: text in,
//! distinct canonical skill names out, case-insensitive. The vocabulary is
//! maintained outside the code; a built-in list covers the common terms.

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::TransformError;

/// Extracts the set of known skills mentioned in a text.
pub trait SkillExtractor: Send + Sync {
    /// Distinct canonical skill names, never repeated for one input.
    fn extract(&self, text: &str) -> Vec<String>;
}

/// A canonical skill name and the other spellings that mean it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Ordered skill vocabulary.
///
/// TOML form:
///
/// ```toml
/// [[skill]]
/// name = "Kubernetes"
/// aliases = ["k8s"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillVocabulary {
    #[serde(rename = "skill", default)]
    pub skills: Vec<SkillEntry>,
}

const BUILTIN_SKILLS: &[(&str, &[&str])] = &[
    ("Python", &[]),
    ("Java", &[]),
    ("JavaScript", &[]),
    ("TypeScript", &[]),
    ("Go", &["golang"]),
    ("Rust", &[]),
    ("C++", &[]),
    ("C#", &[]),
    ("Scala", &[]),
    ("Kotlin", &[]),
    ("Ruby", &[]),
    ("PHP", &[]),
    ("SQL", &[]),
    ("PostgreSQL", &["postgres"]),
    ("MySQL", &[]),
    ("MongoDB", &[]),
    ("Redis", &[]),
    ("Snowflake", &[]),
    ("AWS", &["amazon web services"]),
    ("Azure", &[]),
    ("GCP", &["google cloud"]),
    ("Docker", &[]),
    ("Kubernetes", &["k8s"]),
    ("Terraform", &[]),
    ("Linux", &[]),
    ("Git", &[]),
    ("React", &["react.js", "reactjs"]),
    ("Angular", &[]),
    ("Node.js", &["nodejs"]),
    (".NET", &["dotnet"]),
    ("Spark", &["pyspark"]),
    ("Kafka", &[]),
    ("Airflow", &[]),
    ("dbt", &[]),
    ("Tableau", &[]),
    ("Power BI", &["powerbi"]),
    ("Excel", &[]),
    ("Pandas", &[]),
    ("TensorFlow", &[]),
    ("PyTorch", &[]),
    ("Machine Learning", &[]),
    ("CI/CD", &[]),
];

impl SkillVocabulary {
    /// The compiled-in vocabulary.
    pub fn builtin() -> Self {
        Self {
            skills: BUILTIN_SKILLS
                .iter()
                .map(|(name, aliases)| SkillEntry {
                    name: name.to_string(),
                    aliases: aliases.iter().map(|a| a.to_string()).collect(),
                })
                .collect(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, TransformError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, TransformError> {
        let text = std::fs::read_to_string(path)?;
        let vocabulary = Self::from_toml_str(&text)?;
        info!(path = %path.display(), skills = vocabulary.len(), "loaded skill vocabulary");
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Characters that continue a term; anything else delimits one.
const TERM_CHARS: &str = "a-z0-9+#";

/// Keyword matcher: one case-insensitive regex per canonical skill.
///
/// A term matches only when delimited by non-term characters, so `Java`
/// does not fire inside `JavaScript` and `SQL` not inside `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct KeywordSkillExtractor {
    matchers: Vec<(String, Regex)>,
}

impl KeywordSkillExtractor {
    pub fn new(vocabulary: &SkillVocabulary) -> Result<Self, TransformError> {
        let mut seen = HashSet::new();
        let mut matchers = Vec::with_capacity(vocabulary.len());

        for entry in &vocabulary.skills {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(TransformError::InvalidSkill {
                    skill: entry.name.clone(),
                    reason: "empty skill name".into(),
                });
            }
            if !seen.insert(name.to_lowercase()) {
                continue;
            }

            let terms: Vec<String> = std::iter::once(name)
                .chain(entry.aliases.iter().map(|a| a.trim()))
                .filter(|t| !t.is_empty())
                .map(regex::escape)
                .collect();
            let pattern = format!(
                "(?:^|[^{TERM_CHARS}])(?:{})(?:$|[^{TERM_CHARS}])",
                terms.join("|")
            );
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| TransformError::InvalidSkill {
                    skill: name.to_string(),
                    reason: e.to_string(),
                })?;
            matchers.push((name.to_string(), regex));
        }

        Ok(Self { matchers })
    }

    /// Extractor over [`SkillVocabulary::builtin`].
    pub fn builtin() -> Result<Self, TransformError> {
        Self::new(&SkillVocabulary::builtin())
    }

    pub fn skill_count(&self) -> usize {
        self.matchers.len()
    }
}

impl SkillExtractor for KeywordSkillExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        self.matchers
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(name, _)| name.clone())
            .collect()
    }
}
