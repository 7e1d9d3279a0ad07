use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ParseLevelError;

/// Coarse seniority bucket derived from posting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Entry,
    Mid,
    Senior,
}

impl Level {
    /// Display order used by dashboards.
    pub const ALL: [Level; 3] = [Level::Entry, Level::Mid, Level::Senior];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Entry => "entry",
            Level::Mid => "mid",
            Level::Senior => "senior",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" => Ok(Level::Entry),
            "mid" => Ok(Level::Mid),
            "senior" => Ok(Level::Senior),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Normalized posting, one row of the `jobs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub company: String,
    pub title: String,
    pub level: Level,
    pub posted_date: String,
    pub location: String,
    /// Serialized original posting.
    pub raw_payload: String,
    pub ingested_at: NaiveDate,
}

/// One skill mentioned by a posting, one row of the `job_skills` table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillRecord {
    pub job_id: String,
    pub skill: String,
    pub ingested_at: NaiveDate,
}
