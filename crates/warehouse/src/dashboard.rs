use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use skillboard_core::Level;

use crate::cache::QueryCache;
use crate::client::Warehouse;
use crate::error::WarehouseError;
use crate::query::QueryResult;

/// Distinct companies mentioning each skill, per seniority level.
pub const SKILL_LEVEL_COMPANY_SQL: &str = "
SELECT
  js.skill AS skill,
  j.level AS level,
  COUNT(DISTINCT j.company) AS company_count
FROM job_skills js
JOIN jobs j
  ON js.job_id = j.job_id
WHERE j.company IS NOT NULL
GROUP BY js.skill, j.level
ORDER BY js.skill, company_count DESC";

/// The 25 skills mentioned by the most distinct companies.
pub const TOP_SKILLS_SQL: &str = "
SELECT
  js.skill AS skill,
  COUNT(DISTINCT j.company) AS distinct_companies
FROM job_skills js
JOIN jobs j
  ON js.job_id = j.job_id
WHERE j.company IS NOT NULL
GROUP BY js.skill
ORDER BY distinct_companies DESC
LIMIT 25";

/// Anything that can run a read-only query and return its rows.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run_query(&self, sql: &str) -> Result<QueryResult, WarehouseError>;
}

#[async_trait]
impl QueryRunner for Warehouse {
    async fn run_query(&self, sql: &str) -> Result<QueryResult, WarehouseError> {
        let rows = sqlx::query(sql).fetch_all(self.pool()).await?;
        Ok(QueryResult::from_rows(&rows))
    }
}

/// Company count for one level of one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelCount {
    pub level: Level,
    pub company_count: u64,
}

/// Cached dashboard queries over the warehouse.
pub struct Dashboard<R> {
    runner: R,
    cache: QueryCache,
}

impl<R: QueryRunner> Dashboard<R> {
    pub fn new(runner: R, cache: QueryCache) -> Self {
        Self { runner, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run `sql`, answering from the cache while the entry is fresh.
    pub async fn query(&self, sql: &str) -> Result<QueryResult, WarehouseError> {
        if let Some(result) = self.cache.get(sql) {
            debug!(rows = result.row_count(), "dashboard cache hit");
            return Ok(result);
        }
        let result = self.runner.run_query(sql).await?;
        info!(rows = result.row_count(), "dashboard query ran");
        self.cache.put(sql, result.clone());
        Ok(result)
    }

    pub async fn skill_level_companies(&self) -> Result<QueryResult, WarehouseError> {
        self.query(SKILL_LEVEL_COMPANY_SQL).await
    }

    pub async fn top_skills(&self) -> Result<QueryResult, WarehouseError> {
        self.query(TOP_SKILLS_SQL).await
    }

    /// Sorted distinct skill names.
    pub async fn skills(&self) -> Result<Vec<String>, WarehouseError> {
        Ok(distinct_skills(&self.skill_level_companies().await?))
    }

    pub async fn skill_breakdown(&self, skill: &str) -> Result<Vec<LevelCount>, WarehouseError> {
        Ok(level_breakdown(&self.skill_level_companies().await?, skill))
    }

    /// Drop every cached result so the next queries hit the warehouse.
    pub fn refresh(&self) {
        self.cache.clear();
    }
}

pub fn distinct_skills(result: &QueryResult) -> Vec<String> {
    let names: BTreeSet<&str> = (0..result.row_count())
        .filter_map(|row| result.get_value(row, "skill"))
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Company counts for `skill` over `entry, mid, senior`, in that order.
///
/// Levels with no row count as 0, as do counts that do not parse. Rows
/// with an unrecognized level are ignored.
pub fn level_breakdown(result: &QueryResult, skill: &str) -> Vec<LevelCount> {
    let mut counts = [0u64; 3];
    for row in 0..result.row_count() {
        if result.get_value(row, "skill") != Some(skill) {
            continue;
        }
        let Some(level) = result
            .get_value(row, "level")
            .and_then(|l| Level::from_str(l).ok())
        else {
            continue;
        };
        let count = result
            .get_value(row, "company_count")
            .and_then(|c| c.trim().parse::<u64>().ok())
            .unwrap_or(0);
        if let Some(idx) = Level::ALL.iter().position(|l| *l == level) {
            counts[idx] += count;
        }
    }

    Level::ALL
        .iter()
        .zip(counts)
        .map(|(level, company_count)| LevelCount {
            level: *level,
            company_count,
        })
        .collect()
}
