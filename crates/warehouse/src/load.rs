use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use skillboard_core::{JobRecord, SkillRecord};
use skillboard_transform::TransformOutput;

use crate::client::Warehouse;
use crate::error::WarehouseError;

/// Rows per INSERT statement; keeps each statement under the bind limit.
const STAGE_CHUNK_ROWS: usize = 1000;

const MERGE_JOBS_SQL: &str = "
MERGE INTO jobs tgt
USING jobs_stage src
ON tgt.job_id = src.job_id
WHEN MATCHED THEN UPDATE SET
    company = src.company,
    title = src.title,
    level = src.level,
    posted_date = src.posted_date,
    location = src.location,
    raw_payload = src.raw_payload,
    ingested_at = src.ingested_at
WHEN NOT MATCHED THEN INSERT (
    job_id, company, title, level, posted_date, location, raw_payload, ingested_at
) VALUES (
    src.job_id, src.company, src.title, src.level, src.posted_date, src.location,
    src.raw_payload, src.ingested_at
)";

const MERGE_SKILLS_SQL: &str = "
MERGE INTO job_skills tgt
USING job_skills_stage src
ON tgt.job_id = src.job_id AND tgt.skill = src.skill
WHEN MATCHED THEN UPDATE SET
    ingested_at = src.ingested_at
WHEN NOT MATCHED THEN INSERT (job_id, skill, ingested_at)
VALUES (src.job_id, src.skill, src.ingested_at)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub jobs_staged: usize,
    pub skills_staged: usize,
    /// Rows inserted or updated in `jobs`.
    pub jobs_merged: u64,
    /// Rows inserted or updated in `job_skills`.
    pub skills_merged: u64,
}

fn jobs_insert(chunk: &[JobRecord]) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(
        "INSERT INTO jobs_stage \
         (job_id, company, title, level, posted_date, location, raw_payload, ingested_at) ",
    );
    qb.push_values(chunk, |mut row, job| {
        row.push_bind(&job.job_id)
            .push_bind(&job.company)
            .push_bind(&job.title)
            .push_bind(job.level.as_str())
            .push_bind(&job.posted_date)
            .push_bind(&job.location)
            .push_bind(&job.raw_payload)
            .push_bind(job.ingested_at);
    });
    qb
}

fn skills_insert(chunk: &[SkillRecord]) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO job_skills_stage (job_id, skill, ingested_at) ");
    qb.push_values(chunk, |mut row, skill| {
        row.push_bind(&skill.job_id)
            .push_bind(&skill.skill)
            .push_bind(skill.ingested_at);
    });
    qb
}

impl Warehouse {
    pub async fn truncate_stage(&self) -> Result<(), WarehouseError> {
        info!("Truncating stage tables...");
        sqlx::query("TRUNCATE TABLE jobs_stage, job_skills_stage")
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Insert a transform batch into the staging tables in one transaction.
    pub async fn write_stage(&self, output: &TransformOutput) -> Result<(), WarehouseError> {
        let mut tx = self.pool().begin().await?;

        info!("Writing {} jobs to jobs_stage...", output.jobs.len());
        for chunk in output.jobs.chunks(STAGE_CHUNK_ROWS) {
            jobs_insert(chunk).build().execute(&mut *tx).await?;
        }

        info!("Writing {} skills to job_skills_stage...", output.skills.len());
        for chunk in output.skills.chunks(STAGE_CHUNK_ROWS) {
            skills_insert(chunk).build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Upsert staged rows into `jobs` and `job_skills`.
    ///
    /// Jobs match on `job_id` and take every staged column; skills match on
    /// `(job_id, skill)` and only refresh `ingested_at`. Both statements
    /// commit together.
    pub async fn merge_stage(&self) -> Result<(u64, u64), WarehouseError> {
        let mut tx = self.pool().begin().await?;

        info!("Merging jobs_stage into jobs...");
        let jobs = sqlx::query(MERGE_JOBS_SQL).execute(&mut *tx).await?;

        info!("Merging job_skills_stage into job_skills...");
        let skills = sqlx::query(MERGE_SKILLS_SQL).execute(&mut *tx).await?;

        tx.commit().await?;
        info!(
            jobs = jobs.rows_affected(),
            skills = skills.rows_affected(),
            "Merge complete."
        );
        Ok((jobs.rows_affected(), skills.rows_affected()))
    }

    /// Truncate, stage, then merge one batch.
    ///
    /// A failure before the merge leaves `jobs` and `job_skills` untouched.
    pub async fn load(&self, output: &TransformOutput) -> Result<LoadReport, WarehouseError> {
        self.truncate_stage().await?;
        self.write_stage(output).await?;
        let (jobs_merged, skills_merged) = self.merge_stage().await?;

        Ok(LoadReport {
            jobs_staged: output.jobs.len(),
            skills_staged: output.skills.len(),
            jobs_merged,
            skills_merged,
        })
    }
}
