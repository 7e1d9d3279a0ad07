use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use skillboard_core::{Config, RawPosting};
use skillboard_ingest::{AdzunaClient, SearchParams};
use skillboard_storage::{RawStore, StorageBackend};
use skillboard_transform::{
    transform_postings, KeywordSkillExtractor, SkillVocabulary, TransformOutput,
};
use skillboard_warehouse::{Dashboard, LoadReport, QueryCache, Warehouse};

fn extractor(config: &Config) -> Result<KeywordSkillExtractor> {
    let vocabulary = match &config.transform.vocabulary_path {
        Some(path) => SkillVocabulary::load(path)
            .with_context(|| format!("failed to load skill vocabulary {}", path.display()))?,
        None => SkillVocabulary::builtin(),
    };
    let extractor =
        KeywordSkillExtractor::new(&vocabulary).context("invalid skill vocabulary")?;
    info!(skills = extractor.skill_count(), "skill vocabulary ready");
    Ok(extractor)
}

/// Fetch postings and store them as the raw batch for `date`.
pub async fn fetch(config: &Config, date: NaiveDate) -> Result<Vec<RawPosting>> {
    let client = AdzunaClient::new(&config.adzuna).context("failed to build Adzuna client")?;
    let report = client.fetch_jobs(&SearchParams::from(&config.adzuna)).await;
    if !report.failed_pages.is_empty() {
        warn!(pages = ?report.failed_pages, "some pages were skipped");
    }

    let backend = StorageBackend::from_config(config)?;
    let key = RawStore::write_raw(&backend, &report.postings, date)
        .await
        .context("failed to store raw batch")?;
    info!(key = %key, jobs = report.postings.len(), "raw batch stored");
    Ok(report.postings)
}

async fn read_batch(config: &Config, date: NaiveDate) -> Result<Vec<RawPosting>> {
    let backend = StorageBackend::from_config(config)?;
    RawStore::read_raw(&backend, date)
        .await
        .with_context(|| format!("failed to read raw batch for {date}"))
}

pub async fn transform(config: &Config, date: NaiveDate) -> Result<TransformOutput> {
    let extractor = extractor(config)?;
    let postings = read_batch(config, date).await?;
    let output = transform_postings(&postings, date, &extractor);
    println!("{}", serde_json::to_string_pretty(&output.stats)?);
    Ok(output)
}

async fn load_output(config: &Config, output: &TransformOutput) -> Result<LoadReport> {
    let warehouse = Warehouse::connect(&config.warehouse)
        .await
        .context("failed to connect to warehouse")?;

    let result = async {
        warehouse.ensure_schema().await?;
        warehouse.load(output).await
    }
    .await;
    warehouse.close().await;

    let report = result.context("warehouse load failed")?;
    info!(
        jobs = report.jobs_merged,
        skills = report.skills_merged,
        "Data loaded to warehouse successfully."
    );
    Ok(report)
}

/// Transform the stored batch for `date` and merge it into the warehouse.
pub async fn load(config: &Config, date: NaiveDate) -> Result<LoadReport> {
    let extractor = extractor(config)?;
    let postings = read_batch(config, date).await?;
    let output = transform_postings(&postings, date, &extractor);
    load_output(config, &output).await
}

/// Full pipeline for one ingestion date.
///
/// The transform reads back the stored batch rather than the in-memory
/// fetch result, so a run is reproducible from storage alone.
pub async fn run(config: &Config, date: NaiveDate) -> Result<LoadReport> {
    let fetched = fetch(config, date).await?;
    info!(jobs = fetched.len(), "fetch stage complete");
    load(config, date).await
}

pub async fn check(config: &Config) -> Result<()> {
    let warehouse = Warehouse::connect(&config.warehouse)
        .await
        .context("failed to connect to warehouse")?;
    let result = warehouse.check_connection().await;
    warehouse.close().await;

    println!("{}", result.context("connection check failed")?);
    Ok(())
}

pub async fn report(config: &Config, skill: Option<&str>, json: bool) -> Result<()> {
    let warehouse = Warehouse::connect(&config.warehouse)
        .await
        .context("failed to connect to warehouse")?;
    let dashboard = Dashboard::new(
        warehouse,
        QueryCache::new(
            Duration::from_secs(config.dashboard.cache_ttl_secs),
            config.dashboard.cache_capacity,
        ),
    );

    let result = print_report(&dashboard, skill, json).await;
    dashboard.into_runner().close().await;
    result
}

async fn print_report(
    dashboard: &Dashboard<Warehouse>,
    skill: Option<&str>,
    json: bool,
) -> Result<()> {
    let skills = dashboard.skills().await?;
    if skills.is_empty() {
        warn!("No data returned. Verify the jobs and job_skills tables have rows.");
        return Ok(());
    }

    let selected = match skill {
        Some(s) => s.to_string(),
        None => skills[0].clone(),
    };
    let breakdown = dashboard.skill_breakdown(&selected).await?;
    let top = dashboard.top_skills().await?;

    if json {
        let body = serde_json::json!({
            "skill": selected,
            "levels": breakdown,
            "top_skills": top,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("Distinct companies requesting {selected} by seniority");
    for count in &breakdown {
        println!("  {:<7} {}", count.level.as_str(), count.company_count);
    }
    println!();
    println!("Top skills (distinct companies)");
    println!("{top}");
    Ok(())
}

pub async fn dates(config: &Config) -> Result<()> {
    let backend = StorageBackend::from_config(config)?;
    for date in RawStore::list_ingestion_dates(&backend).await? {
        println!("{date}");
    }
    Ok(())
}
