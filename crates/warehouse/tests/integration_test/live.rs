use chrono::NaiveDate;
use serde_json::json;

use skillboard_core::config::load_dotenv;
use skillboard_core::{Config, Level, RawPosting, Section};
use skillboard_transform::{transform_postings, KeywordSkillExtractor, TransformOutput};
use skillboard_warehouse::{level_breakdown, QueryCache, Warehouse, SKILL_LEVEL_COMPANY_SQL};

async fn connect() -> Warehouse {
    load_dotenv();
    let config = Config::from_env().unwrap();
    config.require(&[Section::Warehouse]).unwrap();
    let warehouse = Warehouse::connect(&config.warehouse).await.unwrap();
    warehouse.ensure_schema().await.unwrap();
    warehouse
}

fn batch(title: &str) -> TransformOutput {
    let postings = vec![RawPosting::new(json!({
        "id": "skillboard-live-1",
        "company": {"display_name": "Livetest Ltd"},
        "title": title,
        "description": "Python and Kubernetes every day",
        "created": "2024-06-01T00:00:00Z",
        "location": {"display_name": "Leeds"}
    }))];
    let extractor = KeywordSkillExtractor::builtin().unwrap();
    transform_postings(&postings, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(), &extractor)
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL warehouse"]
async fn test_check_connection_sees_jobs_table() {
    let warehouse = connect().await;
    let info = warehouse.check_connection().await.unwrap();
    assert!(info.jobs_table_exists);
    assert!(info.version.contains("PostgreSQL"));
    warehouse.close().await;
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL warehouse"]
async fn test_reload_updates_existing_job() {
    let warehouse = connect().await;

    let first = warehouse.load(&batch("Junior Engineer")).await.unwrap();
    assert_eq!(first.jobs_staged, 1);
    assert_eq!(first.jobs_merged, 1);

    let second = warehouse.load(&batch("Senior Engineer")).await.unwrap();
    assert_eq!(second.jobs_merged, 1);

    let (level, count): (String, i64) = sqlx::query_as(
        "SELECT MAX(level), COUNT(*) FROM jobs WHERE job_id = 'skillboard-live-1'",
    )
    .fetch_one(warehouse.pool())
    .await
    .unwrap();
    assert_eq!(level, Level::Senior.as_str());
    assert_eq!(count, 1);

    warehouse.close().await;
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL warehouse"]
async fn test_dashboard_counts_loaded_company() {
    let warehouse = connect().await;
    warehouse.load(&batch("Senior Engineer")).await.unwrap();

    let dashboard = skillboard_warehouse::Dashboard::new(
        warehouse,
        QueryCache::new(std::time::Duration::from_secs(600), 8),
    );
    let rows = dashboard.query(SKILL_LEVEL_COMPANY_SQL).await.unwrap();
    let python = level_breakdown(&rows, "Python");
    assert!(python.iter().any(|c| c.level == Level::Senior && c.company_count >= 1));

    dashboard.into_runner().close().await;
}
