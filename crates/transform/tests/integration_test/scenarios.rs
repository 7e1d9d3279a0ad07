use skillboard_core::Level;
use skillboard_transform::{transform_postings, UNKNOWN_COMPANY};

use crate::helpers::{batch_date, extractor, postings};

#[test]
fn test_senior_python_posting() {
    let input = postings(
        r#"[{"id":"1","company":{"display_name":"Acme, Inc."},"title":"Senior Python Engineer",
            "description":"Looking for a senior engineer skilled in Python and AWS"}]"#,
    );
    let out = transform_postings(&input, batch_date(), &extractor());

    assert_eq!(out.jobs.len(), 1);
    let job = &out.jobs[0];
    assert_eq!(job.job_id, "1");
    assert_eq!(job.company, "Acme");
    assert_eq!(job.level, Level::Senior);
    assert_eq!(job.title, "Senior Python Engineer");
    assert_eq!(job.ingested_at, batch_date());

    let skills: Vec<&str> = out.skills.iter().map(|s| s.skill.as_str()).collect();
    assert!(skills.contains(&"Python"));
    assert!(skills.contains(&"AWS"));
    assert!(out.skills.iter().all(|s| s.job_id == "1" && s.ingested_at == batch_date()));
}

#[test]
fn test_duplicate_ids_emit_one_job() {
    let input = postings(
        r#"[{"id":"1","title":"First"},{"id":"1","title":"Second"}]"#,
    );
    let out = transform_postings(&input, batch_date(), &extractor());
    assert_eq!(out.jobs.len(), 1);
    assert_eq!(out.jobs[0].title, "First");
    assert_eq!(out.stats.duplicates, 1);
}

#[test]
fn test_missing_id_is_excluded_everywhere() {
    let input = postings(
        r#"[{"title":"Rust Developer","description":"Rust and Kafka"},
            {"id":"9","title":"Go Developer","description":"golang"}]"#,
    );
    let out = transform_postings(&input, batch_date(), &extractor());
    assert_eq!(out.jobs.len(), 1);
    assert_eq!(out.jobs[0].job_id, "9");
    assert!(out.skills.iter().all(|s| s.job_id == "9"));
    assert_eq!(out.stats.missing_id, 1);
}

#[test]
fn test_no_seniority_keywords_defaults_to_mid() {
    let input = postings(r#"[{"id":"5","title":"Software Engineer","description":"Build APIs"}]"#);
    let out = transform_postings(&input, batch_date(), &extractor());
    assert_eq!(out.jobs[0].level, Level::Mid);
}

#[test]
fn test_malformed_nested_fields_default() {
    let input = postings(
        r#"[{"id":"3","company":"not-an-object","location":null,"title":null}]"#,
    );
    let out = transform_postings(&input, batch_date(), &extractor());
    let job = &out.jobs[0];
    assert_eq!(job.company, UNKNOWN_COMPANY);
    assert_eq!(job.title, "");
    assert_eq!(job.location, "");
    assert_eq!(job.posted_date, "");
    assert_eq!(job.level, Level::Mid);
    assert!(out.skills.is_empty());
}

#[test]
fn test_fields_are_carried_over() {
    let input = postings(
        r#"[{"id":"77","company":{"display_name":"Globex LLC"},"title":"Data Intern",
            "description":"SQL and Tableau","created":"2024-06-13T08:30:00Z",
            "location":{"display_name":"Denver, Colorado"},"salary_max":65000}]"#,
    );
    let out = transform_postings(&input, batch_date(), &extractor());
    let job = &out.jobs[0];
    assert_eq!(job.company, "Globex");
    assert_eq!(job.level, Level::Entry);
    assert_eq!(job.posted_date, "2024-06-13T08:30:00Z");
    assert_eq!(job.location, "Denver, Colorado");

    let payload: serde_json::Value = serde_json::from_str(&job.raw_payload).unwrap();
    assert_eq!(payload["salary_max"], 65000);
    assert_eq!(payload["id"], "77");

    let skills: Vec<&str> = out.skills.iter().map(|s| s.skill.as_str()).collect();
    assert_eq!(skills, vec!["SQL", "Tableau"]);
}

#[test]
fn test_empty_batch() {
    let out = transform_postings(&[], batch_date(), &extractor());
    assert!(out.is_empty());
    assert!(out.skills.is_empty());
    assert_eq!(out.stats.input, 0);
}
