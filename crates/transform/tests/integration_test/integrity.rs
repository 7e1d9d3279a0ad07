use std::collections::{HashMap, HashSet};

use serde_json::json;

use skillboard_core::RawPosting;
use skillboard_transform::transform_postings;

use crate::helpers::{batch_date, extractor};

fn mixed_batch() -> Vec<RawPosting> {
    let titles = [
        "Senior Python Engineer",
        "Junior React Developer",
        "Staff Kubernetes SRE",
        "Associate Data Analyst",
        "Office Manager",
    ];
    let descriptions = [
        "Python, AWS, Docker and Terraform",
        "React, TypeScript, Node.js",
        "k8s, Go via golang, Linux",
        "SQL, Excel and Power BI",
        "Calendars and coffee",
    ];

    let mut batch = Vec::new();
    for round in 0..3 {
        for (i, (title, description)) in titles.iter().zip(descriptions).enumerate() {
            // Rounds 1 and 2 repeat ids from round 0 with different text.
            let id = if round == 0 { format!("job-{i}") } else { format!("job-{}", (i + round) % 7) };
            batch.push(RawPosting::new(json!({
                "id": id,
                "company": { "display_name": format!("Company {i} Inc") },
                "title": title,
                "description": description,
            })));
        }
        batch.push(RawPosting::new(json!({ "title": "No id at all" })));
    }
    batch
}

#[test]
fn test_job_ids_are_unique() {
    let out = transform_postings(&mixed_batch(), batch_date(), &extractor());
    let ids: HashSet<&str> = out.jobs.iter().map(|j| j.job_id.as_str()).collect();
    assert_eq!(ids.len(), out.jobs.len());
    assert_eq!(out.stats.jobs, out.jobs.len());
}

#[test]
fn test_every_skill_refers_to_exactly_one_job() {
    let out = transform_postings(&mixed_batch(), batch_date(), &extractor());
    let mut job_counts: HashMap<&str, usize> = HashMap::new();
    for job in &out.jobs {
        *job_counts.entry(job.job_id.as_str()).or_default() += 1;
    }
    assert!(!out.skills.is_empty());
    for skill in &out.skills {
        assert_eq!(job_counts.get(skill.job_id.as_str()), Some(&1), "orphan skill {skill:?}");
    }
}

#[test]
fn test_skill_pairs_are_unique() {
    let out = transform_postings(&mixed_batch(), batch_date(), &extractor());
    let pairs: HashSet<(&str, &str)> = out
        .skills
        .iter()
        .map(|s| (s.job_id.as_str(), s.skill.as_str()))
        .collect();
    assert_eq!(pairs.len(), out.skills.len());
}

#[test]
fn test_stats_account_for_every_input() {
    let batch = mixed_batch();
    let out = transform_postings(&batch, batch_date(), &extractor());
    let stats = out.stats;
    assert_eq!(stats.input, batch.len());
    assert_eq!(stats.missing_id, 3);
    assert_eq!(stats.jobs + stats.duplicates + stats.missing_id, stats.input);
    assert_eq!(stats.skills, out.skills.len());
}
