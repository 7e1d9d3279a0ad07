use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use skillboard_core::{JobRecord, RawPosting, SkillRecord};

use crate::dedup::dedupe_postings;
use crate::normalize::{classify_level, normalize_company};
use crate::skills::SkillExtractor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub input: usize,
    pub missing_id: usize,
    pub duplicates: usize,
    pub jobs: usize,
    pub skills: usize,
}

/// The two datasets produced from one raw batch.
#[derive(Debug, Clone, Default)]
pub struct TransformOutput {
    pub jobs: Vec<JobRecord>,
    pub skills: Vec<SkillRecord>,
    pub stats: TransformStats,
}

impl TransformOutput {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Turn a raw batch into `jobs` and `job_skills` rows.
///
/// Postings are deduplicated first; every survivor yields one job row and
/// one skill row per distinct skill found in its title and description.
/// Missing fields default to empty text (or `"Unknown"` for the company).
pub fn transform_postings(
    postings: &[RawPosting],
    ingestion_date: NaiveDate,
    extractor: &dyn SkillExtractor,
) -> TransformOutput {
    let deduped = dedupe_postings(postings);
    info!(
        input = deduped.stats.input,
        kept = deduped.len(),
        missing_id = deduped.stats.missing_id,
        duplicates = deduped.stats.duplicates,
        "Deduped to {} jobs",
        deduped.len()
    );

    let mut jobs = Vec::with_capacity(deduped.len());
    let mut skills = Vec::new();

    for keyed in deduped.iter() {
        let posting = keyed.posting;
        let title = posting.title().unwrap_or_default();
        let description = posting.description().unwrap_or_default();

        jobs.push(JobRecord {
            job_id: keyed.id.to_string(),
            company: normalize_company(posting.company_name().unwrap_or_default()),
            title: title.to_string(),
            level: classify_level(title, description),
            posted_date: posting.created().unwrap_or_default().to_string(),
            location: posting.location_name().unwrap_or_default().to_string(),
            raw_payload: posting.to_payload(),
            ingested_at: ingestion_date,
        });

        let found = extractor.extract(&format!("{title} {description}"));
        debug!(job_id = keyed.id, skills = found.len(), "extracted skills");
        skills.extend(found.into_iter().map(|skill| SkillRecord {
            job_id: keyed.id.to_string(),
            skill,
            ingested_at: ingestion_date,
        }));
    }

    let stats = TransformStats {
        input: deduped.stats.input,
        missing_id: deduped.stats.missing_id,
        duplicates: deduped.stats.duplicates,
        jobs: jobs.len(),
        skills: skills.len(),
    };
    info!(jobs = stats.jobs, skills = stats.skills, %ingestion_date, "transform complete");

    TransformOutput {
        jobs,
        skills,
        stats,
    }
}
