use chrono::NaiveDate;
use serde_json::Value;

use skillboard_core::RawPosting;
use skillboard_transform::KeywordSkillExtractor;

pub fn batch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

pub fn extractor() -> KeywordSkillExtractor {
    KeywordSkillExtractor::builtin().unwrap()
}

/// Parse a JSON array literal into raw postings.
pub fn postings(json: &str) -> Vec<RawPosting> {
    let values: Vec<Value> = serde_json::from_str(json).unwrap();
    values.into_iter().map(RawPosting::new).collect()
}
