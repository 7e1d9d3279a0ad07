//! Transform stage: raw postings in, `jobs` and `job_skills` rows out.
//!
//! Everything here is pure and synchronous. Malformed postings are excluded
//! or defaulted, never turned into errors; the only fallible operation is
//! loading an external skill vocabulary.

pub mod dedup;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod skills;

pub use dedup::{dedupe_postings, DedupStats, Deduped, KeyedPosting};
pub use error::TransformError;
pub use normalize::{classify_level, normalize_company, UNKNOWN_COMPANY};
pub use pipeline::{transform_postings, TransformOutput, TransformStats};
pub use skills::{KeywordSkillExtractor, SkillEntry, SkillExtractor, SkillVocabulary};
