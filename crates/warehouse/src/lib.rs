//! PostgreSQL warehouse: staged MERGE loads and cached dashboard queries.

pub mod cache;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod load;
pub mod query;

pub use cache::QueryCache;
pub use client::{ConnectionInfo, Warehouse};
pub use dashboard::{
    distinct_skills, level_breakdown, Dashboard, LevelCount, QueryRunner, SKILL_LEVEL_COMPANY_SQL,
    TOP_SKILLS_SQL,
};
pub use error::WarehouseError;
pub use load::LoadReport;
pub use query::{QueryColumn, QueryResult};
