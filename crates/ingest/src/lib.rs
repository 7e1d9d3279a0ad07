//! Job-posting fetch from the Adzuna search API.

pub mod adzuna;
pub mod error;

pub use adzuna::{AdzunaClient, FetchReport, RetryPolicy, SearchParams};
pub use error::FetchError;
