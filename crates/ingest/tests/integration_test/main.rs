//! Integration tests for skillboard-ingest.
//!
//! An in-process axum server stands in for the Adzuna search API so the
//! paging, retry and skip behaviour can be exercised over real HTTP.

mod fake_api;
mod fetch;
