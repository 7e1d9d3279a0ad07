//! Integration tests for skillboard-transform: end-to-end batch scenarios and
//! the referential guarantees between the jobs and job-skills datasets.

mod helpers;
mod integrity;
mod scenarios;
