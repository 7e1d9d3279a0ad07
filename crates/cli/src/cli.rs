use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

/// Job-posting skill demand pipeline.
///
/// Fetches postings from Adzuna, stages the raw batch in object storage,
/// normalizes it and merges the result into the warehouse.
#[derive(Parser, Debug)]
#[command(name = "skillboard", version, about)]
pub struct CliArgs {
    /// Ingestion date of the batch (YYYY-MM-DD, default: today in UTC)
    #[arg(long, global = true, env = "SKILLBOARD_DATE")]
    pub date: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    pub fn ingestion_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch postings from Adzuna and store the raw batch
    Fetch,
    /// Transform a stored raw batch and print its statistics
    Transform,
    /// Transform a stored raw batch and merge it into the warehouse
    Load,
    /// Fetch, store, transform and load in one go
    Run,
    /// Check the warehouse connection
    Check,
    /// Print skill demand from the warehouse
    Report {
        /// Skill to break down by seniority (default: first skill by name)
        #[arg(long)]
        skill: Option<String>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// List ingestion dates with a stored raw batch
    Dates,
}
