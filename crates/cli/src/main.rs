mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Instrument};

use skillboard_core::{Config, Section};

use crate::cli::{CliArgs, Command};

fn load_config() -> Result<Config> {
    skillboard_core::config::load_dotenv();
    Config::from_env().context("failed to read configuration")
}

/// Config sections a command touches; checked before any I/O.
fn required_sections(command: &Command) -> &'static [Section] {
    match command {
        Command::Fetch => &[Section::Adzuna, Section::Storage],
        Command::Transform | Command::Dates => &[Section::Storage],
        Command::Load => &[Section::Storage, Section::Warehouse],
        Command::Run => &[Section::Adzuna, Section::Storage, Section::Warehouse],
        Command::Check | Command::Report { .. } => &[Section::Warehouse],
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let config = load_config()?;
    config
        .require(required_sections(&args.command))
        .context("incomplete configuration")?;
    config.log_summary();

    let date = args.ingestion_date();
    match &args.command {
        Command::Fetch => {
            commands::fetch(&config, date).await?;
        }
        Command::Transform => {
            commands::transform(&config, date).await?;
        }
        Command::Load => {
            commands::load(&config, date).await?;
        }
        Command::Run => {
            let run_id = uuid::Uuid::new_v4();
            let span = tracing::info_span!("run", %run_id, %date);
            let report = commands::run(&config, date).instrument(span).await?;
            info!(%run_id, jobs = report.jobs_merged, skills = report.skills_merged, "run complete");
        }
        Command::Check => commands::check(&config).await?,
        Command::Report { skill, json } => {
            commands::report(&config, skill.as_deref(), *json).await?
        }
        Command::Dates => commands::dates(&config).await?,
    }

    Ok(())
}
