pub mod clean;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod load;
pub mod preview;
pub mod save;
pub mod transform;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{cli::Cli, config::PipelineConfig, save::SaveSummary};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_clean", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = PipelineConfig::from_cli(&cli)?;
    debug!("Resolved configuration: {config:?}");
    let (dataset, summary) = run_pipeline_with_dataset(&config)?;
    if let Some(limit) = cli.preview {
        print!("{}", preview::render_preview(&dataset, limit));
    }
    debug!(
        "Wrote {} row(s) x {} column(s) to {:?}",
        summary.rows, summary.columns, summary.path
    );
    Ok(())
}

/// Load, clean and save once with the given settings.
pub fn run_pipeline(config: &PipelineConfig) -> Result<SaveSummary> {
    run_pipeline_with_dataset(config).map(|(_, summary)| summary)
}

fn run_pipeline_with_dataset(config: &PipelineConfig) -> Result<(data::Dataset, SaveSummary)> {
    let raw = load::load_dataset(config)
        .with_context(|| format!("Loading {:?}", config.input))?;
    let (cleaned, _) = clean::clean_dataset(raw).context("Cleaning sales records")?;
    let summary = save::save_dataset(&cleaned, config)
        .with_context(|| format!("Saving {:?}", config.output_path()))?;
    Ok((cleaned, summary))
}
