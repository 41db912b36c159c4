use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{config::PipelineConfig, data::Dataset, io_utils};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub sha256: String,
}

/// Writes `dataset` to the configured output path, creating the output
/// directory first. An existing file at that path is replaced.
pub fn save_dataset(dataset: &Dataset, config: &PipelineConfig) -> Result<SaveSummary> {
    let path = config.output_path();
    let input_delimiter = io_utils::resolve_input_delimiter(&config.input, config.delimiter);
    let delimiter = io_utils::resolve_output_delimiter(&path, input_delimiter);
    let encoding = io_utils::resolve_encoding(config.output_encoding.as_deref())?;

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Creating output directory {:?}", config.output_dir))?;
    let mut writer = io_utils::open_csv_writer(&path, delimiter, encoding)?;

    writer
        .write_record(dataset.columns.iter().map(|c| c.name.as_str()))
        .context("Writing output headers")?;
    for record in &dataset.records {
        let row = record
            .values
            .iter()
            .map(|cell| cell.as_ref().map(|v| v.as_display()).unwrap_or_default());
        writer
            .write_record(row)
            .with_context(|| format!("Writing row from input line {}", record.line))?;
    }
    writer.flush().context("Flushing output writer")?;
    drop(writer);

    let sha256 = io_utils::file_sha256(&path)?;
    debug!("Output digest sha256:{sha256}");
    info!("Cleaned data saved to {}", path.display());
    Ok(SaveSummary {
        path,
        rows: dataset.len(),
        columns: dataset.columns.len(),
        sha256,
    })
}
