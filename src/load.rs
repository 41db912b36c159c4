use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::{
    config::PipelineConfig,
    data::{Column, ColumnType, Dataset, Record, is_missing, parse_typed_value},
    error::PipelineError,
    io_utils,
};

/// Reads the configured input file into a [`Dataset`], inferring one
/// [`ColumnType`] per column from its non-missing cells.
pub fn load_dataset(config: &PipelineConfig) -> Result<Dataset> {
    let path = config.input.as_path();
    info!("Loading data from {}...", path.display());

    let delimiter = io_utils::resolve_input_delimiter(path, config.delimiter);
    let encoding = io_utils::resolve_encoding(config.input_encoding.as_deref())?;
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)?;
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(PipelineError::EmptyInput {
            path: path.to_path_buf(),
        }
        .into());
    }

    let mut raw_rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} in {path:?}", idx + 2))?;
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(idx + 2);
        let mut decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding line {line} in {path:?}"))?;
        // Short rows are padded with missing cells; long rows are malformed.
        if decoded.len() > headers.len() {
            bail!(
                "Reading row {} in {path:?}: expected {} fields in line {line}, saw {}",
                idx + 2,
                headers.len(),
                decoded.len()
            );
        }
        decoded.resize(headers.len(), String::new());
        raw_rows.push((line, decoded));
    }

    let mut candidates = vec![TypeCandidate::new(); headers.len()];
    for (_, row) in &raw_rows {
        for (candidate, cell) in candidates.iter_mut().zip(row) {
            candidate.observe(cell);
        }
    }
    let columns = headers
        .into_iter()
        .zip(&candidates)
        .map(|(name, candidate)| Column {
            name,
            datatype: candidate.decide(),
        })
        .collect::<Vec<_>>();
    for column in &columns {
        debug!("Column '{}' inferred as {}", column.name, column.datatype);
    }

    let records = raw_rows
        .into_iter()
        .map(|(line, row)| {
            let values = columns
                .iter()
                .zip(&row)
                .map(|(column, cell)| {
                    parse_typed_value(cell, column.datatype)
                        .with_context(|| format!("Line {line} column '{}'", column.name))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Record { line, values })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Loaded {} row(s) across {} column(s) from {path:?}",
        records.len(),
        columns.len()
    );
    Ok(Dataset::new(columns, records))
}

#[derive(Debug, Clone)]
struct TypeCandidate {
    seen_value: bool,
    possible_integer: bool,
    possible_float: bool,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            seen_value: false,
            possible_integer: true,
            possible_float: true,
        }
    }

    fn observe(&mut self, cell: &str) {
        if is_missing(cell) {
            return;
        }
        self.seen_value = true;
        let trimmed = cell.trim();
        if self.possible_integer && trimmed.parse::<i64>().is_err() {
            self.possible_integer = false;
        }
        if self.possible_float && trimmed.parse::<f64>().is_err() {
            self.possible_float = false;
        }
    }

    /// Columns without a single value read as floats, like an all-missing
    /// numeric column.
    fn decide(&self) -> ColumnType {
        if !self.seen_value {
            ColumnType::Float
        } else if self.possible_integer {
            ColumnType::Integer
        } else if self.possible_float {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}
