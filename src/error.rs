use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures raised by the pipeline stages.
///
/// I/O and CSV syntax problems travel as plain `anyhow` errors with context;
/// these variants cover the data-level conditions callers may want to match on.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("No columns to parse from {path:?}")]
    EmptyInput { path: PathBuf },
    #[error("Required column '{column}' is missing from the input")]
    MissingColumn { column: String },
    #[error("Line {line} column '{column}': '{value}' is not numeric")]
    NonNumeric {
        column: String,
        line: usize,
        value: String,
    },
    #[error("Line {line}: integer overflow while computing '{column}'")]
    Overflow { column: String, line: usize },
}
