use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a whole stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file '{}' not found", .0.display())]
    SourceNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Reasons a single row is skipped. None of these abort the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("field '{0}' missing from input")]
    MissingField(&'static str),

    #[error("field '{field}' is not a valid number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field '{field}' is not a valid integer: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}' is not a valid YYYY-MM-DD date: '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("field '{0}' is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("arithmetic overflow while computing '{0}'")]
    ArithmeticOverflow(&'static str),
}
