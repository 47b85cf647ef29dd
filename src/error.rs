//! Error types for construct schemas, filter runs and the export sink.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a schema, binding it to data, configuring a
/// filter run or writing its output.
///
/// Per-row evaluation never fails: every row resolves to keep or discard.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Column '{column}' required by {owner} is missing from the dataset")]
    MissingColumn { owner: String, column: String },

    #[error(
        "Row {row}, column '{column}': value '{value}' is not an integer in [{min}, {max}]"
    )]
    RangeViolation {
        /// 1-based row number.
        row: usize,
        column: String,
        value: String,
        min: i64,
        max: i64,
    },

    #[error("At least two target constructs must be specified, got {0}")]
    Arity(usize),

    #[error("The construct '{0}' is not defined in the schema")]
    UnknownConstruct(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to write cleaned table to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, FilterError>;
