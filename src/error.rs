//! Crate-wide error type.
//!
//! One enum covers both the data-contract failures the matching algorithm
//! can raise (`LengthMismatch`, `DomainMismatch`, `EmptyInput`, `XNotFound`)
//! and the plumbing failures around it (CSV, SQLite, filesystem, rendering).
//! Every variant carries enough context (table, series, x-value, file) to
//! diagnose a failed run without re-running it.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Two y-sequences passed to a numeric utility had different lengths.
    #[error("length mismatch while comparing {left_name} (n={left_len}) with {right_name} (n={right_len})")]
    LengthMismatch {
        left_name: String,
        left_len: usize,
        right_name: String,
        right_len: usize,
    },

    /// The training and candidate tables do not share the same x-domain.
    #[error(
        "x-domain mismatch between '{left_table}' and '{right_table}' at row {row}: {left_x} vs {right_x}"
    )]
    DomainMismatch {
        left_table: String,
        right_table: String,
        row: usize,
        left_x: f64,
        right_x: f64,
    },

    /// A table that must contain data had zero rows or zero series.
    #[error("table '{table}' is empty; nothing to {operation}")]
    EmptyInput { table: String, operation: String },

    /// A test x-value is absent from the candidate x-domain.
    ///
    /// Test inputs are expected to lie exactly on the candidate grid; no
    /// interpolation is performed.
    #[error("x={x} not found in the x-domain of table '{table}'")]
    XNotFound { x: f64, table: String },

    /// A table violated its shape contract (series count, duplicate x, ...).
    #[error("invalid shape for table '{table}': {message}")]
    Schema { table: String, message: String },

    /// A required CSV column is missing.
    #[error("{}: missing required column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// A CSV field failed to parse.
    #[error("{}, line {line}, column '{column}': {message}", .path.display())]
    BadField {
        path: PathBuf,
        line: usize,
        column: String,
        message: String,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("failed to write JSON export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render '{}': {message}", .path.display())]
    Render { path: PathBuf, message: String },
}

impl AppError {
    /// Process exit code for the binary.
    ///
    /// 2 = bad input/schema, 3 = empty inputs, 4 = data-contract violation,
    /// 5 = storage, 6 = rendering.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::MissingColumn { .. }
            | AppError::BadField { .. }
            | AppError::Schema { .. }
            | AppError::Csv { .. }
            | AppError::Io { .. }
            | AppError::Json(_) => 2,
            AppError::EmptyInput { .. } => 3,
            AppError::LengthMismatch { .. }
            | AppError::DomainMismatch { .. }
            | AppError::XNotFound { .. } => 4,
            AppError::Sql(_) => 5,
            AppError::Render { .. } => 6,
        }
    }

    /// Shorthand for wrapping an I/O error with its path.
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
