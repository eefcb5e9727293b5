//! Error types for the stocktake CSV importer.
//!
//! [`ImportError`] aborts a whole batch. [`RowErrorKind`] rejects a single
//! row and is collected into the
//! [`ImportSummary`](crate::ImportSummary) while processing continues.

use thiserror::Error;

/// A failure that stops the batch.
#[derive(Debug, Error)]
pub enum ImportError {
  /// The header row is not exactly `name,quantity,location,category,value`.
  /// Raised before any row is processed.
  #[error(
    "CSV headers are incorrect: expected `{}`, found `{}`",
    crate::EXPECTED_HEADER.join(","),
    .found.join(",")
  )]
  Header { found: Vec<String> },

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  /// The store failed mid-batch. Rows before this one stay committed.
  #[error("storage fault after {committed} committed rows: {source}")]
  Storage {
    committed: usize,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },
}

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowErrorKind {
  /// Quantity is not a whole number, is negative, or would overflow the
  /// stored total.
  #[error("{0}")]
  Invalid(#[from] stocktake_core::Error),

  #[error("missing required field `{0}`")]
  MissingField(&'static str),

  #[error("malformed record: {0}")]
  Malformed(String),

  /// The store refused the row with a constraint violation.
  #[error("database integrity issue: {0}")]
  Conflict(String),
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
