//! Error types for `stocktake-core`.
//!
//! These are validation errors: the operation that produced one is simply
//! not applied.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("quantity must be a whole number, got {0:?}")]
  InvalidQuantity(String),

  #[error("quantity must not be negative, got {0}")]
  NegativeQuantity(i64),

  #[error("quantity overflow: {existing} + {added}")]
  QuantityOverflow { existing: i64, added: i64 },

  #[error("component name must not be empty")]
  EmptyName,

  #[error("unknown history action: {0:?}")]
  UnknownAction(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
