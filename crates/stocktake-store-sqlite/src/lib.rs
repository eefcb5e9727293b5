//! SQLite backend for the stocktake inventory ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each mutation runs inside its
//! own SQLite transaction covering both the component row and its history
//! entry.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
