//! CSV import reconciler for the stocktake inventory ledger.
//!
//! Reads a batch of proposed components and merges each row into an
//! [`InventoryStore`](stocktake_core::store::InventoryStore): rows whose
//! (`name`, `value`, `location`) key already exists accumulate quantity,
//! all others create a new component. Every row commits on its own, so a
//! fault partway through leaves earlier rows in place.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn run(store: stocktake_store_sqlite::SqliteStore) {
//! use std::path::Path;
//!
//! use stocktake_import::{ImportStatus, import_file};
//!
//! match import_file(&store, Path::new("components_import.csv")).await.unwrap() {
//!   ImportStatus::TemplateCreated(path) => println!("fill in {}", path.display()),
//!   ImportStatus::Completed(summary) => println!("{} added", summary.imported),
//! }
//! # }
//! ```

pub mod error;
mod parse;
mod reconcile;
mod template;

pub use error::{ImportError, Result, RowErrorKind};
pub use reconcile::{ImportStatus, ImportSummary, RowError, import_file, reconcile_reader};
pub use template::write_template;

/// The only accepted header row, in order.
pub const EXPECTED_HEADER: [&str; 5] = ["name", "quantity", "location", "category", "value"];

#[cfg(test)]
mod tests;
