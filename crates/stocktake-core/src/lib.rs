//! Core types and trait definitions for the stocktake inventory ledger.
//!
//! Nothing here touches a database or a file format. Storage backends
//! implement [`store::InventoryStore`]; the search resolver and the history
//! audit are written against that trait alone.

pub mod component;
pub mod error;
pub mod history;
pub mod quantity;
pub mod search;
pub mod store;

pub use error::{Error, Result};
