//! The `InventoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `stocktake-store-sqlite`). The search resolver, the import reconciler and
//! the command-line surface depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  component::{Component, ComponentId, NewComponent, QuantityChange, Reconciliation},
  history::{HistoryEntry, NewHistoryEntry},
  quantity::Quantity,
  search::{Needle, SearchField},
};

/// Backend error classification needed by callers that must keep going
/// after some failures.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when the failure is a constraint violation on the row being
  /// written, as opposed to a fault in the storage layer itself.
  fn is_integrity_conflict(&self) -> bool;

  /// The input validation failure this error wraps, if any. Such errors
  /// mean the operation was rejected before anything was written.
  fn validation(&self) -> Option<&crate::Error>;
}

/// Abstraction over an inventory store backend: the Component Store and
/// the History Ledger behind a single handle.
///
/// Every mutator writes the component row and appends its history entry in
/// the same storage transaction, so no observer ever sees a quantity change
/// without a matching ledger entry. Operations on unknown names or ids are
/// not errors; they return an empty result.
pub trait InventoryStore: Send + Sync {
  type Error: StoreError;

  // ── Component Store ───────────────────────────────────────────────────

  /// Create a component and record an `Added` entry.
  fn add_component(
    &self,
    input: NewComponent,
  ) -> impl Future<Output = Result<Component, Self::Error>> + Send + '_;

  /// Retrieve a component by id. Returns `None` if not found.
  fn get_component(
    &self,
    id: ComponentId,
  ) -> impl Future<Output = Result<Option<Component>, Self::Error>> + Send + '_;

  /// All components in id order.
  fn list_components(
    &self,
  ) -> impl Future<Output = Result<Vec<Component>, Self::Error>> + Send + '_;

  /// Delete every component whose name equals `name` exactly, recording a
  /// `Removed` entry for each. Returns the deleted rows.
  fn remove_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Vec<Component>, Self::Error>> + Send + '_;

  /// Delete a single component by id, recording a `Removed` entry.
  fn remove_by_id(
    &self,
    id: ComponentId,
  ) -> impl Future<Output = Result<Option<Component>, Self::Error>> + Send + '_;

  /// Set the quantity of every component whose name equals `name` exactly,
  /// recording an `Updated` entry for each.
  fn update_quantity_by_name(
    &self,
    name: String,
    quantity: Quantity,
  ) -> impl Future<Output = Result<Vec<QuantityChange>, Self::Error>> + Send + '_;

  /// Set the quantity of a single component by id, recording an `Updated`
  /// entry.
  fn update_quantity_by_id(
    &self,
    id: ComponentId,
    quantity: Quantity,
  ) -> impl Future<Output = Result<Option<QuantityChange>, Self::Error>> + Send + '_;

  /// Query exactly one field. Used by [`crate::search::resolve`] for each
  /// strategy in a plan; results are in id order.
  fn find_by_field(
    &self,
    field: SearchField,
    needle: Needle,
  ) -> impl Future<Output = Result<Vec<Component>, Self::Error>> + Send + '_;

  /// Merge one proposed import row.
  ///
  /// Looks up a component by the compound key (`name`, `value`,
  /// `location`). On a match the imported quantity is added to the stored
  /// one and an `UpdatedByImport` entry is recorded; otherwise a new
  /// component is created with an `AddedByImport` entry. The whole step is
  /// committed on its own.
  fn reconcile(
    &self,
    input: NewComponent,
  ) -> impl Future<Output = Result<Reconciliation, Self::Error>> + Send + '_;

  // ── History Ledger ────────────────────────────────────────────────────

  /// Append one entry. The ledger does not validate the quantities.
  fn record_history(
    &self,
    entry: NewHistoryEntry,
  ) -> impl Future<Output = Result<HistoryEntry, Self::Error>> + Send + '_;

  /// Entries for `component_id`, most recent first. Empty when nothing was
  /// logged, including for ids that never existed.
  fn history(
    &self,
    component_id: ComponentId,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + '_;
}
