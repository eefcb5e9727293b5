//! History Ledger types.
//!
//! Every quantity-affecting mutation appends exactly one [`HistoryEntry`].
//! Entries are never updated or deleted, and they outlive the component
//! they describe: `component_id` is an audit back-reference, not an
//! ownership edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::{component::ComponentId, store::InventoryStore};

// ─── Action ──────────────────────────────────────────────────────────────────

/// The kind of state transition an entry records.
///
/// The `to_string` labels are what the store persists in the `action`
/// column.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
  #[strum(to_string = "Added")]
  Added,
  #[strum(to_string = "Removed")]
  Removed,
  #[strum(to_string = "Updated")]
  Updated,
  #[strum(to_string = "Added by import")]
  AddedByImport,
  #[strum(to_string = "Updated by import")]
  UpdatedByImport,
}

impl HistoryAction {
  /// Whether this action brings a component into existence.
  pub fn is_creation(self) -> bool {
    matches!(self, Self::Added | Self::AddedByImport)
  }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// An immutable audit record. `old_quantity` is absent only for creations,
/// `new_quantity` only for removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  /// Monotonically assigned; orders entries recorded within the same second.
  pub id:           i64,
  pub component_id: ComponentId,
  pub action:       HistoryAction,
  /// Server-assigned, whole-second UTC timestamp.
  pub recorded_at:  DateTime<Utc>,
  pub old_quantity: Option<i64>,
  pub new_quantity: Option<i64>,
}

impl HistoryEntry {
  /// Signed change in stock this entry explains. A missing side counts as
  /// zero.
  pub fn delta(&self) -> i64 {
    self.new_quantity.unwrap_or(0) - self.old_quantity.unwrap_or(0)
  }
}

/// Input to [`InventoryStore::record_history`]. The id and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
  pub component_id: ComponentId,
  pub action:       HistoryAction,
  pub old_quantity: Option<i64>,
  pub new_quantity: Option<i64>,
}

// ─── Replay ──────────────────────────────────────────────────────────────────

/// Reconstruct the quantity a component's history explains.
///
/// Entries may be passed in any order; they are replayed oldest first. The
/// walk starts at the first creation entry's `new_quantity` and applies each
/// later entry's [`delta`](HistoryEntry::delta). Returns `None` when there is
/// no creation entry or the component was removed.
pub fn replay(entries: &[HistoryEntry]) -> Option<i64> {
  let mut ordered: Vec<&HistoryEntry> = entries.iter().collect();
  ordered.sort_by_key(|e| (e.recorded_at, e.id));

  let start = ordered.iter().position(|e| e.action.is_creation())?;
  let mut quantity = ordered[start].new_quantity?;

  for entry in &ordered[start + 1..] {
    match entry.action {
      HistoryAction::Removed => return None,
      HistoryAction::Added | HistoryAction::AddedByImport => {
        quantity = entry.new_quantity?;
      }
      HistoryAction::Updated | HistoryAction::UpdatedByImport => {
        quantity += entry.delta();
      }
    }
  }

  Some(quantity)
}

// ─── Audit ───────────────────────────────────────────────────────────────────

/// Comparison between a component's stored quantity and what its history
/// explains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
  pub component_id: ComponentId,
  /// `None` when the component row no longer exists.
  pub stored:       Option<i64>,
  pub replayed:     Option<i64>,
  pub entries:      usize,
}

impl Audit {
  pub fn is_consistent(&self) -> bool { self.stored == self.replayed }
}

/// Replay the ledger for `id` and compare it with the stored row.
pub async fn audit<S: InventoryStore>(
  store: &S,
  id: ComponentId,
) -> Result<Audit, S::Error> {
  let stored = store.get_component(id).await?.map(|c| c.quantity);
  let entries = store.history(id).await?;
  let replayed = replay(&entries);

  if stored != replayed {
    tracing::warn!(%id, ?stored, ?replayed, "history does not explain stored quantity");
  }

  Ok(Audit { component_id: id, stored, replayed, entries: entries.len() })
}
