//! Components: one inventory row describing a physical part.
//!
//! A component's identity is its store-assigned [`ComponentId`]. Names are
//! not unique: the same part may appear several times with a different
//! value, location, or batch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, quantity::Quantity};

/// Store-assigned identifier; stable for the component's lifetime and never
/// reused after deletion.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ComponentId(pub i64);

impl fmt::Display for ComponentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

/// A persisted inventory row.
///
/// `quantity` is a plain integer rather than a [`Quantity`]: it reflects
/// whatever is stored, including rows written outside the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
  pub id:       ComponentId,
  pub name:     String,
  pub quantity: i64,
  pub location: Option<String>,
  pub category: Option<String>,
  /// Free-form electrical value, e.g. "10k" or "100nF".
  pub value:    Option<String>,
}

/// Input to [`crate::store::InventoryStore::add_component`] and
/// [`crate::store::InventoryStore::reconcile`]. The id is always assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComponent {
  pub name:     String,
  pub quantity: Quantity,
  pub location: Option<String>,
  pub category: Option<String>,
  pub value:    Option<String>,
}

impl NewComponent {
  /// Convenience constructor with all optional fields unset.
  pub fn new(name: impl Into<String>, quantity: Quantity) -> Self {
    Self {
      name: name.into(),
      quantity,
      location: None,
      category: None,
      value: None,
    }
  }

  /// Trim the name and collapse blank optional fields to `None`.
  ///
  /// Every write path calls this so that `""` and an absent field compare
  /// equal when the import reconciler looks up its compound key.
  pub fn normalized(self) -> Result<Self> {
    let name = self.name.trim().to_owned();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }
    Ok(Self {
      name,
      quantity: self.quantity,
      location: non_blank(self.location),
      category: non_blank(self.category),
      value: non_blank(self.value),
    })
  }
}

/// Collapse an empty or whitespace-only string to `None`.
pub fn non_blank(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// The before and after of a quantity update on one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChange {
  pub component:    Component,
  pub old_quantity: i64,
  pub new_quantity: i64,
}

/// What the import reconciler did with one proposed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Reconciliation {
  /// No component matched the compound key; a new one was created.
  Created(Component),
  /// An existing component matched and its quantity was accumulated.
  Merged(QuantityChange),
}
