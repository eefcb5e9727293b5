//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings truncated to whole seconds.
//! History actions are stored as their human-readable labels.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use stocktake_core::{
  component::{Component, ComponentId},
  history::{HistoryAction, HistoryEntry},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the ledger's one-second resolution.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(0) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── HistoryAction ───────────────────────────────────────────────────────────

pub fn encode_action(a: HistoryAction) -> &'static str { a.into() }

pub fn decode_action(s: &str) -> Result<HistoryAction> {
  s.parse::<HistoryAction>()
    .map_err(|_| stocktake_core::Error::UnknownAction(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawComponent::from_row`].
pub const COMPONENT_COLUMNS: &str = "id, name, quantity, location, category, value";

/// Column list matching [`RawHistoryEntry::from_row`].
pub const HISTORY_COLUMNS: &str =
  "history_id, component_id, action, recorded_at, old_quantity, new_quantity";

/// Values read directly from a `components` row.
pub struct RawComponent {
  pub id:       i64,
  pub name:     String,
  pub quantity: i64,
  pub location: Option<String>,
  pub category: Option<String>,
  pub value:    Option<String>,
}

impl RawComponent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      name:     row.get(1)?,
      quantity: row.get(2)?,
      location: row.get(3)?,
      category: row.get(4)?,
      value:    row.get(5)?,
    })
  }

  pub fn into_component(self) -> Component {
    Component {
      id:       ComponentId(self.id),
      name:     self.name,
      quantity: self.quantity,
      location: self.location,
      category: self.category,
      value:    self.value,
    }
  }
}

/// Values read directly from a `component_history` row.
pub struct RawHistoryEntry {
  pub history_id:   i64,
  pub component_id: i64,
  pub action:       String,
  pub recorded_at:  String,
  pub old_quantity: Option<i64>,
  pub new_quantity: Option<i64>,
}

impl RawHistoryEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      history_id:   row.get(0)?,
      component_id: row.get(1)?,
      action:       row.get(2)?,
      recorded_at:  row.get(3)?,
      old_quantity: row.get(4)?,
      new_quantity: row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      id:           self.history_id,
      component_id: ComponentId(self.component_id),
      action:       decode_action(&self.action)?,
      recorded_at:  decode_dt(&self.recorded_at)?,
      old_quantity: self.old_quantity,
      new_quantity: self.new_quantity,
    })
  }
}
