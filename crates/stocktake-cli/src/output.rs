//! Plain-text and JSON rendering for command results.

use serde::Serialize;
use serde_json::json;
use stocktake_core::{
  component::{Component, QuantityChange},
  history::{Audit, HistoryEntry},
  search::SearchOutcome,
};
use stocktake_import::{ImportStatus, ImportSummary};

/// Selects the output format for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Output {
  pub json: bool,
}

impl Output {
  /// Print `value` as pretty JSON, or the text produced by `text`.
  pub fn emit<T: Serialize + ?Sized>(
    &self,
    value: &T,
    text: impl FnOnce() -> String,
  ) -> anyhow::Result<()> {
    if self.json {
      println!("{}", serde_json::to_string_pretty(value)?);
    } else {
      print!("{}", text());
    }
    Ok(())
  }
}

fn cell(field: &Option<String>) -> &str { field.as_deref().unwrap_or("-") }

fn opt_qty(q: Option<i64>) -> String { q.map_or_else(|| "-".to_owned(), |n| n.to_string()) }

// ─── Components ──────────────────────────────────────────────────────────────

pub fn components(list: &[Component]) -> String {
  if list.is_empty() {
    return "No components.\n".to_owned();
  }
  let mut out = format!(
    "{:>5}  {:<24} {:>8}  {:<16} {:<16} {}\n",
    "ID", "NAME", "QTY", "LOCATION", "CATEGORY", "VALUE"
  );
  for c in list {
    out.push_str(&format!(
      "{:>5}  {:<24} {:>8}  {:<16} {:<16} {}\n",
      c.id.0,
      c.name,
      c.quantity,
      cell(&c.location),
      cell(&c.category),
      cell(&c.value),
    ));
  }
  out
}

pub fn added(c: &Component) -> String {
  format!("Added component {} ({}, quantity {}).\n", c.id, c.name, c.quantity)
}

pub fn removed(target: &str, list: &[Component]) -> String {
  if list.is_empty() {
    return format!("Component {target} not found.\n");
  }
  list
    .iter()
    .map(|c| format!("Removed component {} ({}).\n", c.id, c.name))
    .collect()
}

pub fn updated(target: &str, changes: &[QuantityChange]) -> String {
  if changes.is_empty() {
    return format!("Component {target} not found.\n");
  }
  changes
    .iter()
    .map(|ch| {
      format!(
        "Updated component {} ({}): {} -> {}.\n",
        ch.component.id, ch.component.name, ch.old_quantity, ch.new_quantity
      )
    })
    .collect()
}

// ─── History ─────────────────────────────────────────────────────────────────

pub fn history(entries: &[HistoryEntry]) -> String {
  if entries.is_empty() {
    return "No history recorded for this component.\n".to_owned();
  }
  let mut out = format!(
    "{:>6}  {:<19}  {:<18} {:>8} {:>8}\n",
    "ENTRY", "TIME (UTC)", "ACTION", "OLD", "NEW"
  );
  for e in entries {
    out.push_str(&format!(
      "{:>6}  {:<19}  {:<18} {:>8} {:>8}\n",
      e.id,
      e.recorded_at.format("%Y-%m-%d %H:%M:%S"),
      e.action.to_string(),
      opt_qty(e.old_quantity),
      opt_qty(e.new_quantity),
    ));
  }
  out
}

pub fn audit(report: &Audit) -> String {
  let verdict = if report.is_consistent() { "consistent" } else { "MISMATCH" };
  format!(
    "Component {}: stored {}, replayed {} from {} entries: {verdict}.\n",
    report.component_id,
    opt_qty(report.stored),
    opt_qty(report.replayed),
    report.entries,
  )
}

// ─── Search ──────────────────────────────────────────────────────────────────

pub fn search(keyword: &str, outcome: &SearchOutcome) -> String {
  match outcome {
    SearchOutcome::Matched { field, components: found } => {
      format!("Matched `{keyword}` on {field}:\n{}", components(found))
    }
    SearchOutcome::NoMatch => format!("No results for `{keyword}` in any field.\n"),
  }
}

// ─── Import ──────────────────────────────────────────────────────────────────

pub fn import_json(status: &ImportStatus) -> serde_json::Value {
  match status {
    ImportStatus::TemplateCreated(path) => json!({
      "outcome": "template_created",
      "path": path,
    }),
    ImportStatus::Completed(summary) => json!({
      "outcome": "completed",
      "imported": summary.imported,
      "updated": summary.updated,
      "errored": summary.error_count(),
      "errors": summary
        .errors
        .iter()
        .map(|e| json!({ "line": e.line, "name": e.name, "error": e.kind.to_string() }))
        .collect::<Vec<_>>(),
    }),
  }
}

pub fn import(status: &ImportStatus) -> String {
  match status {
    ImportStatus::TemplateCreated(path) => format!(
      "Import file not found. A template was written to {}; fill it in and run the import again.\n",
      path.display()
    ),
    ImportStatus::Completed(summary) => summary_text(summary),
  }
}

fn summary_text(summary: &ImportSummary) -> String {
  let mut out = String::new();
  for e in &summary.errors {
    out.push_str(&format!(
      "line {}{}: {}\n",
      e.line,
      e.name.as_deref().map(|n| format!(" ({n})")).unwrap_or_default(),
      e.kind
    ));
  }
  out.push_str(&format!(
    "Imported {}, updated {}, errored {}.\n",
    summary.imported,
    summary.updated,
    summary.error_count()
  ));
  out
}
