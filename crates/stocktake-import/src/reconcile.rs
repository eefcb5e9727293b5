//! The per-row merge-or-create loop.

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
};

use stocktake_core::{
  component::Reconciliation,
  store::{InventoryStore, StoreError},
};

use crate::{
  error::{ImportError, Result, RowErrorKind},
  parse::{check_header, decode_row, row_name},
  template::write_template,
};

// ─── Outcome types ───────────────────────────────────────────────────────────

/// A rejected row. The store was not touched for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
  /// 1-based line in the source; the header is line 1.
  pub line: u64,
  pub name: Option<String>,
  pub kind: RowErrorKind,
}

/// Counters for one completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
  /// Rows that created a new component.
  pub imported: usize,
  /// Rows that accumulated onto an existing component.
  pub updated:  usize,
  pub errors:   Vec<RowError>,
}

impl ImportSummary {
  pub fn error_count(&self) -> usize { self.errors.len() }

  /// Rows written to the store.
  pub fn committed(&self) -> usize { self.imported + self.updated }
}

/// Result of [`import_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
  /// The file did not exist; a header-only template was written in its
  /// place and nothing was imported.
  TemplateCreated(PathBuf),
  Completed(ImportSummary),
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Import from the CSV file at `path`, or write a template there if it does
/// not exist.
pub async fn import_file<S: InventoryStore>(store: &S, path: &Path) -> Result<ImportStatus> {
  let file = match File::open(path) {
    Ok(file) => file,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      write_template(path)?;
      tracing::warn!(path = %path.display(), "import file not found, template created");
      return Ok(ImportStatus::TemplateCreated(path.to_path_buf()));
    }
    Err(e) => return Err(e.into()),
  };

  tracing::info!(path = %path.display(), "starting import");
  let summary = reconcile_reader(store, file).await?;
  Ok(ImportStatus::Completed(summary))
}

/// Validate the header of `reader`, then reconcile each row into `store`.
///
/// Row-level problems (bad quantity, missing field, integrity conflict) are
/// collected in the summary and processing moves on. A storage fault stops
/// the batch with [`ImportError::Storage`], reporting how many rows had
/// already been committed.
pub async fn reconcile_reader<S, R>(store: &S, reader: R) -> Result<ImportSummary>
where
  S: InventoryStore,
  R: io::Read,
{
  let mut rdr = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(reader);

  check_header(rdr.headers()?)?;

  let mut summary = ImportSummary::default();

  for (index, result) in rdr.records().enumerate() {
    let fallback_line = index as u64 + 2;

    let record = match result {
      Ok(record) => record,
      Err(e) if e.is_io_error() => return Err(e.into()),
      Err(e) => {
        let line = e.position().map_or(fallback_line, |p| p.line());
        reject(&mut summary, line, None, RowErrorKind::Malformed(e.to_string()));
        continue;
      }
    };

    let line = record.position().map_or(fallback_line, |p| p.line());
    let name = row_name(&record);

    let proposal = match decode_row(&record) {
      Ok(proposal) => proposal,
      Err(kind) => {
        reject(&mut summary, line, name, kind);
        continue;
      }
    };

    match store.reconcile(proposal).await {
      Ok(Reconciliation::Created(_)) => summary.imported += 1,
      Ok(Reconciliation::Merged(_)) => summary.updated += 1,
      Err(e) => {
        if let Some(invalid) = e.validation() {
          reject(&mut summary, line, name, RowErrorKind::Invalid(invalid.clone()));
        } else if e.is_integrity_conflict() {
          reject(&mut summary, line, name, RowErrorKind::Conflict(e.to_string()));
        } else {
          tracing::error!(
            line,
            committed = summary.committed(),
            error = %e,
            "storage fault, aborting import"
          );
          return Err(ImportError::Storage {
            committed: summary.committed(),
            source:    Box::new(e),
          });
        }
      }
    }
  }

  tracing::info!(
    imported = summary.imported,
    updated = summary.updated,
    errors = summary.error_count(),
    "import completed"
  );
  Ok(summary)
}

fn reject(summary: &mut ImportSummary, line: u64, name: Option<String>, kind: RowErrorKind) {
  tracing::warn!(line, name = name.as_deref().unwrap_or("unknown"), error = %kind, "row rejected");
  summary.errors.push(RowError { line, name, kind });
}
