//! Batch-level tests for the import reconciler against an in-memory store.

use std::io::Cursor;

use stocktake_core::{
  component::{Component, ComponentId, NewComponent, QuantityChange, Reconciliation},
  history::{HistoryAction, HistoryEntry, NewHistoryEntry},
  quantity::Quantity,
  search::{Needle, SearchField},
  store::{InventoryStore, StoreError},
};
use stocktake_store_sqlite::SqliteStore;

use crate::{
  EXPECTED_HEADER, ImportError, ImportStatus, RowErrorKind, import_file, reconcile_reader,
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn csv(body: &str) -> Cursor<String> {
  Cursor::new(format!("{}\n{body}", EXPECTED_HEADER.join(",")))
}

// ─── Header handling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn bad_header_aborts_before_any_row() {
  let s = store().await;
  let input = Cursor::new("name,quantity,location,category\nR1,5,A,Passive\n");

  let err = reconcile_reader(&s, input).await.unwrap_err();
  assert!(matches!(err, ImportError::Header { .. }));
  assert!(err.to_string().contains("name,quantity,location,category,value"));
  assert!(s.list_components().await.unwrap().is_empty());
}

#[tokio::test]
async fn padded_header_names_are_rejected() {
  let s = store().await;
  let input = Cursor::new(" name , quantity,location,category,value\nR1,5,A,B,C\n");

  let err = reconcile_reader(&s, input).await.unwrap_err();
  assert!(matches!(err, ImportError::Header { .. }));
  assert!(s.list_components().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_file_is_a_header_error() {
  let s = store().await;
  let err = reconcile_reader(&s, Cursor::new("")).await.unwrap_err();
  assert!(matches!(err, ImportError::Header { ref found } if found.is_empty()));
}

#[tokio::test]
async fn header_only_imports_nothing() {
  let s = store().await;
  let summary = reconcile_reader(&s, csv("")).await.unwrap();
  assert_eq!(summary.committed(), 0);
  assert_eq!(summary.error_count(), 0);
}

// ─── Create and merge ────────────────────────────────────────────────────────

#[tokio::test]
async fn creates_then_merges_on_compound_key() {
  let s = store().await;
  let body = "\
R1,10,Drawer A,Resistor,1k
R1,5,Drawer A,Resistor,1k
R1,7,Drawer B,Resistor,1k
R1,3,Drawer A,Resistor,2k
";
  let summary = reconcile_reader(&s, csv(body)).await.unwrap();
  assert_eq!(summary.imported, 3);
  assert_eq!(summary.updated, 1);
  assert!(summary.errors.is_empty());

  let all = s.list_components().await.unwrap();
  let quantities: Vec<i64> = all.iter().map(|c| c.quantity).collect();
  assert_eq!(quantities, vec![15, 7, 3]);

  let history = s.history(all[0].id).await.unwrap();
  let actions: Vec<HistoryAction> = history.iter().map(|e| e.action).collect();
  assert_eq!(actions, vec![HistoryAction::UpdatedByImport, HistoryAction::AddedByImport]);
  assert_eq!(history[0].old_quantity, Some(10));
  assert_eq!(history[0].new_quantity, Some(15));
}

#[tokio::test]
async fn merges_onto_components_added_by_hand() {
  let s = store().await;
  let mut existing = NewComponent::new("Cap", Quantity::new(4).unwrap());
  existing.value = Some("10u".into());
  let c = s.add_component(existing).await.unwrap();

  let summary = reconcile_reader(&s, csv("Cap,6,,Capacitor,10u\n"))
    .await
    .unwrap();
  assert_eq!((summary.imported, summary.updated), (0, 1));
  assert_eq!(s.get_component(c.id).await.unwrap().unwrap().quantity, 10);
}

#[tokio::test]
async fn importing_twice_doubles_quantities() {
  let s = store().await;
  let body = "R1,10,A,Resistor,1k\nLED,3,B,Optical,\n";

  let first = reconcile_reader(&s, csv(body)).await.unwrap();
  assert_eq!((first.imported, first.updated), (2, 0));

  let second = reconcile_reader(&s, csv(body)).await.unwrap();
  assert_eq!((second.imported, second.updated), (0, 2));

  let quantities: Vec<i64> = s
    .list_components()
    .await
    .unwrap()
    .iter()
    .map(|c| c.quantity)
    .collect();
  assert_eq!(quantities, vec![20, 6]);
}

// ─── Row errors ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn bad_quantity_is_counted_and_later_rows_still_import() {
  let s = store().await;
  let body = "R1,abc,A,Resistor,1k\nR2,-4,A,Resistor,2k\nR3,8,A,Resistor,3k\n";

  let summary = reconcile_reader(&s, csv(body)).await.unwrap();
  assert_eq!(summary.imported, 1);
  assert_eq!(summary.error_count(), 2);

  let first = &summary.errors[0];
  assert_eq!(first.line, 2);
  assert_eq!(first.name.as_deref(), Some("R1"));
  assert!(matches!(
    first.kind,
    RowErrorKind::Invalid(stocktake_core::Error::InvalidQuantity(_))
  ));
  assert_eq!(summary.errors[1].line, 3);

  let all = s.list_components().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].name, "R3");
}

#[tokio::test]
async fn missing_fields_are_row_errors() {
  let s = store().await;
  let body = "R1,2,A\n,5,A,Resistor,1k\nR2,1,A,Resistor,1k\n";

  let summary = reconcile_reader(&s, csv(body)).await.unwrap();
  assert_eq!(summary.imported, 1);
  let kinds: Vec<&RowErrorKind> = summary.errors.iter().map(|e| &e.kind).collect();
  assert_eq!(kinds, vec![
    &RowErrorKind::MissingField("category"),
    &RowErrorKind::MissingField("name"),
  ]);
  assert_eq!(summary.errors[1].name, None);
}

#[tokio::test]
async fn overflowing_merge_is_a_row_error() {
  let s = store().await;
  let body = format!("Big,{},A,,\nBig,1,A,,\nSmall,1,A,,\n", i64::MAX);

  let summary = reconcile_reader(&s, csv(&body)).await.unwrap();
  assert_eq!(summary.imported, 2);
  assert_eq!(summary.updated, 0);
  assert!(matches!(
    summary.errors[0].kind,
    RowErrorKind::Invalid(stocktake_core::Error::QuantityOverflow { .. })
  ));

  let big = &s.list_components().await.unwrap()[0];
  assert_eq!(big.quantity, i64::MAX);
}

// ─── Template creation ───────────────────────────────────────────────────────

#[tokio::test]
async fn missing_file_writes_template_and_imports_nothing() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("components_import.csv");

  let status = import_file(&s, &path).await.unwrap();
  assert_eq!(status, ImportStatus::TemplateCreated(path.clone()));

  let written = std::fs::read_to_string(&path).unwrap();
  assert_eq!(written.trim_end(), "name,quantity,location,category,value");
  assert!(s.list_components().await.unwrap().is_empty());

  // A second run sees the empty template and completes with nothing to do.
  let status = import_file(&s, &path).await.unwrap();
  assert!(matches!(status, ImportStatus::Completed(ref summary) if summary.committed() == 0));
}

#[tokio::test]
async fn existing_file_is_imported() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("parts.csv");
  std::fs::write(&path, "name,quantity,location,category,value\nR1,4,A,Resistor,1k\n").unwrap();

  let ImportStatus::Completed(summary) = import_file(&s, &path).await.unwrap() else {
    panic!("expected a completed import");
  };
  assert_eq!(summary.imported, 1);
}

// ─── Store failures ──────────────────────────────────────────────────────────

/// Wraps a real store and fails `reconcile` for rows whose name carries a
/// marker prefix.
struct FlakyStore {
  inner: SqliteStore,
}

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error(transparent)]
  Inner(#[from] stocktake_store_sqlite::Error),
  #[error("UNIQUE constraint failed: components.name")]
  Conflict,
  #[error("disk I/O error")]
  Fault,
}

impl StoreError for FlakyError {
  fn is_integrity_conflict(&self) -> bool {
    match self {
      FlakyError::Inner(e) => e.is_integrity_conflict(),
      FlakyError::Conflict => true,
      FlakyError::Fault => false,
    }
  }

  fn validation(&self) -> Option<&stocktake_core::Error> {
    match self {
      FlakyError::Inner(e) => e.validation(),
      _ => None,
    }
  }
}

impl InventoryStore for FlakyStore {
  type Error = FlakyError;

  async fn add_component(&self, input: NewComponent) -> Result<Component, FlakyError> {
    Ok(self.inner.add_component(input).await?)
  }

  async fn get_component(&self, id: ComponentId) -> Result<Option<Component>, FlakyError> {
    Ok(self.inner.get_component(id).await?)
  }

  async fn list_components(&self) -> Result<Vec<Component>, FlakyError> {
    Ok(self.inner.list_components().await?)
  }

  async fn remove_by_name(&self, name: String) -> Result<Vec<Component>, FlakyError> {
    Ok(self.inner.remove_by_name(name).await?)
  }

  async fn remove_by_id(&self, id: ComponentId) -> Result<Option<Component>, FlakyError> {
    Ok(self.inner.remove_by_id(id).await?)
  }

  async fn update_quantity_by_name(
    &self,
    name: String,
    quantity: Quantity,
  ) -> Result<Vec<QuantityChange>, FlakyError> {
    Ok(self.inner.update_quantity_by_name(name, quantity).await?)
  }

  async fn update_quantity_by_id(
    &self,
    id: ComponentId,
    quantity: Quantity,
  ) -> Result<Option<QuantityChange>, FlakyError> {
    Ok(self.inner.update_quantity_by_id(id, quantity).await?)
  }

  async fn find_by_field(
    &self,
    field: SearchField,
    needle: Needle,
  ) -> Result<Vec<Component>, FlakyError> {
    Ok(self.inner.find_by_field(field, needle).await?)
  }

  async fn reconcile(&self, input: NewComponent) -> Result<Reconciliation, FlakyError> {
    if input.name.starts_with("CONFLICT") {
      return Err(FlakyError::Conflict);
    }
    if input.name.starts_with("FAULT") {
      return Err(FlakyError::Fault);
    }
    Ok(self.inner.reconcile(input).await?)
  }

  async fn record_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, FlakyError> {
    Ok(self.inner.record_history(entry).await?)
  }

  async fn history(&self, component_id: ComponentId) -> Result<Vec<HistoryEntry>, FlakyError> {
    Ok(self.inner.history(component_id).await?)
  }
}

#[tokio::test]
async fn integrity_conflict_skips_the_row() {
  let s = FlakyStore { inner: store().await };
  let body = "R1,1,A,,\nCONFLICT-1,1,A,,\nR2,1,A,,\n";

  let summary = reconcile_reader(&s, csv(body)).await.unwrap();
  assert_eq!(summary.imported, 2);
  assert_eq!(summary.error_count(), 1);
  assert_eq!(summary.errors[0].line, 3);
  assert!(matches!(summary.errors[0].kind, RowErrorKind::Conflict(_)));
}

#[tokio::test]
async fn storage_fault_aborts_and_keeps_earlier_rows() {
  let s = FlakyStore { inner: store().await };
  let body = "R1,1,A,,\nR1,2,A,,\nFAULT,1,A,,\nR3,1,A,,\n";

  let err = reconcile_reader(&s, csv(body)).await.unwrap_err();
  assert!(matches!(err, ImportError::Storage { committed: 2, .. }));

  let all = s.list_components().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].quantity, 3);
}
