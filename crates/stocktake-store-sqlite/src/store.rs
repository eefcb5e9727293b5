//! [`SqliteStore`], the SQLite implementation of [`InventoryStore`].

use std::path::Path;

use rusqlite::{Connection, params};
use stocktake_core::{
  component::{Component, ComponentId, NewComponent, QuantityChange, Reconciliation},
  history::{HistoryAction, HistoryEntry, NewHistoryEntry},
  quantity::Quantity,
  search::{Matcher, Needle, SearchField},
  store::InventoryStore,
};

use crate::{
  Error, Result,
  encode::{
    COMPONENT_COLUMNS, HISTORY_COLUMNS, RawComponent, RawHistoryEntry, encode_action,
    encode_dt, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A stocktake inventory backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. The handle
/// is passed explicitly to every operation; there is no process-wide
/// connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open the database at `path`, creating it and both tables if missing.
  /// The file is switched to WAL journaling.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self { conn: tokio_rusqlite::Connection::open(path).await? };
    store.apply_schema().await?;
    tracing::debug!("inventory schema ready");
    Ok(store)
  }

  /// A private, empty inventory that disappears when the last clone is
  /// dropped.
  pub async fn open_in_memory() -> Result<Self> {
    let store = Self { conn: tokio_rusqlite::Connection::open_in_memory().await? };
    store.apply_schema().await?;
    Ok(store)
  }

  /// Every statement in [`SCHEMA`] is `IF NOT EXISTS`, so reopening an
  /// existing inventory keeps its rows and its id sequence.
  async fn apply_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| Ok(conn.execute_batch(SCHEMA)?))
      .await?;
    Ok(())
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────
//
// These run inside a `conn.call` closure, usually against an open
// transaction (which derefs to `Connection`).

/// `SELECT` components matching `filter`, in id order.
fn query_components<P: rusqlite::Params>(
  conn: &Connection,
  filter: &str,
  params: P,
) -> rusqlite::Result<Vec<Component>> {
  let sql = format!("SELECT {COMPONENT_COLUMNS} FROM components WHERE {filter} ORDER BY id");
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params, RawComponent::from_row)?
    .map(|r| r.map(RawComponent::into_component))
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn insert_history(
  conn: &Connection,
  entry: &NewHistoryEntry,
  recorded_at: &str,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO component_history (component_id, action, recorded_at, old_quantity, new_quantity)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      entry.component_id.0,
      encode_action(entry.action),
      recorded_at,
      entry.old_quantity,
      entry.new_quantity,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Insert a component row and its creation entry.
fn insert_component(
  conn: &Connection,
  input: &NewComponent,
  action: HistoryAction,
  recorded_at: &str,
) -> rusqlite::Result<Component> {
  conn.execute(
    "INSERT INTO components (name, quantity, location, category, value)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      input.name,
      input.quantity.get(),
      input.location,
      input.category,
      input.value,
    ],
  )?;
  let id = ComponentId(conn.last_insert_rowid());

  insert_history(
    conn,
    &NewHistoryEntry {
      component_id: id,
      action,
      old_quantity: None,
      new_quantity: Some(input.quantity.get()),
    },
    recorded_at,
  )?;

  Ok(Component {
    id,
    name: input.name.clone(),
    quantity: input.quantity.get(),
    location: input.location.clone(),
    category: input.category.clone(),
    value: input.value.clone(),
  })
}

/// Overwrite one component's quantity and record the change.
fn set_quantity(
  conn: &Connection,
  mut component: Component,
  quantity: Quantity,
  action: HistoryAction,
  recorded_at: &str,
) -> rusqlite::Result<QuantityChange> {
  let old_quantity = component.quantity;
  let new_quantity = quantity.get();

  conn.execute(
    "UPDATE components SET quantity = ?1 WHERE id = ?2",
    params![new_quantity, component.id.0],
  )?;
  insert_history(
    conn,
    &NewHistoryEntry {
      component_id: component.id,
      action,
      old_quantity: Some(old_quantity),
      new_quantity: Some(new_quantity),
    },
    recorded_at,
  )?;

  component.quantity = new_quantity;
  Ok(QuantityChange { component, old_quantity, new_quantity })
}

/// Delete the given components and record a `Removed` entry for each.
fn delete_components(
  conn: &Connection,
  components: &[Component],
  recorded_at: &str,
) -> rusqlite::Result<()> {
  for component in components {
    conn.execute("DELETE FROM components WHERE id = ?1", params![component.id.0])?;
    insert_history(
      conn,
      &NewHistoryEntry {
        component_id: component.id,
        action:       HistoryAction::Removed,
        old_quantity: Some(component.quantity),
        new_quantity: None,
      },
      recorded_at,
    )?;
  }
  Ok(())
}

/// The text a substring strategy compares against.
fn text_field(component: &Component, field: SearchField) -> Option<&str> {
  match field {
    SearchField::Name => Some(&component.name),
    SearchField::Category => component.category.as_deref(),
    SearchField::Location => component.location.as_deref(),
    SearchField::Value => component.value.as_deref(),
    SearchField::Id | SearchField::Quantity => None,
  }
}

fn column(field: SearchField) -> &'static str {
  match field {
    SearchField::Id => "id",
    SearchField::Name => "name",
    SearchField::Category => "category",
    SearchField::Location => "location",
    SearchField::Quantity => "quantity",
    SearchField::Value => "value",
  }
}

// ─── InventoryStore impl ─────────────────────────────────────────────────────

impl InventoryStore for SqliteStore {
  type Error = Error;

  // ── Component Store ───────────────────────────────────────────────────────

  async fn add_component(&self, input: NewComponent) -> Result<Component> {
    let input = input.normalized()?;
    let at = encode_dt(now());

    let component = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let component = insert_component(&tx, &input, HistoryAction::Added, &at)?;
        tx.commit()?;
        Ok(component)
      })
      .await?;

    tracing::info!(
      id = %component.id,
      name = %component.name,
      quantity = component.quantity,
      "component added"
    );
    Ok(component)
  }

  async fn get_component(&self, id: ComponentId) -> Result<Option<Component>> {
    let rows = self
      .conn
      .call(move |conn| Ok(query_components(conn, "id = ?1", params![id.0])?))
      .await?;
    Ok(rows.into_iter().next())
  }

  async fn list_components(&self) -> Result<Vec<Component>> {
    Ok(
      self
        .conn
        .call(|conn| Ok(query_components(conn, "1 = 1", params![])?))
        .await?,
    )
  }

  async fn remove_by_name(&self, name: String) -> Result<Vec<Component>> {
    let name = name.trim().to_owned();
    let at = encode_dt(now());

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let rows = query_components(&tx, "name = ?1", params![name])?;
        delete_components(&tx, &rows, &at)?;
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    for c in &removed {
      tracing::info!(id = %c.id, name = %c.name, "component removed");
    }
    Ok(removed)
  }

  async fn remove_by_id(&self, id: ComponentId) -> Result<Option<Component>> {
    let at = encode_dt(now());

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let rows = query_components(&tx, "id = ?1", params![id.0])?;
        delete_components(&tx, &rows, &at)?;
        tx.commit()?;
        Ok(rows.into_iter().next())
      })
      .await?;

    if let Some(c) = &removed {
      tracing::info!(id = %c.id, name = %c.name, "component removed");
    }
    Ok(removed)
  }

  async fn update_quantity_by_name(
    &self,
    name: String,
    quantity: Quantity,
  ) -> Result<Vec<QuantityChange>> {
    let name = name.trim().to_owned();
    let at = encode_dt(now());

    let changes = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changes = query_components(&tx, "name = ?1", params![name])?
          .into_iter()
          .map(|c| set_quantity(&tx, c, quantity, HistoryAction::Updated, &at))
          .collect::<rusqlite::Result<Vec<_>>>()?;
        tx.commit()?;
        Ok(changes)
      })
      .await?;

    for ch in &changes {
      tracing::info!(
        id = %ch.component.id,
        old = ch.old_quantity,
        new = ch.new_quantity,
        "component quantity updated"
      );
    }
    Ok(changes)
  }

  async fn update_quantity_by_id(
    &self,
    id: ComponentId,
    quantity: Quantity,
  ) -> Result<Option<QuantityChange>> {
    let at = encode_dt(now());

    let change = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let change = query_components(&tx, "id = ?1", params![id.0])?
          .into_iter()
          .next()
          .map(|c| set_quantity(&tx, c, quantity, HistoryAction::Updated, &at))
          .transpose()?;
        tx.commit()?;
        Ok(change)
      })
      .await?;

    if let Some(ch) = &change {
      tracing::info!(
        id = %ch.component.id,
        old = ch.old_quantity,
        new = ch.new_quantity,
        "component quantity updated"
      );
    }
    Ok(change)
  }

  async fn find_by_field(&self, field: SearchField, needle: Needle) -> Result<Vec<Component>> {
    let col = column(field);

    let rows = match (field.matcher(), needle) {
      (Matcher::ExactInteger, Needle::Integer(n)) => {
        self
          .conn
          .call(move |conn| Ok(query_components(conn, &format!("{col} = ?1"), params![n])?))
          .await?
      }
      (Matcher::ExactInteger, Needle::Text(_)) => Vec::new(),
      (Matcher::Substring, needle) => {
        let text = match needle {
          Needle::Text(t) => t,
          Needle::Integer(n) => n.to_string(),
        };
        // SQLite's LIKE only folds ASCII, so candidates are filtered here.
        let wanted = text.to_lowercase();
        self
          .conn
          .call(move |conn| Ok(query_components(conn, &format!("{col} IS NOT NULL"), params![])?))
          .await?
          .into_iter()
          .filter(|c| {
            text_field(c, field).is_some_and(|v| v.to_lowercase().contains(&wanted))
          })
          .collect()
      }
    };

    Ok(rows)
  }

  async fn reconcile(&self, input: NewComponent) -> Result<Reconciliation> {
    let input = input.normalized()?;
    let at = encode_dt(now());

    let outcome: std::result::Result<Reconciliation, stocktake_core::Error> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Duplicate keys are possible through manual adds; the oldest row wins.
        let existing = query_components(
          &tx,
          "name = ?1 AND value IS ?2 AND location IS ?3",
          params![input.name, input.value, input.location],
        )?
        .into_iter()
        .next();

        let reconciliation = match existing {
          Some(component) => {
            let total = match Quantity::accumulate(component.quantity, input.quantity) {
              Ok(total) => total,
              Err(e) => return Ok(Err(e)),
            };
            Reconciliation::Merged(set_quantity(
              &tx,
              component,
              total,
              HistoryAction::UpdatedByImport,
              &at,
            )?)
          }
          None => Reconciliation::Created(insert_component(
            &tx,
            &input,
            HistoryAction::AddedByImport,
            &at,
          )?),
        };

        tx.commit()?;
        Ok(Ok(reconciliation))
      })
      .await?;

    let reconciliation = outcome?;
    match &reconciliation {
      Reconciliation::Created(c) => {
        tracing::info!(id = %c.id, name = %c.name, quantity = c.quantity, "component added by import");
      }
      Reconciliation::Merged(ch) => {
        tracing::info!(
          id = %ch.component.id,
          old = ch.old_quantity,
          new = ch.new_quantity,
          "component updated by import"
        );
      }
    }
    Ok(reconciliation)
  }

  // ── History Ledger ────────────────────────────────────────────────────────

  async fn record_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry> {
    let recorded_at = now();
    let at = encode_dt(recorded_at);
    let input = entry.clone();

    let id = self
      .conn
      .call(move |conn| Ok(insert_history(conn, &input, &at)?))
      .await?;

    Ok(HistoryEntry {
      id,
      component_id: entry.component_id,
      action: entry.action,
      recorded_at,
      old_quantity: entry.old_quantity,
      new_quantity: entry.new_quantity,
    })
  }

  async fn history(&self, component_id: ComponentId) -> Result<Vec<HistoryEntry>> {
    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {HISTORY_COLUMNS} FROM component_history
           WHERE component_id = ?1
           ORDER BY recorded_at DESC, history_id DESC"
        ))?;
        let rows = stmt
          .query_map(params![component_id.0], RawHistoryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }
}
