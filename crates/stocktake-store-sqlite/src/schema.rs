//! SQL schema for the stocktake SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT keeps ids of deleted components from being handed out again.
CREATE TABLE IF NOT EXISTS components (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT    NOT NULL,
    quantity  INTEGER NOT NULL CHECK (quantity >= 0),
    location  TEXT,
    category  TEXT,
    value     TEXT
);

-- History is strictly append-only: no UPDATE or DELETE is ever issued
-- against this table. component_id is not a foreign key: entries outlive
-- the component they describe.
CREATE TABLE IF NOT EXISTS component_history (
    history_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    component_id  INTEGER NOT NULL,
    action        TEXT    NOT NULL,   -- HistoryAction label
    recorded_at   TEXT    NOT NULL,   -- RFC 3339 UTC, whole seconds
    old_quantity  INTEGER,
    new_quantity  INTEGER
);

CREATE INDEX IF NOT EXISTS components_name_idx       ON components(name);
CREATE INDEX IF NOT EXISTS history_component_idx     ON component_history(component_id);

PRAGMA user_version = 1;
";
