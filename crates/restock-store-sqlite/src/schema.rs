//! SQL schema for the Restock SQLite store.
//!
//! The `forecasts` layout is shared with previously-written history and must
//! not change shape.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Append-only apart from analyst corrections to reorder_trigger.
CREATE TABLE IF NOT EXISTS forecasts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    ds              TEXT,            -- forecast date, YYYY-MM-DD
    sku             TEXT,
    yhat            REAL,
    yhat_lower      REAL,
    yhat_upper      REAL,
    reorder_trigger TEXT             -- 'reorder' | 'hold'
);

CREATE INDEX IF NOT EXISTS forecasts_sku_idx ON forecasts(sku);
CREATE INDEX IF NOT EXISTS forecasts_ds_idx  ON forecasts(ds);
";
