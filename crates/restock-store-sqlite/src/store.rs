//! [`SqliteStore`], the SQLite implementation of [`ForecastStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use restock_core::{
  record::{StoredForecast, Trigger, TriggeredRow},
  store::{ForecastQuery, ForecastStore},
};

use crate::{
  Error, Result,
  encode::{COLUMNS, RawForecast, encode_date, encode_trigger},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Forecast history backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch(&self, id: i64) -> Result<Option<RawForecast>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM forecasts WHERE id = ?1"),
              rusqlite::params![id],
              RawForecast::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── ForecastStore impl ──────────────────────────────────────────────────────

impl ForecastStore for SqliteStore {
  type Error = Error;

  async fn append_run(
    &self,
    rows: Vec<TriggeredRow>,
  ) -> Result<Vec<StoredForecast>> {
    let encoded: Vec<_> = rows
      .iter()
      .map(|r| {
        (
          encode_date(r.forecast.date),
          r.forecast.sku.clone(),
          r.forecast.yhat,
          r.forecast.yhat_lower,
          r.forecast.yhat_upper,
          encode_trigger(r.reorder_trigger),
        )
      })
      .collect();

    // One transaction per run: readers see all of it or none of it.
    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(encoded.len());
        {
          let mut stmt = tx.prepare(
            "INSERT INTO forecasts (
               ds, sku, yhat, yhat_lower, yhat_upper, reorder_trigger
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (ds, sku, yhat, lower, upper, trigger) in &encoded {
            stmt.execute(rusqlite::params![ds, sku, yhat, lower, upper, trigger])?;
            ids.push(tx.last_insert_rowid());
          }
        }
        tx.commit()?;
        Ok(ids)
      })
      .await?;

    Ok(
      ids
        .into_iter()
        .zip(rows)
        .map(|(id, row)| StoredForecast { id, row })
        .collect(),
    )
  }

  async fn query(&self, query: &ForecastQuery) -> Result<Vec<StoredForecast>> {
    let sku   = query.sku.clone();
    let start = query.start_date.map(encode_date);
    let end   = query.end_date.map(encode_date);

    let raws: Vec<RawForecast> = self
      .conn
      .call(move |conn| {
        // Compare on the date part so timestamped legacy rows still match.
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM forecasts
           WHERE (?1 IS NULL OR sku = ?1)
             AND (?2 IS NULL OR substr(ds, 1, 10) >= ?2)
             AND (?3 IS NULL OR substr(ds, 1, 10) <= ?3)
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![sku, start, end], RawForecast::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawForecast::into_stored).collect()
  }

  async fn get(&self, id: i64) -> Result<Option<StoredForecast>> {
    self.fetch(id).await?.map(RawForecast::into_stored).transpose()
  }

  async fn update_trigger(
    &self,
    id: i64,
    trigger: Trigger,
  ) -> Result<Option<StoredForecast>> {
    let label = encode_trigger(trigger);

    // Update and read back in one call so a concurrent delete cannot slip in
    // between.
    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE forecasts SET reorder_trigger = ?1 WHERE id = ?2",
          rusqlite::params![label, id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM forecasts WHERE id = ?1"),
              rusqlite::params![id],
              RawForecast::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawForecast::into_stored).transpose()
  }

  async fn delete(&self, sku: Option<&str>) -> Result<u64> {
    let sku = sku.map(str::to_owned);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM forecasts WHERE (?1 IS NULL OR sku = ?1)",
          rusqlite::params![sku],
        )?)
      })
      .await?;

    Ok(removed as u64)
  }
}
