//! The `ForecastStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `restock-store-sqlite`).
//! Higher layers (`restock-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{StoredForecast, Trigger, TriggeredRow};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`ForecastStore::query`]. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
  pub sku:        Option<String>,
  /// Inclusive lower bound on the forecast date.
  pub start_date: Option<NaiveDate>,
  /// Inclusive upper bound on the forecast date.
  pub end_date:   Option<NaiveDate>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Durable history of triggered forecast runs.
///
/// Runs are append-only: each call to [`append_run`](Self::append_run) becomes
/// visible to readers all at once or not at all. The only in-place mutation
/// is the analyst override [`update_trigger`](Self::update_trigger).
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ForecastStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one run atomically and return the rows with their assigned ids,
  /// in input order.
  fn append_run(
    &self,
    rows: Vec<TriggeredRow>,
  ) -> impl Future<Output = Result<Vec<StoredForecast>, Self::Error>> + Send + '_;

  /// Return rows matching `query`, ordered by id.
  fn query<'a>(
    &'a self,
    query: &'a ForecastQuery,
  ) -> impl Future<Output = Result<Vec<StoredForecast>, Self::Error>> + Send + 'a;

  /// Retrieve a single row. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<StoredForecast>, Self::Error>> + Send + '_;

  /// Overwrite the trigger label of one stored row and return the row.
  ///
  /// Idempotent; nothing else about the row changes. Returns `None` if no
  /// row has this id.
  fn update_trigger(
    &self,
    id: i64,
    trigger: Trigger,
  ) -> impl Future<Output = Result<Option<StoredForecast>, Self::Error>> + Send + '_;

  /// Delete the history of one SKU, or everything when `sku` is `None`.
  /// Returns the number of rows removed.
  fn delete<'a>(
    &'a self,
    sku: Option<&'a str>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;
}
