//! Handlers for `/forecasts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/forecasts` | Optional `sku`, `start_date`, `end_date` (inclusive) |
//! | `GET`    | `/forecasts/export` | Same filters; `text/csv` |
//! | `DELETE` | `/forecasts` | Optional `sku`; without it (or when blank) the whole history goes |
//! | `GET`    | `/forecasts/{id}` | Single stored row |
//! | `PUT`    | `/forecasts/{id}/trigger` | Body: `{"reorder_trigger":"hold"}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
};
use restock_core::{
  record::{StoredForecast, Trigger},
  store::{ForecastQuery, ForecastStore},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ApiState, error::ApiError};

/// A blank `sku` parameter means no SKU filter.
fn sku_filter(sku: Option<String>) -> Option<String> {
  sku.filter(|s| !s.trim().is_empty())
}

fn normalize(query: ForecastQuery) -> Result<ForecastQuery, ApiError> {
  if let (Some(start), Some(end)) = (query.start_date, query.end_date)
    && start > end
  {
    return Err(ApiError::BadRequest(format!(
      "start_date {start} is after end_date {end}"
    )));
  }
  Ok(ForecastQuery { sku: sku_filter(query.sku), ..query })
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /forecasts[?sku=...][&start_date=...][&end_date=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(query): Query<ForecastQuery>,
) -> Result<Json<Vec<StoredForecast>>, ApiError>
where
  S: ForecastStore,
{
  let query = normalize(query)?;
  debug!(?query, "querying forecast history");
  let rows = state.store.query(&query).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// `GET /forecasts/export`: the filtered history as a CSV attachment.
pub async fn export<S>(
  State(state): State<ApiState<S>>,
  Query(query): Query<ForecastQuery>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForecastStore,
{
  let query = normalize(query)?;
  let rows = state.store.query(&query).await.map_err(ApiError::store)?;
  let body = restock_csv::write_forecasts(&rows)?;
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (
        header::CONTENT_DISPOSITION,
        "attachment; filename=\"forecasts.csv\"",
      ),
    ],
    body,
  ))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  pub sku: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub deleted: u64,
}

/// `DELETE /forecasts[?sku=...]`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<DeleteParams>,
) -> Result<Json<Deleted>, ApiError>
where
  S: ForecastStore,
{
  let sku = sku_filter(params.sku);
  let deleted = state
    .store
    .delete(sku.as_deref())
    .await
    .map_err(ApiError::store)?;
  info!(?sku, deleted, "forecast history deleted");
  Ok(Json(Deleted { deleted }))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /forecasts/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<StoredForecast>, ApiError>
where
  S: ForecastStore,
{
  let row = state
    .store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("forecast {id} not found")))?;
  Ok(Json(row))
}

// ─── Trigger correction ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TriggerBody {
  pub reorder_trigger: String,
}

/// `PUT /forecasts/{id}/trigger`: analyst override of one row's label.
pub async fn correct_trigger<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<TriggerBody>,
) -> Result<Json<StoredForecast>, ApiError>
where
  S: ForecastStore,
{
  let trigger = Trigger::parse(&body.reorder_trigger)?;
  let row = state
    .store
    .update_trigger(id, trigger)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("forecast {id} not found")))?;

  info!(id, %trigger, "reorder trigger corrected");
  Ok(Json(row))
}
