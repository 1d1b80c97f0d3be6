//! Handler for `POST /forecast`.
//!
//! Runs one planning pass: ingestion → forecast producer (unless a forecast
//! is uploaded) → trigger engine → enrichment, then persists the triggered
//! rows. Persistence failures are
//! reported in the response but do not fail the request.

use std::{collections::BTreeMap, sync::Arc};

use axum::{Json, extract::State};
use restock_core::{
  enrich::apply_constraints,
  producer::ForecastProducer,
  record::{PlanningRow, SalesRow, TriggeredRow},
  store::ForecastStore,
  trigger::{TriggerMode, apply_trigger},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ApiState, error::ApiError};

// ─── Request / response ──────────────────────────────────────────────────────

/// JSON body accepted by `POST /forecast`. Tables are CSV text.
#[derive(Debug, Deserialize)]
pub struct ForecastBody {
  /// Sales history with columns `ds, sku, y`.
  #[serde(default)]
  pub sales_csv:       Option<String>,
  /// A forecast produced elsewhere, with columns
  /// `ds, sku, yhat, yhat_lower, yhat_upper`. Replaces the built-in
  /// producer.
  #[serde(default)]
  pub forecast_csv:    Option<String>,
  /// Current stock with columns `sku, stock`; required by stock mode.
  #[serde(default)]
  pub stock_csv:       Option<String>,
  /// Constraints with columns `sku, min_qty, stockout_risk[, unit_cost]`.
  #[serde(default)]
  pub constraints_csv: Option<String>,
  #[serde(default = "default_mode")]
  pub reorder_mode:    String,
  #[serde(default = "default_threshold")]
  pub threshold:       f64,
  #[serde(default = "default_buffer")]
  pub buffer:          f64,
  /// Per-SKU baselines for percent-drop mode.
  #[serde(default)]
  pub baselines:       Option<BTreeMap<String, f64>>,
}

fn default_mode() -> String { "fixed".to_owned() }
fn default_threshold() -> f64 { 50.0 }
fn default_buffer() -> f64 { 10.0 }

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
  pub historical:        Vec<SalesRow>,
  pub forecast:          Vec<PlanningRow>,
  pub persisted:         bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub persistence_error: Option<String>,
}

// ─── Handler ─────────────────────────────────────────────────────────────────

struct Computed {
  historical: Vec<SalesRow>,
  triggered:  Vec<TriggeredRow>,
  planned:    Vec<PlanningRow>,
  mode:       &'static str,
}

/// The synchronous part of a run. Every input is parsed and validated
/// before the producer is invoked. An uploaded forecast bypasses the
/// producer; sales history is then optional and only echoed back.
fn compute(
  producer: &dyn ForecastProducer,
  body: ForecastBody,
) -> Result<Computed, ApiError> {
  if body.sales_csv.is_none() && body.forecast_csv.is_none() {
    return Err(ApiError::BadRequest(
      "either sales_csv or forecast_csv is required".into(),
    ));
  }
  let historical = body
    .sales_csv
    .as_deref()
    .map(|t| restock_csv::read_sales(t.as_bytes()))
    .transpose()
    .map_err(ApiError::table("sales"))?
    .unwrap_or_default();
  let imported = body
    .forecast_csv
    .as_deref()
    .map(|t| restock_csv::read_forecast(t.as_bytes()))
    .transpose()
    .map_err(ApiError::table("forecast"))?;
  let stock = body
    .stock_csv
    .as_deref()
    .map(|t| restock_csv::read_stock(t.as_bytes()))
    .transpose()
    .map_err(ApiError::table("stock"))?;
  let constraints = body
    .constraints_csv
    .as_deref()
    .map(|t| restock_csv::read_constraints(t.as_bytes()))
    .transpose()
    .map_err(ApiError::table("constraints"))?;

  let mode = TriggerMode::from_params(
    &body.reorder_mode,
    Some(body.threshold),
    Some(body.buffer),
    body.baselines,
  )?;

  let forecast = match imported {
    Some(rows) => rows,
    None => producer.forecast(&historical)?,
  };
  let triggered = apply_trigger(forecast, &mode, stock.as_deref())?;
  let planned = apply_constraints(triggered.clone(), constraints.as_deref())?;

  Ok(Computed { historical, triggered, planned, mode: mode.name() })
}

/// `POST /forecast`
pub async fn run<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ForecastBody>,
) -> Result<Json<ForecastResponse>, ApiError>
where
  S: ForecastStore,
{
  let producer = Arc::clone(&state.producer);
  let Computed { historical, triggered, planned, mode } =
    tokio::task::spawn_blocking(move || compute(producer.as_ref(), body))
      .await
      .map_err(|e| ApiError::Internal(e.to_string()))??;

  let reorder = triggered
    .iter()
    .filter(|r| r.reorder_trigger.is_reorder())
    .count();
  info!(
    mode,
    history = historical.len(),
    rows = triggered.len(),
    reorder,
    "forecast run complete"
  );

  let (persisted, persistence_error) =
    match state.store.append_run(triggered).await {
      Ok(_) => (true, None),
      Err(e) => {
        warn!(error = %e, "failed to persist forecast run");
        (false, Some(e.to_string()))
      }
    };

  Ok(Json(ForecastResponse {
    historical,
    forecast: planned,
    persisted,
    persistence_error,
  }))
}
