//! Handler for `POST /optimize`.

use axum::Json;
use restock_core::{
  enrich::complete,
  optimize::{Objective, Plan, plan},
  record::PartialPlanningRow,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;

/// JSON body accepted by `POST /optimize`.
#[derive(Debug, Deserialize)]
pub struct OptimizeBody {
  /// Triggered forecast rows; missing planning attributes take defaults.
  pub forecast:  Vec<PartialPlanningRow>,
  #[serde(default = "default_budget")]
  pub budget:    Decimal,
  /// `maximize_demand` or `fair_allocation`; case, spaces and hyphens are
  /// tolerated.
  #[serde(default = "default_objective")]
  pub objective: String,
}

fn default_budget() -> Decimal { Decimal::new(50_000, 0) }
fn default_objective() -> String { "maximize_demand".to_owned() }

/// `POST /optimize`: returns the reorder [`Plan`].
pub async fn handler(
  Json(body): Json<OptimizeBody>,
) -> Result<Json<Plan>, ApiError> {
  let objective: Objective = body.objective.parse()?;
  let OptimizeBody { forecast, budget, .. } = body;
  let summary = tokio::task::spawn_blocking(move || {
    let rows = complete(forecast)?;
    plan(&rows, budget, objective)
  })
  .await
  .map_err(|e| ApiError::Internal(e.to_string()))??;

  info!(
    %objective,
    budget = %summary.budget,
    spend = %summary.total_spend,
    skus = summary.decisions.len(),
    "reorder plan computed"
  );
  Ok(Json(summary))
}
