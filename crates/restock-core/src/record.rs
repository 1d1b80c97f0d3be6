//! Typed records flowing through the planner.
//!
//! A [`ForecastRow`] is emitted by a forecast producer and never changed
//! afterwards. The trigger engine wraps it into a [`TriggeredRow`], and the
//! enrichment step wraps that into a [`PlanningRow`] carrying the per-SKU
//! attributes the optimizer needs. Wire names follow the persisted column
//! names (`ds`, `yhat`, …).

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// One historical sales observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRow {
  #[serde(rename = "ds", alias = "date")]
  pub date: NaiveDate,
  pub sku:  String,
  /// Units sold on `date`.
  pub y:    f64,
}

/// A point forecast with its uncertainty band for one (date, SKU) pair.
///
/// `yhat_lower <= yhat <= yhat_upper` always holds for rows that passed
/// [`validate_forecast`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
  #[serde(rename = "ds", alias = "date")]
  pub date:       NaiveDate,
  pub sku:        String,
  pub yhat:       f64,
  pub yhat_lower: f64,
  pub yhat_upper: f64,
}

/// Current on-hand stock for a SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
  pub sku:   String,
  pub stock: f64,
}

/// Planner-supplied constraints for a SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRow {
  pub sku:           String,
  /// Minimum orderable lot.
  pub min_qty:       u32,
  /// Probability in `[0, 1]` that the SKU runs out before the next
  /// replenishment.
  pub stockout_risk: f64,
  #[serde(default)]
  pub unit_cost:     Option<Decimal>,
}

// ─── Trigger ─────────────────────────────────────────────────────────────────

/// The reorder signal attached to a forecast row.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Trigger {
  Reorder,
  Hold,
}

impl Trigger {
  pub fn is_reorder(self) -> bool { matches!(self, Self::Reorder) }

  /// Parse a stored or user-supplied label.
  pub fn parse(label: &str) -> Result<Self> {
    label
      .trim()
      .parse()
      .map_err(|_| Error::UnknownTrigger(label.to_owned()))
  }
}

/// A forecast row labelled by the trigger engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredRow {
  #[serde(flatten)]
  pub forecast:        ForecastRow,
  pub reorder_trigger: Trigger,
}

// ─── Planning ────────────────────────────────────────────────────────────────

pub const DEFAULT_UNIT_COST: Decimal = Decimal::ONE_HUNDRED;
pub const DEFAULT_MIN_QTY: u32 = 1;
pub const DEFAULT_STOCKOUT_RISK: f64 = 0.5;

/// Per-SKU cost and constraint attributes consumed by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuAttributes {
  pub unit_cost:     Decimal,
  pub min_qty:       u32,
  pub stockout_risk: f64,
}

impl Default for SkuAttributes {
  fn default() -> Self {
    Self {
      unit_cost:     DEFAULT_UNIT_COST,
      min_qty:       DEFAULT_MIN_QTY,
      stockout_risk: DEFAULT_STOCKOUT_RISK,
    }
  }
}

/// A triggered row with fully-populated planning attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRow {
  #[serde(flatten)]
  pub row:   TriggeredRow,
  #[serde(flatten)]
  pub attrs: SkuAttributes,
}

impl PlanningRow {
  pub fn sku(&self) -> &str { &self.row.forecast.sku }
}

/// A triggered row as received from outside the core, where any planning
/// attribute may be absent. See [`crate::enrich::complete`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialPlanningRow {
  #[serde(flatten)]
  pub row:           TriggeredRow,
  #[serde(default)]
  pub unit_cost:     Option<Decimal>,
  #[serde(default)]
  pub min_qty:       Option<u32>,
  #[serde(default)]
  pub stockout_risk: Option<f64>,
}

// ─── Persisted ───────────────────────────────────────────────────────────────

/// A triggered row as held by a [`crate::store::ForecastStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredForecast {
  /// Store-assigned surrogate key.
  pub id:  i64,
  #[serde(flatten)]
  pub row: TriggeredRow,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check the producer → engine contract: non-empty, non-empty SKUs, finite
/// ordered bands and unique (date, sku) pairs.
pub fn validate_forecast(rows: &[ForecastRow]) -> Result<()> {
  if rows.is_empty() {
    return Err(Error::InvalidForecastInput("forecast is empty".into()));
  }

  let mut seen = HashSet::with_capacity(rows.len());
  for row in rows {
    if row.sku.trim().is_empty() {
      return Err(Error::InvalidForecastInput(format!(
        "row dated {} has an empty sku",
        row.date
      )));
    }
    if ![row.yhat, row.yhat_lower, row.yhat_upper]
      .iter()
      .all(|v| v.is_finite())
    {
      return Err(Error::InvalidForecastInput(format!(
        "non-finite forecast value for {} on {}",
        row.sku, row.date
      )));
    }
    if !(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper) {
      return Err(Error::InvalidForecastInput(format!(
        "band violated for {} on {}: {} <= {} <= {} does not hold",
        row.sku, row.date, row.yhat_lower, row.yhat, row.yhat_upper
      )));
    }
    if !seen.insert((row.date, row.sku.as_str())) {
      return Err(Error::InvalidForecastInput(format!(
        "duplicate row for {} on {}",
        row.sku, row.date
      )));
    }
  }
  Ok(())
}
