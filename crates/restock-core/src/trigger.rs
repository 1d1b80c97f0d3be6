//! Reorder trigger policy and engine.
//!
//! [`TriggerMode::evaluate`] is the per-row policy; [`apply_trigger`] runs it
//! across a whole forecast run, joining in current stock where the mode needs
//! it. Labels only signal that a SKU warrants reordering; quantities are the
//! optimizer's job.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{ForecastRow, StockRow, Trigger, TriggeredRow, validate_forecast},
};

// ─── Mode ────────────────────────────────────────────────────────────────────

/// Where the percent-drop mode takes its per-SKU reference demand from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum BaselineSource {
  /// The `yhat` of the earliest-dated row for the SKU in the run.
  #[default]
  EarliestInRun,
  /// Caller-supplied baselines keyed by SKU. SKUs missing from the map fall
  /// back to [`BaselineSource::EarliestInRun`].
  Supplied(BTreeMap<String, f64>),
}

/// The trigger policy for one run, applied uniformly to every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TriggerMode {
  /// Reorder when `yhat < threshold`.
  Fixed { threshold: f64 },
  /// Reorder when `(baseline - yhat) / baseline >= threshold`.
  PercentDrop {
    threshold: f64,
    #[serde(default)]
    baseline:  BaselineSource,
  },
  /// Reorder when `stock - yhat <= buffer`.
  Stock { buffer: f64 },
}

impl TriggerMode {
  /// Build a validated mode from the loosely-typed parameters a caller sends.
  ///
  /// `threshold` is required by `fixed` and `percent_drop`; `buffer` by
  /// `stock`. Parameters a mode does not use are ignored.
  pub fn from_params(
    tag: &str,
    threshold: Option<f64>,
    buffer: Option<f64>,
    baselines: Option<BTreeMap<String, f64>>,
  ) -> Result<Self> {
    let require = |name: &str, value: Option<f64>| {
      value.ok_or_else(|| {
        Error::InvalidModeParameters(format!("{tag} mode requires `{name}`"))
      })
    };

    let mode = match tag.trim().to_ascii_lowercase().as_str() {
      "fixed" => Self::Fixed { threshold: require("threshold", threshold)? },
      "percent_drop" => Self::PercentDrop {
        threshold: require("threshold", threshold)?,
        baseline:  baselines
          .map(BaselineSource::Supplied)
          .unwrap_or_default(),
      },
      "stock" => Self::Stock { buffer: require("buffer", buffer)? },
      other => {
        return Err(Error::InvalidModeParameters(format!(
          "unknown trigger mode {other:?}"
        )));
      }
    };
    mode.validate()?;
    Ok(mode)
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Fixed { .. } => "fixed",
      Self::PercentDrop { .. } => "percent_drop",
      Self::Stock { .. } => "stock",
    }
  }

  /// Reject negative or non-finite parameters.
  pub fn validate(&self) -> Result<()> {
    let check = |name: &str, value: f64| {
      if value.is_finite() && value >= 0.0 {
        Ok(())
      } else {
        Err(Error::InvalidModeParameters(format!(
          "{} `{name}` must be a non-negative number, got {value}",
          self.name()
        )))
      }
    };

    match self {
      Self::Fixed { threshold } => check("threshold", *threshold),
      Self::PercentDrop { threshold, baseline } => {
        check("threshold", *threshold)?;
        if let BaselineSource::Supplied(map) = baseline
          && let Some((sku, value)) = map.iter().find(|(_, v)| !v.is_finite())
        {
          return Err(Error::InvalidModeParameters(format!(
            "baseline for {sku:?} is not finite: {value}"
          )));
        }
        Ok(())
      }
      Self::Stock { buffer } => check("buffer", *buffer),
    }
  }

  /// Label a single row.
  ///
  /// `reference` is the SKU's baseline (percent-drop) or on-hand stock
  /// (stock mode); it is ignored by fixed mode.
  pub fn evaluate(&self, row: &ForecastRow, reference: f64) -> Trigger {
    let reorder = match self {
      Self::Fixed { threshold } => row.yhat < *threshold,
      // A non-positive baseline has no meaningful drop; such SKUs never
      // trigger.
      Self::PercentDrop { threshold, .. } => {
        reference > 0.0 && (reference - row.yhat) / reference >= *threshold
      }
      Self::Stock { buffer } => reference - row.yhat <= *buffer,
    };
    if reorder { Trigger::Reorder } else { Trigger::Hold }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Label every row of a forecast run.
///
/// Rows come back in input order with all forecast fields untouched. Stock
/// mode requires `stock`; an empty table is valid and every SKU without a
/// stock row is treated as holding zero units. Other modes ignore `stock`.
///
/// All validation happens before any row is labelled, so a failure never
/// yields partial output.
pub fn apply_trigger(
  rows: Vec<ForecastRow>,
  mode: &TriggerMode,
  stock: Option<&[StockRow]>,
) -> Result<Vec<TriggeredRow>> {
  validate_forecast(&rows)?;
  mode.validate()?;

  // Rows that define their SKU's percent-drop baseline have nothing to drop
  // from and always hold.
  let mut baseline_rows: HashMap<String, NaiveDate> = HashMap::new();
  let references: HashMap<String, f64> = match mode {
    TriggerMode::Fixed { .. } => HashMap::new(),
    TriggerMode::PercentDrop { baseline, .. } => {
      let (values, dates) = baselines(&rows, baseline);
      baseline_rows = dates;
      values
    }
    TriggerMode::Stock { .. } => {
      stock_levels(stock.ok_or(Error::MissingStockData)?)?
    }
  };

  Ok(
    rows
      .into_iter()
      .map(|forecast| {
        let reorder_trigger =
          if baseline_rows.get(&forecast.sku) == Some(&forecast.date) {
            Trigger::Hold
          } else {
            let reference =
              references.get(&forecast.sku).copied().unwrap_or(0.0);
            mode.evaluate(&forecast, reference)
          };
        TriggeredRow { forecast, reorder_trigger }
      })
      .collect(),
  )
}

/// Resolve the percent-drop baseline for every SKU in `rows`.
///
/// Also returns, for each SKU whose baseline came from the run itself, the
/// date of the row it was taken from.
fn baselines(
  rows: &[ForecastRow],
  source: &BaselineSource,
) -> (HashMap<String, f64>, HashMap<String, NaiveDate>) {
  let mut earliest: HashMap<&str, (NaiveDate, f64)> = HashMap::new();
  for row in rows {
    earliest
      .entry(row.sku.as_str())
      .and_modify(|(date, yhat)| {
        if row.date < *date {
          *date = row.date;
          *yhat = row.yhat;
        }
      })
      .or_insert((row.date, row.yhat));
  }

  let mut values = HashMap::with_capacity(earliest.len());
  let mut dates = HashMap::new();
  for (sku, (date, yhat)) in earliest {
    let supplied = match source {
      BaselineSource::Supplied(map) => map.get(sku).copied(),
      BaselineSource::EarliestInRun => None,
    };
    match supplied {
      Some(value) => {
        values.insert(sku.to_owned(), value);
      }
      None => {
        values.insert(sku.to_owned(), yhat);
        dates.insert(sku.to_owned(), date);
      }
    }
  }
  (values, dates)
}

/// Index stock rows by SKU, enforcing one non-negative row per SKU.
fn stock_levels(stock: &[StockRow]) -> Result<HashMap<String, f64>> {
  let mut levels = HashMap::with_capacity(stock.len());
  for row in stock {
    if !row.stock.is_finite() || row.stock < 0.0 {
      return Err(Error::InvalidStockData(format!(
        "stock for {:?} must be a non-negative number, got {}",
        row.sku, row.stock
      )));
    }
    if levels.insert(row.sku.clone(), row.stock).is_some() {
      return Err(Error::InvalidStockData(format!(
        "more than one stock row for {:?}",
        row.sku
      )));
    }
  }
  Ok(levels)
}
