//! Forecast producers.
//!
//! The planner only depends on the [`ForecastProducer`] output schema. The
//! bundled [`MovingAverageProducer`] is a transparent baseline so the service
//! works end to end without an external modelling system.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{ForecastRow, SalesRow},
};

/// Turns sales history into per-(date, SKU) forecasts.
pub trait ForecastProducer: Send + Sync {
  fn forecast(&self, history: &[SalesRow]) -> Result<Vec<ForecastRow>>;
}

/// Tuning for [`MovingAverageProducer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerSettings {
  /// Number of most recent daily observations averaged per SKU.
  pub window:       usize,
  /// Days forecast past each SKU's last observation.
  pub horizon_days: u32,
  /// Band half-width in standard deviations.
  pub band_width:   f64,
}

impl Default for ProducerSettings {
  fn default() -> Self {
    Self { window: 28, horizon_days: 30, band_width: 1.96 }
  }
}

impl ProducerSettings {
  pub fn validate(&self) -> Result<()> {
    if self.window == 0 {
      return Err(Error::InvalidProducerSettings("window must be at least 1".into()));
    }
    if self.horizon_days == 0 {
      return Err(Error::InvalidProducerSettings(
        "horizon_days must be at least 1".into(),
      ));
    }
    if !self.band_width.is_finite() || self.band_width < 0.0 {
      return Err(Error::InvalidProducerSettings(format!(
        "band_width must be a non-negative number, got {}",
        self.band_width
      )));
    }
    Ok(())
  }
}

/// Flat forecast at the trailing mean, banded by the trailing standard
/// deviation.
#[derive(Debug, Clone)]
pub struct MovingAverageProducer {
  settings: ProducerSettings,
}

impl MovingAverageProducer {
  pub fn new(settings: ProducerSettings) -> Result<Self> {
    settings.validate()?;
    Ok(Self { settings })
  }

  pub fn settings(&self) -> &ProducerSettings { &self.settings }
}

impl ForecastProducer for MovingAverageProducer {
  fn forecast(&self, history: &[SalesRow]) -> Result<Vec<ForecastRow>> {
    let series = daily_series(history)?;
    let ProducerSettings { window, horizon_days, band_width } = self.settings;

    let mut rows = Vec::with_capacity(series.len() * horizon_days as usize);
    for (sku, days) in series {
      let tail: Vec<f64> = days.values().rev().take(window).copied().collect();
      let n = tail.len() as f64;
      let mean = tail.iter().sum::<f64>() / n;
      let variance = tail.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
      let spread = band_width * variance.sqrt();

      // `daily_series` never yields an empty series.
      let Some(last) = days.keys().next_back().copied() else { continue };
      for offset in 1..=u64::from(horizon_days) {
        let Some(date) = last.checked_add_days(Days::new(offset)) else { break };
        rows.push(ForecastRow {
          date,
          sku: sku.to_owned(),
          yhat: mean,
          yhat_lower: (mean - spread).max(0.0),
          yhat_upper: mean + spread,
        });
      }
    }
    Ok(rows)
  }
}

/// Validate history and sum it per SKU per day.
fn daily_series(
  history: &[SalesRow],
) -> Result<BTreeMap<&str, BTreeMap<NaiveDate, f64>>> {
  if history.is_empty() {
    return Err(Error::InvalidSalesHistory("sales history is empty".into()));
  }

  let mut series: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
  for row in history {
    if row.sku.trim().is_empty() {
      return Err(Error::InvalidSalesHistory(format!(
        "row dated {} has an empty sku",
        row.date
      )));
    }
    if !row.y.is_finite() || row.y < 0.0 {
      return Err(Error::InvalidSalesHistory(format!(
        "sales for {} on {} must be a non-negative number, got {}",
        row.sku, row.date, row.y
      )));
    }
    *series
      .entry(row.sku.as_str())
      .or_default()
      .entry(row.date)
      .or_default() += row.y;
  }
  Ok(series)
}
