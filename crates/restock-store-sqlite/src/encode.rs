//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are written as `YYYY-MM-DD`. Older history stored full timestamps
//! (`YYYY-MM-DD HH:MM:SS`); only the date part of those is read back.

use chrono::NaiveDate;
use restock_core::record::{ForecastRow, StoredForecast, Trigger, TriggeredRow};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  let date_part = s.trim().get(..10).unwrap_or(s);
  NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Trigger ─────────────────────────────────────────────────────────────────

pub fn encode_trigger(trigger: Trigger) -> &'static str {
  match trigger {
    Trigger::Reorder => "reorder",
    Trigger::Hold => "hold",
  }
}

pub fn decode_trigger(s: &str) -> Result<Trigger> { Ok(Trigger::parse(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` so [`RawForecast::from_row`] can read
/// by position.
pub const COLUMNS: &str =
  "id, ds, sku, yhat, yhat_lower, yhat_upper, reorder_trigger";

/// Raw values read directly from a `forecasts` row.
pub struct RawForecast {
  pub id:              i64,
  pub ds:              String,
  pub sku:             String,
  pub yhat:            f64,
  pub yhat_lower:      f64,
  pub yhat_upper:      f64,
  pub reorder_trigger: String,
}

impl RawForecast {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      ds:              row.get(1)?,
      sku:             row.get(2)?,
      yhat:            row.get(3)?,
      yhat_lower:      row.get(4)?,
      yhat_upper:      row.get(5)?,
      reorder_trigger: row.get(6)?,
    })
  }

  pub fn into_stored(self) -> Result<StoredForecast> {
    Ok(StoredForecast {
      id:  self.id,
      row: TriggeredRow {
        forecast:        ForecastRow {
          date:       decode_date(&self.ds)?,
          sku:        self.sku,
          yhat:       self.yhat,
          yhat_lower: self.yhat_lower,
          yhat_upper: self.yhat_upper,
        },
        reorder_trigger: decode_trigger(&self.reorder_trigger)?,
      },
    })
  }
}
