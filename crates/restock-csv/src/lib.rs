//! CSV codec for Restock.
//!
//! Converts uploaded tables into [`restock_core`] records and renders stored
//! history back out. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let sales = "ds,sku,y\n2024-01-01,A,12\n2024-01-02,A,9\n";
//! let rows = restock_csv::read_sales(sales.as_bytes()).unwrap();
//! println!("{} observations", rows.len());
//! ```

pub mod error;
mod read;
mod write;

pub use error::{Error, Result};
use restock_core::record::{
  ConstraintRow, ForecastRow, SalesRow, StockRow, StoredForecast,
};

// ─── Readers ─────────────────────────────────────────────────────────────────

/// Read sales history with columns `ds, sku, y`.
pub fn read_sales(input: &[u8]) -> Result<Vec<SalesRow>> {
  read::read_table(input, &["ds", "sku", "y"], read::Rows::Required)
}

/// Read current stock with columns `sku, stock`. A header-only table is a
/// valid, empty stock table.
pub fn read_stock(input: &[u8]) -> Result<Vec<StockRow>> {
  read::read_table(input, &["sku", "stock"], read::Rows::Optional)
}

/// Read SKU constraints with columns `sku, min_qty, stockout_risk` and an
/// optional `unit_cost`.
pub fn read_constraints(input: &[u8]) -> Result<Vec<ConstraintRow>> {
  read::read_table(
    input,
    &["sku", "min_qty", "stockout_risk"],
    read::Rows::Optional,
  )
}

/// Read a forecast produced elsewhere, with columns
/// `ds, sku, yhat, yhat_lower, yhat_upper`.
pub fn read_forecast(input: &[u8]) -> Result<Vec<ForecastRow>> {
  read::read_table(
    input,
    &["ds", "sku", "yhat", "yhat_lower", "yhat_upper"],
    read::Rows::Required,
  )
}

// ─── Writers ─────────────────────────────────────────────────────────────────

/// Render stored forecast rows using the persisted column order.
pub fn write_forecasts(rows: &[StoredForecast]) -> Result<String> {
  write::write_forecasts(rows)
}
