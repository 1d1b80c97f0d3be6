//! CSV rendering of stored history.

use restock_core::record::StoredForecast;

use crate::{Error, Result};

const HEADER: [&str; 7] = [
  "id",
  "ds",
  "sku",
  "yhat",
  "yhat_lower",
  "yhat_upper",
  "reorder_trigger",
];

pub(crate) fn write_forecasts(rows: &[StoredForecast]) -> Result<String> {
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(HEADER)?;

  for stored in rows {
    let f = &stored.row.forecast;
    writer.write_record([
      stored.id.to_string(),
      f.date.format("%Y-%m-%d").to_string(),
      f.sku.clone(),
      f.yhat.to_string(),
      f.yhat_lower.to_string(),
      f.yhat_upper.to_string(),
      stored.row.reorder_trigger.to_string(),
    ])?;
  }

  let bytes = writer
    .into_inner()
    .map_err(|e| Error::Writer(e.to_string()))?;
  String::from_utf8(bytes).map_err(|e| Error::Writer(e.to_string()))
}
