//! Header-checked, typed CSV decoding.

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Whether a table must carry at least one data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rows {
  Required,
  Optional,
}

/// Decode `input` into `T`s after checking that every `expected` column is
/// present. Extra columns are ignored; cells are trimmed.
pub(crate) fn read_table<T: DeserializeOwned>(
  input: &[u8],
  expected: &[&str],
  rows: Rows,
) -> Result<Vec<T>> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .trim(csv::Trim::All)
    .from_reader(input);

  let headers = reader.headers()?.clone();
  let missing: Vec<String> = expected
    .iter()
    .filter(|col| !headers.iter().any(|h| h == **col))
    .map(|col| (*col).to_owned())
    .collect();
  if !missing.is_empty() {
    return Err(Error::MissingColumns(missing));
  }

  let mut records = Vec::new();
  for (index, result) in reader.deserialize().enumerate() {
    // Line 1 is the header.
    let record: T = result.map_err(|source| Error::Row {
      line: index as u64 + 2,
      source,
    })?;
    records.push(record);
  }

  if rows == Rows::Required && records.is_empty() {
    return Err(Error::Empty);
  }
  Ok(records)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use rust_decimal_macros::dec;

  use crate::*;

  #[test]
  fn reads_sales_with_extra_columns_and_padding() {
    let input = "ds, sku ,y,store\n2024-01-01, A ,12,north\n2024-01-02,B,3.5,south\n";
    let rows = read_sales(input.as_bytes()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(rows[0].sku, "A");
    assert_eq!(rows[1].y, 3.5);
  }

  #[test]
  fn reports_all_missing_columns() {
    let err = read_forecast(b"ds,sku,yhat\n2024-01-01,A,1\n").unwrap_err();
    match err {
      Error::MissingColumns(cols) => {
        assert_eq!(cols, ["yhat_lower", "yhat_upper"]);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn reports_line_of_bad_row() {
    let input = "ds,sku,y\n2024-01-01,A,1\n2024-01-02,A,lots\n";
    let err = read_sales(input.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Row { line: 3, .. }), "{err}");
  }

  #[test]
  fn header_only_sales_is_empty() {
    assert!(matches!(read_sales(b"ds,sku,y\n"), Err(Error::Empty)));
  }

  #[test]
  fn header_only_stock_is_valid() {
    assert!(read_stock(b"sku,stock\n").unwrap().is_empty());
  }

  #[test]
  fn constraints_take_optional_unit_cost() {
    let input = "sku,min_qty,stockout_risk,unit_cost\nA,5,0.8,4.25\nB,2,0.1,\n";
    let rows = read_constraints(input.as_bytes()).unwrap();
    assert_eq!(rows[0].min_qty, 5);
    assert_eq!(rows[0].unit_cost, Some(dec!(4.25)));
    assert_eq!(rows[1].unit_cost, None);

    let without = read_constraints(b"sku,min_qty,stockout_risk\nA,5,0.8\n")
      .unwrap();
    assert_eq!(without[0].unit_cost, None);
  }
}
