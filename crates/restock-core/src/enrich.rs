//! The input-normalization boundary.
//!
//! Planning attributes (`unit_cost`, `min_qty`, `stockout_risk`) are resolved
//! here and nowhere else, so the optimizer always receives fully-populated
//! [`PlanningRow`]s.

use std::collections::HashMap;

use crate::{
  Error, Result,
  record::{
    ConstraintRow, PartialPlanningRow, PlanningRow, SkuAttributes, TriggeredRow,
  },
};

/// Left-join `constraints` onto `rows` by SKU and fill in defaults.
///
/// SKUs without a constraint row keep [`SkuAttributes::default`]; a
/// constraint row without a `unit_cost` keeps the default cost.
pub fn apply_constraints(
  rows: Vec<TriggeredRow>,
  constraints: Option<&[ConstraintRow]>,
) -> Result<Vec<PlanningRow>> {
  let by_sku = index_constraints(constraints.unwrap_or_default())?;

  Ok(
    rows
      .into_iter()
      .map(|row| {
        let attrs = by_sku
          .get(row.forecast.sku.as_str())
          .cloned()
          .unwrap_or_default();
        PlanningRow { row, attrs }
      })
      .collect(),
  )
}

/// Fill in defaults for attributes an external caller left out.
pub fn complete(rows: Vec<PartialPlanningRow>) -> Result<Vec<PlanningRow>> {
  rows
    .into_iter()
    .map(|partial| {
      let defaults = SkuAttributes::default();
      let attrs = SkuAttributes {
        unit_cost:     partial.unit_cost.unwrap_or(defaults.unit_cost),
        min_qty:       partial.min_qty.unwrap_or(defaults.min_qty),
        stockout_risk: partial.stockout_risk.unwrap_or(defaults.stockout_risk),
      };
      check_risk(&partial.row.forecast.sku, attrs.stockout_risk)?;
      Ok(PlanningRow { row: partial.row, attrs })
    })
    .collect()
}

fn index_constraints(
  constraints: &[ConstraintRow],
) -> Result<HashMap<&str, SkuAttributes>> {
  let mut by_sku = HashMap::with_capacity(constraints.len());
  for c in constraints {
    check_risk(&c.sku, c.stockout_risk)?;
    let attrs = SkuAttributes {
      unit_cost:     c.unit_cost.unwrap_or(SkuAttributes::default().unit_cost),
      min_qty:       c.min_qty,
      stockout_risk: c.stockout_risk,
    };
    if by_sku.insert(c.sku.as_str(), attrs).is_some() {
      return Err(Error::InvalidConstraintData(format!(
        "more than one constraint row for {:?}",
        c.sku
      )));
    }
  }
  Ok(by_sku)
}

fn check_risk(sku: &str, risk: f64) -> Result<()> {
  if (0.0..=1.0).contains(&risk) {
    Ok(())
  } else {
    Err(Error::InvalidConstraintData(format!(
      "stockout_risk for {sku:?} must lie in [0, 1], got {risk}"
    )))
  }
}

#[cfg(test)]
mod tests {
  use rust_decimal_macros::dec;

  use super::*;
  use crate::record::{Trigger, test_helpers::forecast};

  fn triggered(sku: &str) -> TriggeredRow {
    TriggeredRow {
      forecast:        forecast(1, sku, 20.0),
      reorder_trigger: Trigger::Reorder,
    }
  }

  fn constraint(sku: &str, min_qty: u32, risk: f64) -> ConstraintRow {
    ConstraintRow {
      sku: sku.to_string(),
      min_qty,
      stockout_risk: risk,
      unit_cost: None,
    }
  }

  #[test]
  fn absent_table_applies_defaults() {
    let out = apply_constraints(vec![triggered("A")], None).unwrap();
    assert_eq!(out[0].attrs.unit_cost, dec!(100));
    assert_eq!(out[0].attrs.min_qty, 1);
    assert_eq!(out[0].attrs.stockout_risk, 0.5);
  }

  #[test]
  fn constraints_join_by_sku() {
    let mut a = constraint("A", 12, 0.9);
    a.unit_cost = Some(dec!(4.25));
    let table = vec![a];
    let out =
      apply_constraints(vec![triggered("A"), triggered("B")], Some(&table))
        .unwrap();

    assert_eq!(out[0].attrs, SkuAttributes {
      unit_cost:     dec!(4.25),
      min_qty:       12,
      stockout_risk: 0.9,
    });
    assert_eq!(out[1].attrs, SkuAttributes::default());
  }

  #[test]
  fn duplicate_constraint_rows_are_rejected() {
    let table = vec![constraint("A", 1, 0.1), constraint("A", 2, 0.2)];
    let err = apply_constraints(vec![triggered("A")], Some(&table)).unwrap_err();
    assert!(matches!(err, Error::InvalidConstraintData(_)));
  }

  #[test]
  fn out_of_range_risk_is_rejected() {
    let table = vec![constraint("A", 1, 1.5)];
    assert!(apply_constraints(vec![triggered("A")], Some(&table)).is_err());
  }

  #[test]
  fn complete_keeps_supplied_values() {
    let partial = PartialPlanningRow {
      row:           triggered("A"),
      unit_cost:     Some(dec!(7)),
      min_qty:       None,
      stockout_risk: Some(0.1),
    };
    let out = complete(vec![partial]).unwrap();
    assert_eq!(out[0].attrs.unit_cost, dec!(7));
    assert_eq!(out[0].attrs.min_qty, 1);
    assert_eq!(out[0].attrs.stockout_risk, 0.1);
  }
}
