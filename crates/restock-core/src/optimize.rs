//! Budget-constrained allocation of reorder quantities.
//!
//! Both objectives are documented heuristics, not exact solvers. Bounded
//! knapsack with lot-size floors is NP-hard; the rules below are chosen to be
//! cheap, deterministic and auditable.
//!
//! # Candidates
//!
//! Rows are grouped by SKU. A SKU is a candidate when at least one of its rows
//! is flagged [`Trigger::Reorder`]; its demand is the sum of `yhat` over those
//! rows (clamped at zero). Every candidate orders either nothing or at least
//! one lot (`min_qty`, with `0` meaning a lot of one unit), and wants at least
//! `max(ceil(demand), lot)` units.
//!
//! # MaximizeDemand
//!
//! Candidates are ranked by `priority = demand × (1 + stockout_risk) /
//! unit_cost`, descending; ties go to the cheaper unit, then to the lexically
//! smaller SKU. Walking that ranking, each candidate that can still afford one
//! lot receives `min(need, floor(remaining / unit_cost))` units.
//!
//! # FairAllocation
//!
//! Candidates are ranked by the cost of one lot, ascending, then by SKU. If the
//! budget cannot fund every candidate's first lot, lots are handed out in that
//! order while they fit. Otherwise every candidate gets its first lot and the
//! remainder is spread one lot at a time in round-robin passes, smallest
//! current quantity first, until the budget or every candidate's need runs
//! out.
//!
//! In both cases `sum(spend) <= budget` holds exactly: money is
//! [`Decimal`].

use std::{cmp::Ordering, collections::BTreeMap, str::FromStr};

use rust_decimal::{Decimal, prelude::ToPrimitive as _};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
  Error, Result,
  record::{PlanningRow, SkuAttributes},
};

// ─── Public types ────────────────────────────────────────────────────────────

/// What the allocation should favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Objective {
  MaximizeDemand,
  FairAllocation,
}

impl FromStr for Objective {
  type Err = Error;

  /// Accepts `maximize_demand` / `fair_allocation` in any case, with spaces
  /// or hyphens in place of underscores (`"Maximize demand"`).
  fn from_str(s: &str) -> Result<Self> {
    let normalized: String = s
      .trim()
      .chars()
      .map(|c| match c {
        ' ' | '-' => '_',
        c => c.to_ascii_lowercase(),
      })
      .collect();
    match normalized.as_str() {
      "maximize_demand" => Ok(Self::MaximizeDemand),
      "fair_allocation" => Ok(Self::FairAllocation),
      _ => Err(Error::InvalidObjective(s.to_owned())),
    }
  }
}

/// Why a SKU received the quantity it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  /// At least one lot was bought.
  Funded,
  /// A candidate the budget could not cover.
  Unfunded,
  /// No row for the SKU was flagged for reorder.
  NotTriggered,
}

/// The quantity to buy for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderDecision {
  pub sku:       String,
  /// Either `0` or at least the SKU's `min_qty`.
  pub quantity:  u64,
  /// `quantity × unit_cost`.
  pub spend:     Decimal,
  pub unit_cost: Decimal,
  /// The MaximizeDemand ranking score; reported for every objective.
  pub priority:  f64,
  pub outcome:   Outcome,
}

/// A complete reorder plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
  pub objective:        Objective,
  pub budget:           Decimal,
  pub total_spend:      Decimal,
  pub remaining_budget: Decimal,
  /// Candidates in ranking order, then untriggered SKUs by name.
  pub decisions:        Vec<ReorderDecision>,
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Decide a quantity for every SKU in `rows` without exceeding `budget`.
///
/// Fails before any allocation on a negative budget, a non-positive unit
/// cost, or a SKU whose rows disagree on their attributes.
pub fn optimize(
  rows: &[PlanningRow],
  budget: Decimal,
  objective: Objective,
) -> Result<Vec<ReorderDecision>> {
  if budget < Decimal::ZERO {
    return Err(Error::InvalidBudget(budget));
  }
  if let Some(row) = rows.iter().find(|r| r.attrs.unit_cost <= Decimal::ZERO) {
    return Err(Error::InvalidUnitCost { sku: row.sku().to_owned() });
  }

  let (candidates, untriggered) = collect_candidates(rows)?;

  let mut decisions = match objective {
    Objective::MaximizeDemand => maximize_demand(candidates, budget),
    Objective::FairAllocation => fair_allocation(candidates, budget),
  };

  decisions.extend(untriggered.into_iter().map(|(sku, attrs)| {
    ReorderDecision {
      sku,
      quantity: 0,
      spend: Decimal::ZERO,
      unit_cost: attrs.unit_cost,
      priority: 0.0,
      outcome: Outcome::NotTriggered,
    }
  }));

  Ok(decisions)
}

/// [`optimize`], summarised.
pub fn plan(
  rows: &[PlanningRow],
  budget: Decimal,
  objective: Objective,
) -> Result<Plan> {
  let decisions = optimize(rows, budget, objective)?;
  let total_spend: Decimal = decisions.iter().map(|d| d.spend).sum();
  Ok(Plan {
    objective,
    budget,
    total_spend,
    remaining_budget: budget - total_spend,
    decisions,
  })
}

// ─── Candidates ──────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Candidate {
  sku:      String,
  attrs:    SkuAttributes,
  demand:   f64,
  priority: f64,
}

impl Candidate {
  fn new(sku: String, attrs: SkuAttributes, demand: f64) -> Self {
    let demand = demand.max(0.0);
    let unit_cost = attrs.unit_cost.to_f64().unwrap_or(f64::INFINITY);
    let priority = demand * (1.0 + attrs.stockout_risk) / unit_cost;
    Self { sku, attrs, demand, priority }
  }

  fn lot(&self) -> u64 { u64::from(self.attrs.min_qty.max(1)) }

  fn need(&self) -> u64 { (self.demand.ceil() as u64).max(self.lot()) }

  fn cost(&self, quantity: u64) -> Option<Decimal> {
    Decimal::from(quantity).checked_mul(self.attrs.unit_cost)
  }

  /// Largest quantity up to `cap` whose cost fits in `remaining`.
  fn affordable(&self, remaining: Decimal, cap: u64) -> (u64, Decimal) {
    let whole_units = (remaining / self.attrs.unit_cost)
      .floor()
      .to_u64()
      .unwrap_or(u64::MAX);
    let mut quantity = whole_units.min(cap);
    loop {
      match self.cost(quantity) {
        Some(spend) if spend <= remaining => return (quantity, spend),
        _ if quantity == 0 => return (0, Decimal::ZERO),
        _ => quantity -= 1,
      }
    }
  }

  fn decision(&self, quantity: u64, spend: Decimal) -> ReorderDecision {
    ReorderDecision {
      sku: self.sku.clone(),
      quantity,
      spend,
      unit_cost: self.attrs.unit_cost,
      priority: self.priority,
      outcome: if quantity > 0 { Outcome::Funded } else { Outcome::Unfunded },
    }
  }
}

type Untriggered = Vec<(String, SkuAttributes)>;

/// Group rows by SKU into candidates and SKUs with no reorder row.
fn collect_candidates(
  rows: &[PlanningRow],
) -> Result<(Vec<Candidate>, Untriggered)> {
  // sku -> (attributes, summed reorder demand, any row triggered)
  let mut by_sku: BTreeMap<&str, (&SkuAttributes, f64, bool)> = BTreeMap::new();

  for row in rows {
    let triggered = row.row.reorder_trigger.is_reorder();
    let demand = if triggered { row.row.forecast.yhat } else { 0.0 };
    match by_sku.get_mut(row.sku()) {
      Some((attrs, total, any)) => {
        if **attrs != row.attrs {
          return Err(Error::InvalidForecastInput(format!(
            "rows for {:?} disagree on unit_cost, min_qty or stockout_risk",
            row.sku()
          )));
        }
        *total += demand;
        *any |= triggered;
      }
      None => {
        by_sku.insert(row.sku(), (&row.attrs, demand, triggered));
      }
    }
  }

  let mut candidates = Vec::new();
  let mut untriggered = Vec::new();
  for (sku, (attrs, demand, triggered)) in by_sku {
    if triggered {
      candidates.push(Candidate::new(sku.to_owned(), attrs.clone(), demand));
    } else {
      untriggered.push((sku.to_owned(), attrs.clone()));
    }
  }
  Ok((candidates, untriggered))
}

// ─── MaximizeDemand ──────────────────────────────────────────────────────────

fn maximize_demand(
  mut candidates: Vec<Candidate>,
  budget: Decimal,
) -> Vec<ReorderDecision> {
  candidates.sort_by(|a, b| {
    b.priority
      .total_cmp(&a.priority)
      .then_with(|| a.attrs.unit_cost.cmp(&b.attrs.unit_cost))
      .then_with(|| a.sku.cmp(&b.sku))
  });

  let mut remaining = budget;
  candidates
    .iter()
    .map(|c| {
      let lot = c.lot();
      let fits_a_lot = c.cost(lot).is_some_and(|cost| cost <= remaining);
      if !fits_a_lot {
        return c.decision(0, Decimal::ZERO);
      }
      match c.affordable(remaining, c.need()) {
        (quantity, spend) if quantity >= lot => {
          remaining -= spend;
          c.decision(quantity, spend)
        }
        _ => c.decision(0, Decimal::ZERO),
      }
    })
    .collect()
}

// ─── FairAllocation ──────────────────────────────────────────────────────────

fn fair_allocation(
  mut candidates: Vec<Candidate>,
  budget: Decimal,
) -> Vec<ReorderDecision> {
  // `None` means the lot cost overflows; such a lot never fits.
  let lot_cost = |c: &Candidate| c.cost(c.lot());
  candidates.sort_by(|a, b| {
    let by_cost = match (lot_cost(a), lot_cost(b)) {
      (Some(x), Some(y)) => x.cmp(&y),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    };
    by_cost.then_with(|| a.sku.cmp(&b.sku))
  });

  let minimum_total = candidates
    .iter()
    .try_fold(Decimal::ZERO, |acc, c| acc.checked_add(lot_cost(c)?));

  match minimum_total {
    Some(total) if total <= budget => water_fill(&candidates, budget - total),
    _ => {
      let mut remaining = budget;
      candidates
        .iter()
        .map(|c| match lot_cost(c) {
          Some(cost) if cost <= remaining => {
            remaining -= cost;
            c.decision(c.lot(), cost)
          }
          _ => c.decision(0, Decimal::ZERO),
        })
        .collect()
    }
  }
}

/// Every candidate already holds one lot; spread `remaining` one lot at a
/// time over the least-served candidates until nothing more fits or every
/// need is met.
///
/// Passes that would repeat unchanged are applied in bulk, so the work is
/// bounded by the number of candidates rather than by the number of lots.
fn water_fill(
  candidates: &[Candidate],
  mut remaining: Decimal,
) -> Vec<ReorderDecision> {
  // Lot costs are known to be finite here: their sum fit in the budget.
  let lot_costs: Vec<Decimal> = candidates
    .iter()
    .map(|c| c.cost(c.lot()).unwrap_or(Decimal::MAX))
    .collect();
  let mut quantities: Vec<u64> = candidates.iter().map(Candidate::lot).collect();
  let mut spends = lot_costs.clone();

  let mut order: Vec<usize> = (0..candidates.len()).collect();
  loop {
    order.sort_by(|&i, &j| {
      quantities[i]
        .cmp(&quantities[j])
        .then_with(|| candidates[i].sku.cmp(&candidates[j].sku))
    });

    let mut funded = Vec::new();
    let mut pass_cost = Decimal::ZERO;
    for &i in &order {
      let c = &candidates[i];
      if quantities[i] < c.need() && lot_costs[i] <= remaining {
        quantities[i] = quantities[i].saturating_add(c.lot());
        spends[i] += lot_costs[i];
        remaining -= lot_costs[i];
        pass_cost += lot_costs[i];
        funded.push(i);
      }
    }
    if funded.is_empty() {
      break;
    }

    // A candidate skipped in this pass stays unaffordable: `remaining` only
    // shrinks. So while the budget covers the whole pass again and nobody in
    // it is satisfied, the next pass funds exactly the same candidates.
    let affordable = (remaining / pass_cost)
      .floor()
      .to_u64()
      .unwrap_or(u64::MAX);
    let repeats = funded
      .iter()
      .map(|&i| {
        let c = &candidates[i];
        c.need().saturating_sub(quantities[i]).div_ceil(c.lot())
      })
      .min()
      .unwrap_or(0)
      .min(affordable);
    if repeats > 0 {
      for &i in &funded {
        let lots = repeats.saturating_mul(candidates[i].lot());
        quantities[i] = quantities[i].saturating_add(lots);
        spends[i] += Decimal::from(repeats) * lot_costs[i];
      }
      remaining -= Decimal::from(repeats) * pass_cost;
    }
  }

  candidates
    .iter()
    .enumerate()
    .map(|(i, c)| c.decision(quantities[i], spends[i]))
    .collect()
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;
  use rust_decimal_macros::dec;

  use super::*;
  use crate::record::{Trigger, TriggeredRow, test_helpers::forecast};

  fn row(
    sku: &str,
    yhat: f64,
    unit_cost: Decimal,
    min_qty: u32,
    stockout_risk: f64,
  ) -> PlanningRow {
    PlanningRow {
      row:   TriggeredRow {
        forecast:        forecast(1, sku, yhat),
        reorder_trigger: Trigger::Reorder,
      },
      attrs: SkuAttributes { unit_cost, min_qty, stockout_risk },
    }
  }

  fn held(mut r: PlanningRow) -> PlanningRow {
    r.row.reorder_trigger = Trigger::Hold;
    r
  }

  fn quantities(decisions: &[ReorderDecision]) -> Vec<(&str, u64)> {
    decisions.iter().map(|d| (d.sku.as_str(), d.quantity)).collect()
  }

  fn two_skus() -> Vec<PlanningRow> {
    vec![
      row("A", 100.0, dec!(10), 5, 0.8),
      row("B", 50.0, dec!(20), 2, 0.1),
    ]
  }

  // ── Objective parsing ───────────────────────────────────────────────────

  #[test]
  fn objective_accepts_display_labels() {
    assert_eq!(
      "Maximize demand".parse::<Objective>().unwrap(),
      Objective::MaximizeDemand
    );
    assert_eq!(
      "fair-allocation".parse::<Objective>().unwrap(),
      Objective::FairAllocation
    );
    assert!(matches!(
      "cheapest".parse::<Objective>(),
      Err(Error::InvalidObjective(_))
    ));
  }

  // ── Validation ──────────────────────────────────────────────────────────

  #[test]
  fn negative_budget_is_rejected() {
    let err =
      optimize(&two_skus(), dec!(-1), Objective::MaximizeDemand).unwrap_err();
    assert!(matches!(err, Error::InvalidBudget(_)));
  }

  #[test]
  fn non_positive_unit_cost_is_rejected() {
    let rows = vec![row("A", 10.0, dec!(0), 1, 0.5)];
    let err = optimize(&rows, dec!(100), Objective::FairAllocation).unwrap_err();
    assert!(matches!(err, Error::InvalidUnitCost { sku } if sku == "A"));
  }

  #[test]
  fn conflicting_attributes_are_rejected() {
    let mut rows = two_skus();
    let mut second = row("A", 30.0, dec!(11), 5, 0.8);
    second.row.forecast.date = crate::record::test_helpers::day(2);
    rows.push(second);
    let err = optimize(&rows, dec!(100), Objective::MaximizeDemand).unwrap_err();
    assert!(matches!(err, Error::InvalidForecastInput(_)));
  }

  // ── MaximizeDemand ──────────────────────────────────────────────────────

  #[test]
  fn maximize_demand_ranks_by_risk_weighted_demand_per_cost() {
    let summary = plan(&two_skus(), dec!(300), Objective::MaximizeDemand).unwrap();

    assert_eq!(quantities(&summary.decisions), [("A", 30), ("B", 0)]);
    assert_eq!(summary.decisions[0].priority, 18.0);
    assert!((summary.decisions[1].priority - 2.75).abs() < 1e-12);
    assert_eq!(summary.decisions[0].spend, dec!(300));
    assert_eq!(summary.decisions[1].outcome, Outcome::Unfunded);
    assert_eq!(summary.remaining_budget, dec!(0));
  }

  #[test]
  fn maximize_demand_caps_at_need_and_moves_on() {
    let summary = plan(&two_skus(), dec!(2000), Objective::MaximizeDemand).unwrap();
    // A needs 100 units (1000); B gets its 50 units (1000) from the rest.
    assert_eq!(quantities(&summary.decisions), [("A", 100), ("B", 50)]);
    assert_eq!(summary.total_spend, dec!(2000));
  }

  #[test]
  fn demand_below_lot_orders_one_lot() {
    let rows = vec![row("A", 2.2, dec!(1), 10, 0.0)];
    let out = optimize(&rows, dec!(50), Objective::MaximizeDemand).unwrap();
    assert_eq!(quantities(&out), [("A", 10)]);
  }

  #[test]
  fn skipped_candidate_does_not_block_cheaper_ones() {
    let rows = vec![
      row("BIG", 100.0, dec!(10), 50, 1.0),
      row("SMALL", 1.0, dec!(1), 1, 0.0),
    ];
    let out = optimize(&rows, dec!(40), Objective::MaximizeDemand).unwrap();
    assert_eq!(quantities(&out), [("BIG", 0), ("SMALL", 1)]);
  }

  #[test]
  fn priority_ties_prefer_cheaper_then_lexical_sku() {
    let rows = vec![
      row("C", 20.0, dec!(2), 1, 0.0),
      row("B", 10.0, dec!(1), 1, 0.0),
      row("A", 10.0, dec!(1), 1, 0.0),
    ];
    let out = optimize(&rows, dec!(1000), Objective::MaximizeDemand).unwrap();
    let order: Vec<_> = out.iter().map(|d| d.sku.as_str()).collect();
    assert_eq!(order, ["A", "B", "C"]);
  }

  #[test]
  fn demand_sums_over_reorder_rows_only() {
    let mut later = row("A", 40.0, dec!(1), 1, 0.0);
    later.row.forecast.date = crate::record::test_helpers::day(2);
    let mut held_row = held(row("A", 500.0, dec!(1), 1, 0.0));
    held_row.row.forecast.date = crate::record::test_helpers::day(3);
    let rows = vec![row("A", 10.0, dec!(1), 1, 0.0), later, held_row];

    let out = optimize(&rows, dec!(1000), Objective::MaximizeDemand).unwrap();
    assert_eq!(quantities(&out), [("A", 50)]);
  }

  #[test]
  fn untriggered_skus_are_reported_last() {
    let rows = vec![
      held(row("Z", 10.0, dec!(1), 1, 0.0)),
      row("M", 10.0, dec!(1), 1, 0.0),
      held(row("A", 10.0, dec!(1), 1, 0.0)),
    ];
    let out = optimize(&rows, dec!(100), Objective::MaximizeDemand).unwrap();
    assert_eq!(quantities(&out), [("M", 10), ("A", 0), ("Z", 0)]);
    assert_eq!(out[1].outcome, Outcome::NotTriggered);
  }

  #[test]
  fn zero_budget_funds_nothing() {
    let out = optimize(&two_skus(), dec!(0), Objective::FairAllocation).unwrap();
    assert!(out.iter().all(|d| d.quantity == 0));
  }

  // ── FairAllocation ──────────────────────────────────────────────────────

  #[test]
  fn fair_allocation_funds_cheapest_lots_when_short() {
    // Lot costs: A 50, B 40, C 30; budget covers C and B only.
    let rows = vec![
      row("A", 100.0, dec!(10), 5, 0.0),
      row("B", 100.0, dec!(20), 2, 0.0),
      row("C", 100.0, dec!(30), 1, 0.0),
    ];
    let out = optimize(&rows, dec!(75), Objective::FairAllocation).unwrap();
    assert_eq!(quantities(&out), [("C", 1), ("B", 2), ("A", 0)]);
  }

  #[test]
  fn fair_allocation_spreads_surplus_in_lots() {
    let rows = vec![
      row("A", 10.0, dec!(1), 2, 0.0),
      row("B", 100.0, dec!(1), 2, 0.0),
    ];
    // After the first lots (4), 16 remains: A tops out at 10, B gets the rest.
    let summary = plan(&rows, dec!(20), Objective::FairAllocation).unwrap();
    assert_eq!(quantities(&summary.decisions), [("A", 10), ("B", 10)]);
    assert_eq!(summary.total_spend, dec!(20));

    let summary = plan(&rows, dec!(30), Objective::FairAllocation).unwrap();
    assert_eq!(quantities(&summary.decisions), [("A", 10), ("B", 20)]);
  }

  #[test]
  fn fair_allocation_stops_when_needs_are_met() {
    let rows = vec![row("A", 3.0, dec!(1), 1, 0.0)];
    let summary = plan(&rows, dec!(100), Objective::FairAllocation).unwrap();
    assert_eq!(quantities(&summary.decisions), [("A", 3)]);
    assert_eq!(summary.remaining_budget, dec!(97));
  }

  #[test]
  fn fair_allocation_handles_large_budgets_quickly() {
    let n = 10_000_000.0;
    let rows = vec![row("A", n, dec!(1), 1, 0.0), row("B", n, dec!(1), 1, 0.0)];

    let started = std::time::Instant::now();
    let summary =
      plan(&rows, dec!(20_000_000), Objective::FairAllocation).unwrap();
    assert!(started.elapsed() < std::time::Duration::from_millis(200));

    assert_eq!(
      quantities(&summary.decisions),
      [("A", 10_000_000), ("B", 10_000_000)]
    );
    assert_eq!(summary.remaining_budget, dec!(0));
  }

  #[test]
  fn bulk_passes_keep_the_cheap_candidate_going() {
    // C's lot (60) never fits after the first lots; A keeps drawing alone.
    let rows = vec![
      row("A", 1_000.0, dec!(1), 1, 0.0),
      row("C", 1_000.0, dec!(60), 1, 0.0),
    ];
    let out = optimize(&rows, dec!(110), Objective::FairAllocation).unwrap();
    assert_eq!(quantities(&out), [("A", 50), ("C", 1)]);
  }

  /// One lot per pass, no shortcuts.
  fn lot_by_lot(
    candidates: &[Candidate],
    mut remaining: Decimal,
  ) -> Vec<ReorderDecision> {
    let mut quantities: Vec<u64> =
      candidates.iter().map(Candidate::lot).collect();
    loop {
      let mut order: Vec<usize> = (0..candidates.len()).collect();
      order.sort_by(|&i, &j| {
        quantities[i]
          .cmp(&quantities[j])
          .then_with(|| candidates[i].sku.cmp(&candidates[j].sku))
      });
      let mut progressed = false;
      for i in order {
        let c = &candidates[i];
        let cost = c.cost(c.lot()).unwrap();
        if quantities[i] < c.need() && cost <= remaining {
          quantities[i] += c.lot();
          remaining -= cost;
          progressed = true;
        }
      }
      if !progressed {
        break;
      }
    }
    candidates
      .iter()
      .enumerate()
      .map(|(i, c)| c.decision(quantities[i], c.cost(quantities[i]).unwrap()))
      .collect()
  }

  // ── Properties ──────────────────────────────────────────────────────────

  fn rows_strategy() -> impl Strategy<Value = Vec<PlanningRow>> {
    prop::collection::vec(
      (0u32..400, 1u32..60, 0u32..15, 0u32..=10, any::<bool>()),
      1..8,
    )
    .prop_map(|specs| {
      specs
        .into_iter()
        .enumerate()
        .map(|(i, (yhat, cost, min_qty, risk, reorder))| {
          let r = row(
            &format!("SKU-{i}"),
            f64::from(yhat),
            Decimal::from(cost) / dec!(4),
            min_qty,
            f64::from(risk) / 10.0,
          );
          if reorder { r } else { held(r) }
        })
        .collect()
    })
  }

  fn objective_strategy() -> impl Strategy<Value = Objective> {
    prop_oneof![
      Just(Objective::MaximizeDemand),
      Just(Objective::FairAllocation)
    ]
  }

  proptest! {
    #[test]
    fn spend_never_exceeds_budget_and_lots_are_whole(
      rows in rows_strategy(),
      cents in 0u32..500_000,
      objective in objective_strategy(),
    ) {
      let budget = Decimal::from(cents) / dec!(100);
      let out = optimize(&rows, budget, objective).unwrap();

      let total: Decimal = out.iter().map(|d| d.spend).sum();
      prop_assert!(total <= budget, "spent {} of {}", total, budget);
      prop_assert_eq!(out.len(), rows.len());

      for d in &out {
        let r = rows.iter().find(|r| r.sku() == d.sku).unwrap();
        prop_assert!(d.quantity == 0 || d.quantity >= u64::from(r.attrs.min_qty));
        prop_assert_eq!(d.spend, Decimal::from(d.quantity) * r.attrs.unit_cost);
        if !r.row.reorder_trigger.is_reorder() {
          prop_assert_eq!(d.quantity, 0);
        }
      }
    }

    #[test]
    fn optimize_is_deterministic(
      rows in rows_strategy(),
      budget in 0u32..5_000,
      objective in objective_strategy(),
    ) {
      let budget = Decimal::from(budget);
      let first = optimize(&rows, budget, objective).unwrap();
      let second = optimize(&rows, budget, objective).unwrap();
      prop_assert_eq!(first, second);
    }

    #[test]
    fn water_fill_matches_lot_by_lot(
      rows in rows_strategy(),
      slack in 0u32..2_000,
    ) {
      let (candidates, _) = collect_candidates(&rows).unwrap();
      let remaining = Decimal::from(slack) / dec!(4);
      prop_assert_eq!(
        water_fill(&candidates, remaining),
        lot_by_lot(&candidates, remaining)
      );
    }

    #[test]
    fn fair_allocation_starves_nobody_when_lots_fit(
      rows in rows_strategy(),
      slack in 0u32..1_000,
    ) {
      let minimum: Decimal = rows
        .iter()
        .filter(|r| r.row.reorder_trigger.is_reorder())
        .map(|r| Decimal::from(r.attrs.min_qty.max(1)) * r.attrs.unit_cost)
        .sum();
      let budget = minimum + Decimal::from(slack);
      let out = optimize(&rows, budget, Objective::FairAllocation).unwrap();

      for d in &out {
        let r = rows.iter().find(|r| r.sku() == d.sku).unwrap();
        if r.row.reorder_trigger.is_reorder() {
          prop_assert!(d.quantity >= u64::from(r.attrs.min_qty.max(1)));
        }
      }
    }
  }
}
