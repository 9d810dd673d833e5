//! Energy-gap reconciliation.
//!
//! Per-appliance predictions are made independently and almost never add up to
//! the consumption printed on the bill. [`GapReconciler`] closes that gap: it
//! reserves an "unaccounted load" share, grows or shrinks the appliance rows to
//! explain the rest, and returns a breakdown whose kWh sum to the reported total
//! and whose costs are apportioned from the bill total.
//!
//! The input slice is never modified.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::ApplianceEstimate,
    numeric::{largest_remainder_round, percentage_of, round_currency, share_of},
    EstimateError,
};

pub const OVERHEAD_ID: &str = "system_overhead";
pub const OVERHEAD_NAME: &str = "System & Unaccounted Load";

/// Maximum growth multiplier per appliance id.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthCaps {
    caps: HashMap<String, f64>,
    default_cap: f64,
}

impl GrowthCaps {
    pub fn new(default_cap: f64) -> Self {
        Self {
            caps: HashMap::new(),
            default_cap,
        }
    }

    pub fn with_cap(mut self, appliance_id: impl Into<String>, cap: f64) -> Self {
        self.caps.insert(appliance_id.into(), cap);
        self
    }

    pub fn cap_for(&self, appliance_id: &str) -> f64 {
        self.caps.get(appliance_id).copied().unwrap_or(self.default_cap)
    }

    pub fn default_cap(&self) -> f64 {
        self.default_cap
    }
}

impl Default for GrowthCaps {
    fn default() -> Self {
        Self::new(1.25)
            .with_cap("fridge", 1.35)
            .with_cap("ceiling_fan", 1.50)
            .with_cap("led_light", 1.40)
            .with_cap("ac", 1.20)
            .with_cap("iron", 1.15)
            .with_cap("mixer_grinder", 1.15)
    }
}

/// How per-row costs are rounded to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostRounding {
    /// Each row is rounded on its own; the sum may drift from the bill total by
    /// up to half a unit per row.
    #[default]
    Independent,
    /// Rounding remainders are handed out so the rows sum to the rounded total.
    LargestRemainder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Overhead never drops below this fraction of the reported total.
    pub min_overhead_fraction: f64,
    /// Fraction of a positive gap assigned to overhead.
    pub gap_overhead_fraction: f64,
    /// Uncertainty assumed for rows reporting none, and the unit the fill
    /// weights are expressed in.
    pub reference_uncertainty: f64,
    /// Unfilled kWh above which the weighted fill gives way to a uniform scale.
    pub residual_tolerance_kwh: f64,
    pub caps: GrowthCaps,
    pub cost_rounding: CostRounding,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_overhead_fraction: 0.05,
            gap_overhead_fraction: 0.35,
            reference_uncertainty: 10.0,
            residual_tolerance_kwh: 0.01,
            caps: GrowthCaps::default(),
            cost_rounding: CostRounding::default(),
        }
    }
}

/// Path taken to fit the appliance rows to their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Predictions fell short and the capped weighted fill closed the gap.
    WeightedFill,
    /// Predictions fell short by more than the caps allow; every row was scaled.
    ForceScaled,
    /// Predictions overshot and every row was scaled down.
    ScaledDown,
    /// Nothing to scale: the whole reported total is unaccounted load.
    AllOverhead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Rows sorted by descending kWh, overhead included.
    pub items: Vec<ApplianceEstimate>,
    pub strategy: Strategy,
}

impl Reconciliation {
    pub fn total_kwh(&self) -> f64 {
        self.items.iter().map(|i| i.kwh).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.items.iter().map(|i| i.cost).sum()
    }

    pub fn overhead(&self) -> Option<&ApplianceEstimate> {
        self.items.iter().find(|i| i.id == OVERHEAD_ID)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GapReconciler {
    config: ReconcileConfig,
}

impl GapReconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn reconcile(
        &self,
        breakdown: &[ApplianceEstimate],
        total_reported_kwh: f64,
        estimated_total_cost: f64,
    ) -> Result<Reconciliation, EstimateError> {
        check_totals(total_reported_kwh, estimated_total_cost)?;
        if let Some(bad) = breakdown.iter().find(|item| !item.is_valid()) {
            return Err(EstimateError::InvalidEstimate { id: bad.id.clone() });
        }

        let mut items = breakdown.to_vec();
        let current_total: f64 = items.iter().map(|i| i.kwh).sum();
        let gap = total_reported_kwh - current_total;

        let min_overhead = total_reported_kwh * self.config.min_overhead_fraction;
        let overhead_share = (gap * self.config.gap_overhead_fraction).max(min_overhead);
        let appliance_target = total_reported_kwh - overhead_share;
        let required_change = appliance_target - current_total;

        let strategy = if current_total <= 0.0 {
            Strategy::AllOverhead
        } else if required_change > 0.0 {
            self.grow(&mut items, required_change, appliance_target)
        } else {
            let scale = appliance_target / current_total;
            for item in items.iter_mut() {
                item.kwh *= scale;
                item.uncertainty *= scale;
            }
            Strategy::ScaledDown
        };

        // The overhead row takes whatever the appliances leave, so the rows
        // always sum to the reported total.
        let appliance_kwh: f64 = items.iter().map(|i| i.kwh).sum();
        items.push(ApplianceEstimate::new(
            OVERHEAD_ID,
            OVERHEAD_NAME,
            total_reported_kwh - appliance_kwh,
            0.0,
        ));

        apply_shares(
            &mut items,
            total_reported_kwh,
            estimated_total_cost,
            self.config.cost_rounding,
        )?;
        items.sort_by(|a, b| b.kwh.total_cmp(&a.kwh));

        Ok(Reconciliation { items, strategy })
    }

    fn grow(&self, items: &mut [ApplianceEstimate], required_change: f64, appliance_target: f64) -> Strategy {
        // (room, weighted room) per row. Less certain rows absorb more.
        let rooms: Vec<(f64, f64)> = items
            .iter()
            .map(|item| {
                let cap = self.config.caps.cap_for(&item.id);
                let room = (item.kwh * cap - item.kwh).max(0.0);
                let uncertainty = if item.uncertainty > 0.0 {
                    item.uncertainty
                } else {
                    self.config.reference_uncertainty
                };
                (room, room * uncertainty / self.config.reference_uncertainty)
            })
            .collect();
        let total_absorbable: f64 = rooms.iter().map(|(_, absorbable)| absorbable).sum();

        let mut remaining = required_change;
        if total_absorbable > 0.0 {
            for (item, (room, absorbable)) in items.iter_mut().zip(&rooms) {
                if *absorbable <= 0.0 || remaining <= 0.0 {
                    continue;
                }
                let share = absorbable / total_absorbable * required_change;
                let add = share.min(*room).min(remaining);
                item.kwh += add;
                item.uncertainty += add;
                remaining -= add;
            }
        }

        if remaining > self.config.residual_tolerance_kwh {
            let filled: f64 = items.iter().map(|i| i.kwh).sum();
            let scale = appliance_target / filled;
            for item in items.iter_mut() {
                item.kwh *= scale;
            }
            Strategy::ForceScaled
        } else {
            Strategy::WeightedFill
        }
    }
}

fn check_totals(total_reported_kwh: f64, estimated_total_cost: f64) -> Result<(), EstimateError> {
    if !total_reported_kwh.is_finite() || total_reported_kwh <= 0.0 {
        return Err(EstimateError::InvalidReportedTotal(total_reported_kwh));
    }
    if !estimated_total_cost.is_finite() || estimated_total_cost < 0.0 {
        return Err(EstimateError::InvalidCost(estimated_total_cost));
    }
    Ok(())
}

/// Recompute `cost` and `percentage` of every row from its `kwh`.
///
/// Rows are left untouched when the totals cannot be shared out.
pub fn apply_shares(
    items: &mut [ApplianceEstimate],
    total_reported_kwh: f64,
    estimated_total_cost: f64,
    rounding: CostRounding,
) -> Result<(), EstimateError> {
    check_totals(total_reported_kwh, estimated_total_cost)?;

    let raw: Vec<f64> = items
        .iter()
        .map(|i| share_of(i.kwh, total_reported_kwh, estimated_total_cost))
        .collect();

    let costs = match rounding {
        CostRounding::Independent => raw.iter().map(|c| round_currency(*c)).collect(),
        CostRounding::LargestRemainder => {
            largest_remainder_round(&raw, round_currency(estimated_total_cost))
        }
    };

    for (item, cost) in items.iter_mut().zip(costs) {
        item.cost = cost;
        item.percentage = percentage_of(item.kwh, total_reported_kwh);
    }
    Ok(())
}

/// Reconcile with the default configuration and return just the rows.
pub fn distribute_energy_gap(
    breakdown: &[ApplianceEstimate],
    total_reported_kwh: f64,
    estimated_total_cost: f64,
) -> Result<Vec<ApplianceEstimate>, EstimateError> {
    GapReconciler::default()
        .reconcile(breakdown, total_reported_kwh, estimated_total_cost)
        .map(|r| r.items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::approx_eq;

    fn est(id: &str, kwh: f64, uncertainty: f64) -> ApplianceEstimate {
        ApplianceEstimate::new(id, id, kwh, uncertainty)
    }

    fn find<'a>(items: &'a [ApplianceEstimate], id: &str) -> &'a ApplianceEstimate {
        items.iter().find(|i| i.id == id).expect("row present")
    }

    #[test]
    fn overshoot_scales_down_uniformly() {
        let breakdown = vec![est("a", 100.0, 10.0), est("b", 50.0, 5.0)];
        let result = GapReconciler::default().reconcile(&breakdown, 120.0, 1000.0).unwrap();

        assert_eq!(result.strategy, Strategy::ScaledDown);
        let a = find(&result.items, "a");
        let b = find(&result.items, "b");
        assert!(approx_eq(a.kwh, 76.0, 1e-9));
        assert!(approx_eq(b.kwh, 38.0, 1e-9));
        assert!(approx_eq(a.uncertainty, 7.6, 1e-9));
        assert!(approx_eq(b.uncertainty, 3.8, 1e-9));

        let overhead = result.overhead().unwrap();
        assert!(approx_eq(overhead.kwh, 6.0, 1e-9));
        assert_eq!(overhead.uncertainty, 0.0);
        assert_eq!(overhead.name, OVERHEAD_NAME);
        assert!(approx_eq(result.total_kwh(), 120.0, 1e-9));

        assert_eq!(a.cost, 633.0);
        assert_eq!(b.cost, 317.0);
        assert_eq!(overhead.cost, 50.0);
        assert!(approx_eq(overhead.percentage, 5.0, 1e-9));
    }

    #[test]
    fn input_is_left_untouched() {
        let breakdown = vec![est("a", 100.0, 10.0), est("b", 50.0, 5.0)];
        let before = breakdown.clone();
        let _ = distribute_energy_gap(&breakdown, 120.0, 1000.0).unwrap();
        assert_eq!(breakdown, before);
    }

    #[test]
    fn weighted_fill_respects_uncertainty_weights() {
        let breakdown = vec![est("fridge", 40.0, 10.0), est("television", 40.0, 10.0)];
        let result = GapReconciler::default().reconcile(&breakdown, 100.0, 500.0).unwrap();

        // gap 20 -> overhead max(7, 5) = 7, appliances must explain 93.
        assert_eq!(result.strategy, Strategy::WeightedFill);
        let fridge = find(&result.items, "fridge");
        let tv = find(&result.items, "television");
        // Rooms 14 (cap 1.35) and 10 (default 1.25) split the 13 kWh shortfall.
        assert!(approx_eq(fridge.kwh, 40.0 + 13.0 * 14.0 / 24.0, 1e-9));
        assert!(approx_eq(tv.kwh, 40.0 + 13.0 * 10.0 / 24.0, 1e-9));
        assert!(approx_eq(fridge.uncertainty, 10.0 + 13.0 * 14.0 / 24.0, 1e-9));
        assert!(approx_eq(result.overhead().unwrap().kwh, 7.0, 1e-9));
        assert!(approx_eq(result.total_kwh(), 100.0, 1e-9));
    }

    #[test]
    fn saturated_caps_fall_back_to_force_scale() {
        let breakdown = vec![est("fridge", 10.0, 1.0), est("ac", 10.0, 1.0)];
        let result = GapReconciler::default().reconcile(&breakdown, 100.0, 800.0).unwrap();

        assert_eq!(result.strategy, Strategy::ForceScaled);
        let overhead = result.overhead().unwrap();
        assert!(approx_eq(overhead.kwh, 28.0, 1e-9));
        assert!(approx_eq(result.total_kwh(), 100.0, 1e-6));

        // Caps filled first (13.5 and 12.0), then scaled to 72 together.
        let fridge = find(&result.items, "fridge");
        let ac = find(&result.items, "ac");
        assert!(approx_eq(fridge.kwh, 13.5 * 72.0 / 25.5, 1e-9));
        assert!(approx_eq(ac.kwh, 12.0 * 72.0 / 25.5, 1e-9));
        assert!(fridge.kwh > 10.0 * 1.35);
        // The force-scale leaves the widened uncertainty as it was.
        assert!(approx_eq(fridge.uncertainty, 4.5, 1e-9));
        assert!(approx_eq(ac.uncertainty, 3.0, 1e-9));
    }

    #[test]
    fn missing_uncertainty_uses_reference_weight() {
        let breakdown = vec![est("x", 40.0, 0.0), est("y", 40.0, 20.0)];
        let result = GapReconciler::default().reconcile(&breakdown, 100.0, 500.0).unwrap();

        // Equal rooms (10 each); weights 1 and 2 split the 13 kWh 1:2.
        let x = find(&result.items, "x");
        let y = find(&result.items, "y");
        assert!(approx_eq(x.kwh, 40.0 + 13.0 / 3.0, 1e-9));
        assert!(approx_eq(y.kwh, 40.0 + 26.0 / 3.0, 1e-9));
    }

    #[test]
    fn empty_breakdown_is_all_overhead() {
        let result = GapReconciler::default().reconcile(&[], 200.0, 900.0).unwrap();
        assert_eq!(result.strategy, Strategy::AllOverhead);
        assert_eq!(result.items.len(), 1);
        let overhead = &result.items[0];
        assert_eq!(overhead.id, OVERHEAD_ID);
        assert_eq!(overhead.kwh, 200.0);
        assert_eq!(overhead.cost, 900.0);
        assert_eq!(overhead.percentage, 100.0);
    }

    #[test]
    fn zero_estimates_stay_zero() {
        let breakdown = vec![est("a", 0.0, 0.0), est("b", 0.0, 3.0)];
        let result = GapReconciler::default().reconcile(&breakdown, 50.0, 200.0).unwrap();
        assert_eq!(result.strategy, Strategy::AllOverhead);
        assert_eq!(result.items[0].id, OVERHEAD_ID);
        assert_eq!(result.items[0].kwh, 50.0);
        assert!(result.items[1..].iter().all(|i| i.kwh == 0.0 && i.cost == 0.0));
    }

    #[test]
    fn rejects_degenerate_totals_and_bad_rows() {
        let reconciler = GapReconciler::default();
        let rows = vec![est("a", 10.0, 1.0)];

        assert_eq!(
            reconciler.reconcile(&rows, 0.0, 100.0),
            Err(EstimateError::InvalidReportedTotal(0.0))
        );
        assert!(reconciler.reconcile(&rows, f64::NAN, 100.0).is_err());
        assert!(matches!(
            reconciler.reconcile(&rows, 100.0, f64::INFINITY),
            Err(EstimateError::InvalidCost(_))
        ));
        assert_eq!(
            reconciler.reconcile(&[est("bad", -1.0, 0.0)], 100.0, 100.0),
            Err(EstimateError::InvalidEstimate { id: "bad".to_string() })
        );
    }

    #[test]
    fn rows_are_sorted_by_descending_kwh() {
        let breakdown = vec![est("small", 5.0, 1.0), est("big", 60.0, 6.0), est("mid", 20.0, 2.0)];
        let items = distribute_energy_gap(&breakdown, 90.0, 400.0).unwrap();
        assert!(items.windows(2).all(|w| w[0].kwh >= w[1].kwh));
        assert_eq!(items[0].id, "big");
    }

    #[test]
    fn share_pass_is_idempotent() {
        let breakdown = vec![est("a", 33.0, 3.0), est("b", 47.0, 4.0), est("c", 11.0, 1.0)];
        let mut items = distribute_energy_gap(&breakdown, 97.0, 613.0).unwrap();
        let once = items.clone();
        apply_shares(&mut items, 97.0, 613.0, CostRounding::Independent).unwrap();
        assert_eq!(items, once);
    }

    #[test]
    fn share_pass_rejects_zero_total() {
        let mut items = vec![est("a", 5.0, 1.0)];
        let before = items.clone();
        assert_eq!(
            apply_shares(&mut items, 0.0, 100.0, CostRounding::Independent),
            Err(EstimateError::InvalidReportedTotal(0.0))
        );
        assert!(matches!(
            apply_shares(&mut items, 10.0, f64::NAN, CostRounding::LargestRemainder),
            Err(EstimateError::InvalidCost(_))
        ));
        assert_eq!(items, before);
    }

    #[test]
    fn largest_remainder_costs_sum_to_bill() {
        let config = ReconcileConfig {
            cost_rounding: CostRounding::LargestRemainder,
            ..Default::default()
        };
        let breakdown = vec![est("a", 10.0, 1.0), est("b", 10.0, 1.0), est("c", 10.0, 1.0)];
        let result = GapReconciler::new(config).reconcile(&breakdown, 31.0, 100.0).unwrap();
        assert_eq!(result.total_cost(), 100.0);
    }

    #[test]
    fn caps_are_keyed_by_id() {
        let caps = GrowthCaps::default();
        assert_eq!(caps.cap_for("fridge"), 1.35);
        assert_eq!(caps.cap_for("mixer_grinder"), 1.15);
        // No substring matching: an unrelated id containing "ac" gets the default.
        assert_eq!(caps.cap_for("vacuum"), 1.25);
        assert_eq!(caps.cap_for("Fridge"), 1.25);
    }
}
