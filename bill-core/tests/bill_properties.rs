//! Property tests for the tariff and the gap reconciler.
//!
//! 1. Bills never decrease as consumption grows
//! 2. Reconciled rows sum to the reported total
//! 3. The overhead row is present once and never below 5% of the total
//! 4. Independently rounded costs drift by at most half a unit per row
//! 5. Largest-remainder costs sum exactly to the rounded bill
//! 6. Recomputing shares on reconciled rows changes nothing

use bill_core::{
    calculate_bill,
    domain::{ApplianceEstimate, Regime},
    reconcile::{apply_shares, CostRounding, ReconcileConfig, OVERHEAD_ID},
    tariff::bill_details,
    GapReconciler,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

const IDS: [&str; 8] = [
    "fridge",
    "ac",
    "ceiling_fan",
    "led_light",
    "television",
    "iron",
    "mixer_grinder",
    "water_pump",
];

/// One row per id; kWh may be zero and roughly one row in five has no
/// stated uncertainty.
fn breakdown_strategy() -> impl Strategy<Value = Vec<ApplianceEstimate>> {
    prop::collection::vec((0.0f64..250.0, 0u8..5), 1..=IDS.len()).prop_map(|rows| {
        rows.into_iter()
            .zip(IDS)
            .map(|((kwh, band), id)| {
                let uncertainty = if band == 0 { 0.0 } else { kwh * 0.1 };
                ApplianceEstimate::new(id, id, kwh, uncertainty)
            })
            .collect()
    })
}

fn reported_total_strategy() -> impl Strategy<Value = f64> {
    1.0f64..2000.0
}

fn rounding_strategy() -> impl Strategy<Value = CostRounding> {
    prop_oneof![Just(CostRounding::Independent), Just(CostRounding::LargestRemainder)]
}

// ── Tariff ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn bill_total_never_decreases_with_consumption(
        kwh in 0.0f64..3000.0,
        extra in 0.0f64..600.0,
    ) {
        let lower = calculate_bill(kwh).unwrap().total;
        let higher = calculate_bill(kwh + extra).unwrap().total;
        prop_assert!(higher >= lower, "bill dropped from {} to {} kWh: {} -> {}", kwh, kwh + extra, lower, higher);
    }
}

#[test]
fn crossing_the_telescopic_ceiling_reprices_every_unit() {
    let at_ceiling = bill_details(500.0).unwrap();
    let expected: f64 = (50.0 * 3.25 + 50.0 * 4.05 + 50.0 * 5.10 + 50.0 * 6.95 + 50.0 * 8.20) * 2.0 + 500.0 * 0.13;
    assert_eq!(at_ceiling.regime, Regime::Telescopic);
    assert_eq!(at_ceiling.total, expected.round());

    let above = bill_details(1002.0).unwrap();
    assert_eq!(above.regime, Regime::Flat);
    // 501 units/month land in the unbounded tier at 8.80 for every unit.
    assert_eq!(above.total, (501.0 * 8.80 * 2.0 + 1002.0 * 0.13_f64).round());

    let per_unit_ceiling = at_ceiling.energy_charge / at_ceiling.bi_monthly_kwh;
    let per_unit_above = above.energy_charge / above.bi_monthly_kwh;
    assert!(per_unit_above > per_unit_ceiling);
}

#[test]
fn documented_scenarios() {
    assert_eq!(calculate_bill(300.0).unwrap().total, 1279.0);
    assert_eq!(calculate_bill(700.0).unwrap().total, 5166.0);
}

// ── Reconciliation ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn reconciled_rows_sum_to_reported_total(
        breakdown in breakdown_strategy(),
        reported in reported_total_strategy(),
        rounding in rounding_strategy(),
    ) {
        let bill = calculate_bill(reported).unwrap().total;
        let config = ReconcileConfig { cost_rounding: rounding, ..Default::default() };
        let result = GapReconciler::new(config).reconcile(&breakdown, reported, bill).unwrap();

        let total: f64 = result.items.iter().map(|i| i.kwh).sum();
        prop_assert!((total - reported).abs() <= 1e-6, "sum {} != reported {}", total, reported);
        prop_assert!(result.items.iter().all(|i| i.kwh.is_finite() && i.kwh >= 0.0));
        prop_assert!(result.items.windows(2).all(|w| w[0].kwh >= w[1].kwh));
    }

    #[test]
    fn overhead_row_is_unique_and_above_floor(
        breakdown in breakdown_strategy(),
        reported in reported_total_strategy(),
    ) {
        let bill = calculate_bill(reported).unwrap().total;
        let result = GapReconciler::default().reconcile(&breakdown, reported, bill).unwrap();

        let overhead: Vec<_> = result.items.iter().filter(|i| i.id == OVERHEAD_ID).collect();
        prop_assert_eq!(overhead.len(), 1);
        prop_assert!(overhead[0].kwh >= reported * 0.05 - 1e-9);
    }

    #[test]
    fn independent_rounding_drift_is_bounded(
        breakdown in breakdown_strategy(),
        reported in reported_total_strategy(),
    ) {
        let bill = calculate_bill(reported).unwrap().total;
        let result = GapReconciler::default().reconcile(&breakdown, reported, bill).unwrap();

        let drift = (result.total_cost() - bill.round()).abs();
        prop_assert!(drift <= 0.5 * result.items.len() as f64, "drift {} over {} rows", drift, result.items.len());
    }

    #[test]
    fn largest_remainder_costs_sum_exactly(
        breakdown in breakdown_strategy(),
        reported in reported_total_strategy(),
    ) {
        let bill = calculate_bill(reported).unwrap().total;
        let config = ReconcileConfig { cost_rounding: CostRounding::LargestRemainder, ..Default::default() };
        let result = GapReconciler::new(config).reconcile(&breakdown, reported, bill).unwrap();

        prop_assert!((result.total_cost() - bill.round()).abs() < 1e-9);
    }

    #[test]
    fn share_pass_is_idempotent(
        breakdown in breakdown_strategy(),
        reported in reported_total_strategy(),
        rounding in rounding_strategy(),
    ) {
        let bill = calculate_bill(reported).unwrap().total;
        let config = ReconcileConfig { cost_rounding: rounding, ..Default::default() };
        let mut items = GapReconciler::new(config).reconcile(&breakdown, reported, bill).unwrap().items;
        let once = items.clone();

        apply_shares(&mut items, reported, bill, rounding).unwrap();
        prop_assert_eq!(items, once);
    }
}
