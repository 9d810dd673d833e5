//! Bill after applying the savings suggested by the prediction service.

use bill_core::{calculate_bill, EstimateError};
use serde::{Deserialize, Serialize};

/// Optimized consumption is never assumed below this many bi-monthly kWh.
pub const MIN_OPTIMIZED_KWH: f64 = 50.0;

/// One suggestion returned by the savings simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsInsight {
    pub title: String,
    /// Monthly kWh saved if the suggestion is followed.
    #[serde(default)]
    pub saved_kwh: f64,
}

impl SavingsInsight {
    fn monthly_saving(&self) -> f64 {
        if self.saved_kwh.is_finite() {
            self.saved_kwh.max(0.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Optimization {
    pub original_kwh: f64,
    pub new_kwh: f64,
    pub original_bill: f64,
    pub new_bill: f64,
    pub saved_amount: f64,
    /// `"<title> (Save <n> kWh)"` per suggestion.
    pub breakdown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationOutcome {
    /// No suggestions came back.
    AlreadyOptimized,
    Optimized(Optimization),
}

/// Re-bill the household with every suggestion applied.
///
/// Savings are monthly, so the bi-monthly reading drops by twice their sum.
/// Negative or non-finite savings count as zero.
pub fn optimize(
    bi_monthly_kwh: f64,
    original_bill: f64,
    insights: &[SavingsInsight],
) -> Result<SimulationOutcome, EstimateError> {
    if insights.is_empty() {
        return Ok(SimulationOutcome::AlreadyOptimized);
    }

    let monthly_saved: f64 = insights.iter().map(SavingsInsight::monthly_saving).sum();
    let new_kwh = (bi_monthly_kwh - monthly_saved * 2.0).max(MIN_OPTIMIZED_KWH);
    let new_bill = calculate_bill(new_kwh)?.total;

    let breakdown = insights
        .iter()
        .map(|i| format!("{} (Save {} kWh)", i.title, i.monthly_saving().round()))
        .collect();

    Ok(SimulationOutcome::Optimized(Optimization {
        original_kwh: bi_monthly_kwh,
        new_kwh,
        original_bill,
        new_bill,
        saved_amount: original_bill - new_bill,
        breakdown,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insight(title: &str, saved_kwh: f64) -> SavingsInsight {
        SavingsInsight {
            title: title.to_string(),
            saved_kwh,
        }
    }

    #[test]
    fn no_suggestions_means_already_optimized() {
        assert_eq!(optimize(300.0, 1279.0, &[]).unwrap(), SimulationOutcome::AlreadyOptimized);
    }

    #[test]
    fn monthly_savings_are_doubled_and_rebilled() {
        let insights = [insight("Raise AC to 26C", 30.0), insight("Replace old fridge", 20.4)];
        let SimulationOutcome::Optimized(opt) = optimize(700.0, 5166.0, &insights).unwrap() else {
            panic!("expected an optimization");
        };

        assert!((opt.new_kwh - 599.2).abs() < 1e-9);
        assert_eq!(opt.new_bill, calculate_bill(opt.new_kwh).unwrap().total);
        assert_eq!(opt.saved_amount, 5166.0 - opt.new_bill);
        assert!(opt.saved_amount > 0.0);
        assert_eq!(
            opt.breakdown,
            vec!["Raise AC to 26C (Save 30 kWh)", "Replace old fridge (Save 20 kWh)"]
        );
    }

    #[test]
    fn optimized_reading_has_a_floor() {
        let SimulationOutcome::Optimized(opt) = optimize(120.0, 300.0, &[insight("Solar water heater", 500.0)]).unwrap()
        else {
            panic!("expected an optimization");
        };
        assert_eq!(opt.new_kwh, MIN_OPTIMIZED_KWH);
        assert_eq!(opt.new_bill, calculate_bill(MIN_OPTIMIZED_KWH).unwrap().total);
    }

    #[test]
    fn bogus_savings_are_ignored() {
        let insights = [insight("Noise", f64::NAN), insight("Backwards", -40.0)];
        let SimulationOutcome::Optimized(opt) = optimize(300.0, 1279.0, &insights).unwrap() else {
            panic!("expected an optimization");
        };
        assert_eq!(opt.new_kwh, 300.0);
        assert_eq!(opt.saved_amount, 0.0);
        assert_eq!(opt.breakdown, vec!["Noise (Save 0 kWh)", "Backwards (Save 0 kWh)"]);
    }

    #[test]
    fn outcome_is_tagged_by_status() {
        let json = serde_json::to_value(SimulationOutcome::AlreadyOptimized).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "already_optimized" }));

        let SimulationOutcome::Optimized(opt) = optimize(300.0, 1279.0, &[insight("Fans", 10.0)]).unwrap() else {
            panic!("expected an optimization");
        };
        let json = serde_json::to_value(SimulationOutcome::Optimized(opt)).unwrap();
        assert_eq!(json["status"], "optimized");
        assert_eq!(json["new_kwh"], 280.0);
    }
}
