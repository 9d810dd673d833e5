//! Household consumption against a size-based neighbourhood baseline.

use bill_core::numeric::percentage_of;
use serde::Serialize;

const KWH_PER_PERSON: f64 = 90.0;
const MIN_BASELINE_KWH: f64 = 200.0;
const DEFAULT_OCCUPANTS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Benchmark {
    pub baseline_kwh: f64,
    /// Positive when the household uses less than the baseline.
    pub efficiency_pct: f64,
    pub efficient: bool,
}

pub fn compare(bi_monthly_kwh: f64, num_people: Option<u32>) -> Benchmark {
    let people = num_people.unwrap_or(DEFAULT_OCCUPANTS);
    let baseline_kwh = (f64::from(people) * KWH_PER_PERSON).max(MIN_BASELINE_KWH);
    Benchmark {
        baseline_kwh,
        efficiency_pct: percentage_of(baseline_kwh - bi_monthly_kwh, baseline_kwh),
        efficient: bi_monthly_kwh <= baseline_kwh,
    }
}
