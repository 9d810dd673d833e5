//! Rooftop solar sizing and payback for a household.

use serde::Serialize;

/// Daily generation of one installed kW.
const KWH_PER_KW_DAY: f64 = 4.0;
/// Headroom for cloudy days and panel degradation.
const CLOUD_MARGIN: f64 = 1.1;
/// Systems are sold in half-kW steps.
const SIZE_STEP_KW: f64 = 0.5;
const COST_PER_KW: f64 = 60_000.0;
const ROOF_SQFT_PER_KW: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarPlan {
    pub system_kw: f64,
    pub daily_generation_kwh: f64,
    pub roof_area_sqft: f64,
    pub project_cost: f64,
    pub subsidy: f64,
    pub net_cost: f64,
    /// Years of bills the net cost equals, to one decimal. `None` without a bill.
    pub payback_years: Option<f64>,
}

/// Subsidy by system size, never more than 90% of what the system costs.
fn subsidy_for(system_kw: f64, project_cost: f64) -> f64 {
    let subsidy = if system_kw <= 1.0 {
        30_000.0
    } else if system_kw <= 2.0 {
        60_000.0
    } else {
        78_000.0
    };
    if subsidy > project_cost {
        project_cost * 0.9
    } else {
        subsidy
    }
}

/// Size a system that covers the household's average daily need.
///
/// `bill_total` is the bi-monthly bill; the payback counts six of them a year.
pub fn plan(bi_monthly_kwh: f64, bill_total: f64) -> SolarPlan {
    let daily_need = bi_monthly_kwh.max(0.0) / 2.0 / 30.0;
    let raw_kw = daily_need * CLOUD_MARGIN / KWH_PER_KW_DAY;
    let system_kw = (raw_kw / SIZE_STEP_KW).ceil() * SIZE_STEP_KW;

    let project_cost = system_kw * COST_PER_KW;
    let subsidy = subsidy_for(system_kw, project_cost);
    let net_cost = project_cost - subsidy;

    let annual_bill = bill_total * 6.0;
    let payback_years =
        (annual_bill.is_finite() && annual_bill > 0.0).then(|| (net_cost / annual_bill * 10.0).round() / 10.0);

    SolarPlan {
        system_kw,
        daily_generation_kwh: (system_kw * KWH_PER_KW_DAY).round(),
        roof_area_sqft: (system_kw * ROOF_SQFT_PER_KW).ceil(),
        project_cost,
        subsidy,
        net_cost,
        payback_years,
    }
}
