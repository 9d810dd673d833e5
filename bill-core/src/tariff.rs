//! Bi-monthly residential tariff.
//!
//! Up to 250 units a month the bill is telescopic: each 50-unit tier is priced
//! at its own rate. Above 250 units the whole month is priced at the rate of
//! the first flat tier whose cumulative limit covers it, so crossing 250 (and
//! each later tier limit) makes the bill jump.

use crate::{
    domain::{BillResult, Regime},
    numeric::round_currency,
    EstimateError,
};

/// Fuel surcharge per kWh, applied to the bi-monthly quantity.
pub const FSM_RATE: f64 = 0.13;

/// Highest monthly consumption still billed telescopically.
pub const TELESCOPIC_CEILING: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateTier {
    /// Tier width (telescopic) or cumulative upper bound (flat), monthly kWh.
    pub limit: f64,
    /// Currency per kWh.
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TariffSchedule {
    pub regime: Regime,
    pub tiers: &'static [RateTier],
}

pub static TELESCOPIC: TariffSchedule = TariffSchedule {
    regime: Regime::Telescopic,
    tiers: &[
        RateTier { limit: 50.0, rate: 3.25 },
        RateTier { limit: 50.0, rate: 4.05 },
        RateTier { limit: 50.0, rate: 5.10 },
        RateTier { limit: 50.0, rate: 6.95 },
        RateTier { limit: 50.0, rate: 8.20 },
    ],
};

pub static FLAT: TariffSchedule = TariffSchedule {
    regime: Regime::Flat,
    tiers: &[
        RateTier { limit: 300.0, rate: 6.40 },
        RateTier { limit: 350.0, rate: 7.25 },
        RateTier { limit: 400.0, rate: 7.60 },
        RateTier { limit: 500.0, rate: 7.90 },
        RateTier { limit: f64::INFINITY, rate: 8.80 },
    ],
};

impl TariffSchedule {
    pub fn for_monthly_units(monthly_units: f64) -> &'static TariffSchedule {
        if monthly_units <= TELESCOPIC_CEILING {
            &TELESCOPIC
        } else {
            &FLAT
        }
    }

    /// Monthly energy charge and the index of the last tier that priced units.
    pub fn monthly_charge(&self, monthly_units: f64) -> (f64, usize) {
        match self.regime {
            Regime::Telescopic => {
                let mut remaining = monthly_units;
                let mut charge = 0.0;
                let mut reached = 0;
                for (idx, tier) in self.tiers.iter().enumerate() {
                    if remaining <= 0.0 {
                        break;
                    }
                    let chunk = remaining.min(tier.limit);
                    charge += chunk * tier.rate;
                    remaining -= chunk;
                    reached = idx;
                }
                (charge, reached)
            }
            Regime::Flat => self
                .tiers
                .iter()
                .position(|tier| monthly_units <= tier.limit)
                .map(|idx| (monthly_units * self.tiers[idx].rate, idx))
                .unwrap_or((0.0, 0)),
        }
    }

    /// Human label for the tier band at `idx`, e.g. `Telescopic 101-150`.
    pub fn slab_label(&self, idx: usize) -> String {
        let (lower, upper) = match self.regime {
            Regime::Telescopic => {
                let before: f64 = self.tiers[..idx].iter().map(|t| t.limit).sum();
                (before, before + self.tiers[idx].limit)
            }
            Regime::Flat => {
                let before = if idx == 0 {
                    TELESCOPIC_CEILING
                } else {
                    self.tiers[idx - 1].limit
                };
                (before, self.tiers[idx].limit)
            }
        };

        let first = if lower == 0.0 { 0.0 } else { lower + 1.0 };
        if upper.is_infinite() {
            format!("{} above {lower}", self.regime.label())
        } else {
            format!("{} {first}-{upper}", self.regime.label())
        }
    }
}

/// Components of a computed bill.
#[derive(Debug, Clone, PartialEq)]
pub struct BillBreakdown {
    pub bi_monthly_kwh: f64,
    pub monthly_units: f64,
    pub regime: Regime,
    /// Energy charge for the whole two-month period.
    pub energy_charge: f64,
    pub fuel_surcharge: f64,
    /// Rounded total, whole currency units.
    pub total: f64,
    pub slab: String,
}

impl From<BillBreakdown> for BillResult {
    fn from(b: BillBreakdown) -> Self {
        BillResult {
            total: b.total,
            monthly: b.total / 2.0,
            slab: b.slab,
        }
    }
}

pub fn bill_details(bi_monthly_kwh: f64) -> Result<BillBreakdown, EstimateError> {
    if !bi_monthly_kwh.is_finite() || bi_monthly_kwh < 0.0 {
        return Err(EstimateError::InvalidConsumption(bi_monthly_kwh));
    }

    let monthly_units = bi_monthly_kwh / 2.0;
    let schedule = TariffSchedule::for_monthly_units(monthly_units);
    let (monthly_charge, tier_idx) = schedule.monthly_charge(monthly_units);

    let energy_charge = monthly_charge * 2.0;
    let fuel_surcharge = bi_monthly_kwh * FSM_RATE;

    Ok(BillBreakdown {
        bi_monthly_kwh,
        monthly_units,
        regime: schedule.regime,
        energy_charge,
        fuel_surcharge,
        total: round_currency(energy_charge + fuel_surcharge),
        slab: schedule.slab_label(tier_idx),
    })
}

/// Bill for a bi-monthly consumption figure.
pub fn calculate_bill(bi_monthly_kwh: f64) -> Result<BillResult, EstimateError> {
    bill_details(bi_monthly_kwh).map(BillResult::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telescopic_scenario() {
        // 150 units/month: 50 @ 3.25 + 50 @ 4.05 + 50 @ 5.10 = 620.
        let bill = calculate_bill(300.0).unwrap();
        assert_eq!(bill.total, 1279.0);
        assert_eq!(bill.monthly, 639.5);
        assert_eq!(bill.slab, "Telescopic 101-150");
    }

    #[test]
    fn flat_scenario_applies_rate_to_every_unit() {
        let details = bill_details(700.0).unwrap();
        assert_eq!(details.regime, Regime::Flat);
        assert!((details.energy_charge - 5075.0).abs() < 1e-9);
        assert_eq!(details.total, 5166.0);
        assert_eq!(details.slab, "Non-Telescopic 301-350");
    }

    #[test]
    fn boundary_stays_telescopic() {
        let details = bill_details(500.0).unwrap();
        assert_eq!(details.regime, Regime::Telescopic);

        let expected: f64 = (50.0 * 3.25 + 50.0 * 4.05 + 50.0 * 5.10 + 50.0 * 6.95 + 50.0 * 8.20) * 2.0 + 500.0 * 0.13;
        assert_eq!(details.total, expected.round());
        assert_eq!(details.slab, "Telescopic 201-250");
    }

    #[test]
    fn partial_first_tier() {
        // 20 units/month @ 3.25 = 65 -> 130 + 40 * 0.13 = 135.2
        let bill = calculate_bill(40.0).unwrap();
        assert_eq!(bill.total, 135.0);
        assert_eq!(bill.slab, "Telescopic 0-50");
    }

    #[test]
    fn zero_consumption_is_free() {
        let bill = calculate_bill(0.0).unwrap();
        assert_eq!(bill.total, 0.0);
        assert_eq!(bill.slab, "Telescopic 0-50");
    }

    #[test]
    fn top_flat_tier_is_unbounded() {
        let details = bill_details(2000.0).unwrap();
        // 1000 units/month @ 8.80, doubled, plus 2000 * 0.13.
        assert_eq!(details.total, 17860.0);
        assert_eq!(details.slab, "Non-Telescopic above 500");
    }

    #[test]
    fn rejects_negative_and_non_finite_input() {
        assert_eq!(
            calculate_bill(-1.0),
            Err(EstimateError::InvalidConsumption(-1.0))
        );
        assert!(matches!(
            calculate_bill(f64::NAN),
            Err(EstimateError::InvalidConsumption(_))
        ));
        assert!(calculate_bill(f64::INFINITY).is_err());
    }
}
