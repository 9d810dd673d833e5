use bill_core::domain::HouseholdProfile;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("consumption must be a finite number (got {0})")]
    NonFiniteConsumption(f64),
    #[error("num_people must be at least 1")]
    NoOccupants,
}

/// Clamp a user-entered kWh figure to the range the tariff accepts.
///
/// Negative readings become 0; NaN and infinities are rejected.
pub fn clamp_consumption(kwh: f64) -> Result<f64, ValidationError> {
    if !kwh.is_finite() {
        return Err(ValidationError::NonFiniteConsumption(kwh));
    }
    Ok(kwh.max(0.0))
}

/// Pure validation of the household answers.
///
/// Rules:
/// - bi-monthly kWh must be finite; negative values are clamped to 0.
/// - num_people, when given, must be at least 1.
pub fn validate_household(mut household: HouseholdProfile) -> Result<HouseholdProfile, ValidationError> {
    let checked = clamp_consumption(household.bi_monthly_kwh).and_then(|kwh| {
        if household.num_people == Some(0) {
            Err(ValidationError::NoOccupants)
        } else {
            Ok(kwh)
        }
    });

    match checked {
        Ok(kwh) => {
            household.bi_monthly_kwh = kwh;
            Ok(household)
        }
        Err(e) => {
            metrics::counter!("validation_household_rejected_total").increment(1);
            Err(e)
        }
    }
}
