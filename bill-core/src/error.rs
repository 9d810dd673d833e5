/// Precondition violations in the bill and reconciliation core.
///
/// The core never clamps or patches its inputs: callers validate and clamp
/// user-supplied numbers first, and anything that slips through is rejected
/// here instead of producing NaN or infinite amounts downstream.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("consumption must be a finite, non-negative kWh value (got {0})")]
    InvalidConsumption(f64),
    #[error("reported total must be a finite, positive kWh value (got {0})")]
    InvalidReportedTotal(f64),
    #[error("estimate '{id}' has a negative or non-finite kwh/uncertainty")]
    InvalidEstimate { id: String },
    #[error("estimated total cost must be a finite, non-negative amount (got {0})")]
    InvalidCost(f64),
}
