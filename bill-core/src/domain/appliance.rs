use serde::{Deserialize, Serialize};

/// One line of an appliance breakdown.
///
/// `percentage` and `cost` are derived from `kwh` against the reported total and
/// the bill total; they are only meaningful after a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceEstimate {
    pub id: String,
    pub name: String,
    pub kwh: f64,
    /// Plus/minus kWh confidence band.
    pub uncertainty: f64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub cost: f64,
}

impl ApplianceEstimate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kwh: f64, uncertainty: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kwh,
            uncertainty,
            percentage: 0.0,
            cost: 0.0,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.kwh.is_finite() && self.kwh >= 0.0 && self.uncertainty.is_finite() && self.uncertainty >= 0.0
    }
}
