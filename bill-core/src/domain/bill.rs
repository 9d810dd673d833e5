use serde::{Deserialize, Serialize};

/// Which rate schedule a bill was priced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Marginal pricing: each unit is charged at the rate of the tier it falls in.
    Telescopic,
    /// One tier's rate applied to the whole monthly quantity.
    Flat,
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Telescopic => "Telescopic",
            Self::Flat => "Non-Telescopic",
        }
    }
}

/// Bi-monthly bill estimate handed to the rendering and persistence layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillResult {
    /// Whole currency units for the two-month billing period.
    pub total: f64,
    pub monthly: f64,
    pub slab: String,
}

impl BillResult {
    /// Safe default reported when a bill could not be computed.
    pub fn unavailable() -> Self {
        Self {
            total: 0.0,
            monthly: 0.0,
            slab: "Error".to_string(),
        }
    }
}
