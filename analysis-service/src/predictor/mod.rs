use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod cache;
pub mod http;

pub use cache::PredictionCache;
pub use http::HttpPredictor;

use crate::simulation::SavingsInsight;

#[derive(thiserror::Error, Debug)]
pub enum PredictionError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("prediction service returned status {0}")]
    Status(u16),
    #[error("invalid prediction response: {0}")]
    Decode(String),
    #[error("prediction service declined: {0}")]
    Declined(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub appliance_name: String,
    pub details: Map<String, Value>,
    /// Household bi-monthly kWh, given to the model as context.
    pub total_bill: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub status: String,
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Anomaly {
    pub fn is_normal(&self) -> bool {
        self.status == "Normal"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionInsights {
    pub efficiency_score: Option<f64>,
    pub predicted_hours: Option<f64>,
    pub source: Option<String>,
    pub anomaly: Option<Anomaly>,
    pub confidence_score: Option<f64>,
    pub model_type: Option<String>,
    pub accuracy_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliancePrediction {
    pub status: String,
    /// Monthly kWh.
    #[serde(default)]
    pub prediction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<PredictionInsights>,
}

impl AppliancePrediction {
    /// Placeholder for an appliance the service could not predict.
    pub fn failed() -> Self {
        Self {
            status: "error".to_string(),
            prediction: 0.0,
            insights: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success" && self.prediction.is_finite()
    }
}

/// Savings simulation over every selected appliance at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRequest {
    /// Feature map per appliance id.
    pub details: Map<String, Value>,
    /// Household monthly kWh.
    pub total_bill: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsResponse {
    pub status: String,
    #[serde(default)]
    pub insights: Vec<SavingsInsight>,
}

impl SavingsResponse {
    pub fn into_insights(self) -> Result<Vec<SavingsInsight>, PredictionError> {
        if self.status == "success" {
            Ok(self.insights)
        } else {
            Err(PredictionError::Declined(format!("simulation status '{}'", self.status)))
        }
    }
}

/// Remote per-appliance consumption model.
#[async_trait::async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<AppliancePrediction, PredictionError>;

    /// Predict a batch in one call; results are keyed by appliance name.
    async fn predict_all(
        &self,
        requests: &[PredictionRequest],
    ) -> Result<HashMap<String, AppliancePrediction>, PredictionError>;

    /// Suggestions that would lower consumption, with monthly kWh saved.
    async fn simulate_savings(&self, request: &SavingsRequest) -> Result<Vec<SavingsInsight>, PredictionError>;
}
