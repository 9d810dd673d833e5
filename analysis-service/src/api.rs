use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bill_core::{calculate_bill, domain::AssessmentRecord, domain::BillResult};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    engine::{AnalysisEngine, AnalysisError, AnalysisRequest, AnalysisResult},
    simulation::SimulationOutcome,
    store::StoreError,
    validation::clamp_consumption,
};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<AnalysisEngine>,
}

pub fn router(engine: Arc<AnalysisEngine>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/calculate-bill", post(calculate_bill_handler))
        .route("/analyze", post(analyze))
        .route("/simulate-savings", post(simulate_savings))
        .route("/assessments/latest/:user_id", get(latest_assessment))
        .with_state(AppState { engine })
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no assessment for user '{0}'")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Analysis(AnalysisError::Prediction(_)) => StatusCode::BAD_GATEWAY,
            Self::Analysis(_) | Self::Store(StoreError::Invalid(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "analysis-service" }))
}

#[derive(Debug, Deserialize)]
struct BillRequest {
    kwh: f64,
}

/// Never fails: readings that cannot be priced get the "Error" slab.
async fn calculate_bill_handler(Json(req): Json<BillRequest>) -> Json<BillResult> {
    metrics::counter!("bill_requests_total").increment(1);
    let bill = clamp_consumption(req.kwh)
        .map_err(|e| e.to_string())
        .and_then(|kwh| calculate_bill(kwh).map_err(|e| e.to_string()));

    match bill {
        Ok(bill) => Json(bill),
        Err(e) => {
            tracing::warn!(error = %e, kwh = req.kwh, "bill calculation failed");
            Json(BillResult::unavailable())
        }
    }
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let result = state.engine.run(req).await?;
    Ok(Json(result))
}

async fn simulate_savings(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<SimulationOutcome>, ApiError> {
    let outcome = state.engine.simulate(req).await?;
    Ok(Json(outcome))
}

async fn latest_assessment(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AssessmentRecord>, ApiError> {
    match state.engine.store().load_latest(&user_id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(user_id)),
    }
}
