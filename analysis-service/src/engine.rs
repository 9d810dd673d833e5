use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Instant,
};

use bill_core::{
    calculate_bill,
    domain::{ApplianceEstimate, AssessmentUpdate, BillResult, HistoryEntry, HouseholdProfile},
    reconcile::Strategy,
    EstimateError, GapReconciler,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::{
    alerts::{usage_alert, UsageAlert},
    appliances::{self, payload::prediction_details, physics::exact_mode_kwh},
    benchmark::{self, Benchmark},
    insights::{run_diagnostics, Insight},
    predictor::{Anomaly, AppliancePrediction, PredictionError, PredictionRequest, Predictor, SavingsRequest},
    simulation::{optimize, SimulationOutcome},
    solar::{self, SolarPlan},
    store::AssessmentStore,
    usage::UsageDetails,
    validation::{validate_household, ValidationError},
};

const FALLBACK_KWH: f64 = 10.0;
const FALLBACK_UNCERTAINTY: f64 = 5.0;
const MIN_PREDICTION_KWH: f64 = 0.1;
const MIN_BREAKDOWN_KWH: f64 = 0.01;
const DEFAULT_CONFIDENCE: f64 = 98.2;
const LOW_CONFIDENCE_REVIEW_KWH: f64 = 50.0;
const HYBRID_MODEL: &str = "Hybrid AI-Physics";

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("invalid household: {0}")]
    Validation(#[from] ValidationError),
    #[error("estimate failed: {0}")]
    Estimate(#[from] EstimateError),
    #[error("prediction service failed: {0}")]
    Prediction(#[from] PredictionError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Only the appliance list is known; answers fall back to defaults.
    Quick,
    #[default]
    Detailed,
}

impl AnalysisMode {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Detailed => "detailed",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub household: HouseholdProfile,
    /// Selection ids as sent by the wizard; aliases are accepted.
    #[serde(default)]
    pub appliances: Vec<String>,
    #[serde(default)]
    pub details: UsageDetails,
    /// Assessment row to write the result back to.
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub mode: AnalysisMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetrics {
    pub confidence: String,
    pub model: String,
    pub accuracy: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Reported bi-monthly kWh the breakdown is reconciled to.
    pub total_usage: f64,
    pub bill: BillResult,
    pub bill_estimate: f64,
    pub breakdown: Vec<ApplianceEstimate>,
    pub predictions: BTreeMap<String, f64>,
    pub uncertainties: BTreeMap<String, f64>,
    pub anomalies: BTreeMap<String, Anomaly>,
    /// Sum of the estimates that entered reconciliation.
    pub raw_total: f64,
    pub metrics: ResultMetrics,
    pub strategy: Option<Strategy>,
    pub alerts: Vec<UsageAlert>,
    pub insights: Vec<Insight>,
    pub solar: SolarPlan,
    pub benchmark: Benchmark,
    pub persisted: bool,
}

/// Runs one appliance analysis: bill, predictions, reconciliation and
/// write-back.
pub struct AnalysisEngine {
    predictor: Arc<dyn Predictor>,
    store: Arc<dyn AssessmentStore>,
    reconciler: GapReconciler,
}

impl AnalysisEngine {
    pub fn new(predictor: Arc<dyn Predictor>, store: Arc<dyn AssessmentStore>, reconciler: GapReconciler) -> Self {
        Self {
            predictor,
            store,
            reconciler,
        }
    }

    pub fn store(&self) -> &Arc<dyn AssessmentStore> {
        &self.store
    }

    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        metrics::counter!("analysis_runs_total", "mode" => request.mode.as_str()).increment(1);

        let household = validate_household(request.household)?;
        let details = request.details;
        let total_kwh = household.bi_monthly_kwh;
        let bill = calculate_bill(total_kwh)?;

        let ids = canonical_selection(&request.appliances);
        let alerts = usage_alerts(&ids, &details);
        let insights = run_diagnostics(&household, &ids, &details);
        let solar = solar::plan(total_kwh, bill.total);
        let benchmark = benchmark::compare(total_kwh, household.num_people);

        let mut result = if ids.is_empty() {
            AnalysisResult {
                total_usage: total_kwh,
                bill_estimate: bill.total,
                bill,
                breakdown: Vec::new(),
                predictions: BTreeMap::new(),
                uncertainties: BTreeMap::new(),
                anomalies: BTreeMap::new(),
                raw_total: 0.0,
                metrics: ResultMetrics {
                    confidence: "100".to_string(),
                    model: "None".to_string(),
                    accuracy: "N/A".to_string(),
                },
                strategy: None,
                alerts,
                insights,
                solar,
                benchmark,
                persisted: false,
            }
        } else {
            let requests = build_requests(&ids, &household, &details, request.mode);
            let predictions = self.fetch_predictions(&requests).await;
            let estimates = raw_estimates(&ids, &predictions, &details);

            let mut anomalies = BTreeMap::new();
            for id in &ids {
                let anomaly = predictions
                    .get(id)
                    .and_then(|p| p.insights.as_ref())
                    .and_then(|i| i.anomaly.as_ref());
                if let Some(anomaly) = anomaly.filter(|a| !a.is_normal()) {
                    anomalies.insert(id.clone(), anomaly.clone());
                }
            }

            let breakdown: Vec<ApplianceEstimate> = estimates
                .iter()
                .filter(|(_, kwh, _)| *kwh > MIN_BREAKDOWN_KWH)
                .map(|(id, kwh, uncertainty)| {
                    ApplianceEstimate::new(id.clone(), appliances::display_name(id), *kwh, *uncertainty)
                })
                .collect();
            let raw_total: f64 = breakdown.iter().map(|e| e.kwh).sum();

            let reconciliation = self.reconciler.reconcile(&breakdown, total_kwh, bill.total)?;
            tracing::info!(
                appliances = ids.len(),
                strategy = ?reconciliation.strategy,
                raw_total,
                total_kwh,
                "breakdown reconciled"
            );

            AnalysisResult {
                total_usage: total_kwh,
                bill_estimate: bill.total,
                bill,
                breakdown: reconciliation.items,
                predictions: estimates.iter().map(|(id, kwh, _)| (id.clone(), *kwh)).collect(),
                uncertainties: estimates.iter().map(|(id, _, u)| (id.clone(), *u)).collect(),
                anomalies,
                raw_total,
                metrics: confidence_metrics(&ids, &predictions, &estimates),
                strategy: Some(reconciliation.strategy),
                alerts,
                insights,
                solar,
                benchmark,
                persisted: false,
            }
        };

        if let Some(record_id) = request.record_id.as_deref() {
            let update = assessment_update(&household, &ids, &details, &result);
            result.persisted = match self.store.save(record_id, update).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, record_id, "failed to save analysis result");
                    false
                }
            };
        }

        metrics::histogram!("analysis_duration_seconds").record(started.elapsed().as_secs_f64());
        Ok(result)
    }

    /// Ask the prediction service for savings and re-bill the household with
    /// them applied. Unlike predictions, a failed simulation fails the call.
    pub async fn simulate(&self, request: AnalysisRequest) -> Result<SimulationOutcome, AnalysisError> {
        metrics::counter!("savings_simulations_total").increment(1);

        let household = validate_household(request.household)?;
        let bill = calculate_bill(household.bi_monthly_kwh)?;
        let ids = canonical_selection(&request.appliances);

        let details: Map<String, Value> = build_requests(&ids, &household, &request.details, request.mode)
            .into_iter()
            .map(|r| (r.appliance_name, Value::Object(r.details)))
            .collect();
        let savings = SavingsRequest {
            details,
            total_bill: household.monthly_kwh(),
        };

        let insights = self.predictor.simulate_savings(&savings).await?;
        let outcome = optimize(household.bi_monthly_kwh, bill.total, &insights)?;
        if let SimulationOutcome::Optimized(opt) = &outcome {
            tracing::info!(
                suggestions = insights.len(),
                new_kwh = opt.new_kwh,
                saved_amount = opt.saved_amount,
                "savings simulated"
            );
        }
        Ok(outcome)
    }

    /// Batch prediction, falling back to concurrent single calls when the
    /// batch endpoint fails. Appliances that still fail are marked failed.
    async fn fetch_predictions(&self, requests: &[PredictionRequest]) -> HashMap<String, AppliancePrediction> {
        match self.predictor.predict_all(requests).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    appliances = requests.len(),
                    "batch prediction failed, falling back to single predictions"
                );
                let singles = join_all(requests.iter().map(|r| self.predictor.predict(r))).await;
                requests
                    .iter()
                    .zip(singles)
                    .map(|(req, res)| {
                        let prediction = res.unwrap_or_else(|e| {
                            tracing::warn!(error = %e, appliance = %req.appliance_name, "prediction failed");
                            AppliancePrediction::failed()
                        });
                        (req.appliance_name.clone(), prediction)
                    })
                    .collect()
            }
        }
    }
}

/// Canonical ids in selection order, without duplicates.
fn canonical_selection(selected: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(selected.len());
    for id in selected.iter().map(|s| appliances::canonical_id(s)) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn usage_alerts(ids: &[String], details: &UsageDetails) -> Vec<UsageAlert> {
    ids.iter()
        .filter_map(|id| {
            let key = appliances::lookup(id)?.hours_key?;
            usage_alert(id, details.number(key)?)
        })
        .collect()
}

fn build_requests(
    ids: &[String],
    household: &HouseholdProfile,
    details: &UsageDetails,
    mode: AnalysisMode,
) -> Vec<PredictionRequest> {
    let defaults = UsageDetails::default();
    let answers = match mode {
        AnalysisMode::Quick => &defaults,
        AnalysisMode::Detailed => details,
    };
    ids.iter()
        .map(|id| PredictionRequest {
            appliance_name: id.clone(),
            details: prediction_details(id, household, answers),
            total_bill: household.bi_monthly_kwh,
        })
        .collect()
}

/// `(id, kwh, uncertainty)` per appliance, in selection order.
fn raw_estimates(
    ids: &[String],
    predictions: &HashMap<String, AppliancePrediction>,
    details: &UsageDetails,
) -> Vec<(String, f64, f64)> {
    ids.iter()
        .map(|id| {
            let predicted = predictions
                .get(id)
                .filter(|p| p.is_success())
                .map(|p| p.prediction)
                .unwrap_or(0.0);

            let (kwh, uncertainty) = if appliances::is_exact_mode(id, details) {
                match exact_mode_kwh(id, details) {
                    Some(kwh) => (kwh, kwh * 0.05),
                    None => (predicted, predicted * 0.10),
                }
            } else if predicted < MIN_PREDICTION_KWH {
                (FALLBACK_KWH, FALLBACK_UNCERTAINTY)
            } else {
                (predicted, predicted * 0.10)
            };
            (id.clone(), kwh, uncertainty)
        })
        .collect()
}

fn confidence_metrics(
    ids: &[String],
    predictions: &HashMap<String, AppliancePrediction>,
    estimates: &[(String, f64, f64)],
) -> ResultMetrics {
    let mut weighted = 0.0;
    let mut weight = 0.0;
    let mut accuracy = "High Accuracy";

    for (id, (_, kwh, _)) in ids.iter().zip(estimates) {
        let Some(insights) = predictions
            .get(id)
            .filter(|p| p.is_success())
            .and_then(|p| p.insights.as_ref())
        else {
            continue;
        };
        let Some(score) = insights.confidence_score.filter(|s| *s != 0.0) else {
            continue;
        };
        weighted += score * kwh;
        weight += kwh;
        if insights.accuracy_tag.as_deref() == Some("Low Confidence") && *kwh > LOW_CONFIDENCE_REVIEW_KWH {
            accuracy = "Review Needed";
        }
    }

    let confidence = if weight > 0.0 { weighted / weight } else { DEFAULT_CONFIDENCE };
    ResultMetrics {
        confidence: format!("{:.1}", confidence.clamp(60.0, 99.9)),
        model: HYBRID_MODEL.to_string(),
        accuracy: accuracy.to_string(),
    }
}

/// Usage answers with this run appended to their `history`, unless the entry
/// is implausible or repeats the previous one.
fn with_history(details: &UsageDetails, entry: &HistoryEntry) -> Value {
    let mut usage = details.clone();
    let mut history = match usage.get("history") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let repeated = history.last().is_some_and(|last| entry.repeats(last));

    if entry.is_plausible() && !repeated {
        match serde_json::to_value(entry) {
            Ok(value) => history.push(value),
            Err(e) => tracing::warn!(error = %e, "could not encode history entry"),
        }
    }

    usage.insert("history", Value::Array(history));
    usage.into_value()
}

fn assessment_update(
    household: &HouseholdProfile,
    ids: &[String],
    details: &UsageDetails,
    result: &AnalysisResult,
) -> AssessmentUpdate {
    let entry = HistoryEntry {
        date: OffsetDateTime::now_utc(),
        kwh: household.bi_monthly_kwh,
        bill: result.bill.total.floor(),
        mode: details.text_or("mode", "Standard").to_string(),
        breakdown: result.breakdown.clone(),
    };

    let final_breakdown = serde_json::to_value(result)
        .map_err(|e| tracing::warn!(error = %e, "could not encode analysis result"))
        .ok();

    AssessmentUpdate {
        num_people: household.num_people,
        season: household.season.clone(),
        house_type: household.house_type.clone(),
        bi_monthly_kwh: Some(household.bi_monthly_kwh),
        estimated_bill: Some(result.bill_estimate),
        selected_appliances: Some(ids.to_vec()),
        appliance_usage: Some(with_history(details, &entry)),
        final_breakdown,
        predicted_kwh: Some(result.raw_total),
    }
}
