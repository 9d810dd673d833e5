use std::{collections::HashMap, time::Duration};

use serde::{de::DeserializeOwned, Serialize};

use super::{
    AppliancePrediction, PredictionCache, PredictionError, PredictionRequest, Predictor, SavingsRequest, SavingsResponse,
};
use crate::simulation::SavingsInsight;
use crate::config::PredictionConfig;

#[derive(Serialize)]
struct BatchBody<'a> {
    requests: &'a [PredictionRequest],
}

/// JSON-over-HTTP client for the prediction service.
pub struct HttpPredictor {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
    cache: PredictionCache,
}

impl HttpPredictor {
    pub fn new(cfg: &PredictionConfig) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            max_retries: cfg.max_retries,
            retry_backoff: Duration::from_millis(cfg.retry_backoff_ms),
            cache: PredictionCache::new(cfg.cache_capacity),
        })
    }

    /// Whether the service answers on its root path.
    pub async fn health(&self) -> bool {
        match self.client.get(format!("{}/", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, base_url = %self.base_url, "prediction service unreachable");
                false
            }
        }
    }

    async fn post_once<B, R>(&self, path: &str, body: &B) -> Result<R, PredictionError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| PredictionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PredictionError::Status(status.as_u16()));
        }

        resp.json::<R>()
            .await
            .map_err(|e| PredictionError::Decode(e.to_string()))
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, PredictionError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let mut attempt: u32 = 0;
        loop {
            metrics::counter!("prediction_requests_total").increment(1);
            match self.post_once(path, body).await {
                Ok(r) => return Ok(r),
                // A malformed body will not improve on retry.
                Err(e @ PredictionError::Decode(_)) => {
                    metrics::counter!("prediction_failures_total").increment(1);
                    return Err(e);
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    let sleep_for = self.retry_backoff * attempt;
                    tracing::warn!(
                        error = %e,
                        path,
                        attempt,
                        "prediction call failed, retrying with backoff"
                    );
                    tokio::time::sleep(sleep_for).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, path, "prediction call failed, giving up");
                    metrics::counter!("prediction_failures_total").increment(1);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<AppliancePrediction, PredictionError> {
        self.post_json("/predict-appliance", request).await
    }

    async fn predict_all(
        &self,
        requests: &[PredictionRequest],
    ) -> Result<HashMap<String, AppliancePrediction>, PredictionError> {
        let key = PredictionCache::key_for(requests);
        if let Some(hit) = key.as_deref().and_then(|k| self.cache.get(k)) {
            metrics::counter!("prediction_cache_hits_total").increment(1);
            tracing::debug!(appliances = requests.len(), "batch prediction served from cache");
            return Ok(hit);
        }

        let results: HashMap<String, AppliancePrediction> =
            self.post_json("/predict-all", &BatchBody { requests }).await?;

        if let Some(key) = key {
            self.cache.insert(key, results.clone());
        }
        Ok(results)
    }

    async fn simulate_savings(&self, request: &SavingsRequest) -> Result<Vec<SavingsInsight>, PredictionError> {
        let response: SavingsResponse = self.post_json("/simulate-savings", request).await?;
        response.into_insights()
    }
}
