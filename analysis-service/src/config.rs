use bill_core::reconcile::{CostRounding, ReconcileConfig};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Distinct batch requests kept in the response cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_cache_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReconcileSettings {
    #[serde(default)]
    pub cost_rounding: CostRounding,
}

impl ReconcileSettings {
    pub fn to_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            cost_rounding: self.cost_rounding,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Without a database the service keeps assessments in memory.
    pub database: Option<DatabaseConfig>,
    pub prediction: PredictionConfig,
    pub http: HttpConfig,
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub reconcile: ReconcileSettings,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("ANALYSIS_CONFIG").unwrap_or_else(|_| "analysis-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}
