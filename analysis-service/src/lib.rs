pub mod alerts;
pub mod api;
pub mod appliances;
pub mod benchmark;
pub mod config;
pub mod engine;
pub mod insights;
pub mod metrics_server;
pub mod observability;
pub mod predictor;
pub mod simulation;
pub mod solar;
pub mod store;
pub mod usage;
pub mod validation;

pub use engine::{AnalysisEngine, AnalysisError, AnalysisRequest, AnalysisResult};
