use analysis_service::{
    api,
    config::AppConfig,
    metrics_server, observability,
    predictor::HttpPredictor,
    store::{AssessmentStore, MemoryAssessmentStore, PgAssessmentStore},
    AnalysisEngine,
};
use anyhow::Result;
use bill_core::GapReconciler;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let store: Arc<dyn AssessmentStore> = match &cfg.database {
        Some(db) => {
            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .connect(&db.uri)
                .await?;
            Arc::new(PgAssessmentStore::new(pool))
        }
        None => {
            tracing::warn!("no database configured, assessments are kept in memory");
            Arc::new(MemoryAssessmentStore::new())
        }
    };

    let predictor = HttpPredictor::new(&cfg.prediction)?;
    if predictor.health().await {
        tracing::info!(base_url = %cfg.prediction.base_url, "prediction service reachable");
    } else {
        tracing::warn!(
            base_url = %cfg.prediction.base_url,
            "prediction service not reachable, estimates will use fallbacks until it recovers"
        );
    }

    let engine = AnalysisEngine::new(
        Arc::new(predictor),
        store,
        GapReconciler::new(cfg.reconcile.to_config()),
    );
    let app = api::router(Arc::new(engine));

    let addr: SocketAddr = cfg
        .http
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "analysis service listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
