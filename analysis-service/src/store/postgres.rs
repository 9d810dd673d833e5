use bill_core::{
    db,
    domain::{AssessmentRecord, AssessmentUpdate},
};
use sqlx::PgPool;

use super::{AssessmentStore, StoreError};

pub struct PgAssessmentStore {
    pool: PgPool,
}

impl PgAssessmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AssessmentStore for PgAssessmentStore {
    async fn save(&self, record_id: &str, update: AssessmentUpdate) -> Result<(), StoreError> {
        let touched = db::update_assessment(&self.pool, record_id, &update)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, record_id, "assessment update failed");
                metrics::counter!("assessment_store_errors_total").increment(1);
                StoreError::Database(e.to_string())
            })?;

        if touched == 0 {
            return Err(StoreError::NotFound(record_id.to_string()));
        }
        Ok(())
    }

    async fn load_latest(&self, user_id: &str) -> Result<Option<AssessmentRecord>, StoreError> {
        db::latest_assessment(&self.pool, user_id).await.map_err(|e| {
            tracing::error!(error = %e, user_id, "assessment load failed");
            metrics::counter!("assessment_store_errors_total").increment(1);
            StoreError::Database(e.to_string())
        })
    }
}
