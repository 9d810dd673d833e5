use std::collections::HashMap;

use bill_core::domain::{AssessmentRecord, AssessmentUpdate};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{AssessmentStore, StoreError};

/// Process-local store, used when no database is configured and in tests.
///
/// Records must be registered before they can be updated, like rows in the
/// database that are created when the wizard starts.
#[derive(Default)]
pub struct MemoryAssessmentStore {
    records: RwLock<HashMap<String, AssessmentRecord>>,
}

impl MemoryAssessmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record for `user_id`.
    pub async fn register(&self, record_id: &str, user_id: &str) {
        let record = AssessmentRecord {
            id: record_id.to_string(),
            user_id: user_id.to_string(),
            num_people: None,
            season: None,
            house_type: None,
            bi_monthly_kwh: None,
            monthly_kwh: None,
            estimated_bill: None,
            input_kwh: None,
            predicted_kwh: None,
            selected_appliances: None,
            appliance_usage: None,
            final_breakdown: None,
            updated_at: OffsetDateTime::now_utc(),
        };
        self.records.write().await.insert(record_id.to_string(), record);
    }

    pub async fn get(&self, record_id: &str) -> Option<AssessmentRecord> {
        self.records.read().await.get(record_id).cloned()
    }
}

#[async_trait::async_trait]
impl AssessmentStore for MemoryAssessmentStore {
    async fn save(&self, record_id: &str, update: AssessmentUpdate) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(record_id)
            .ok_or_else(|| StoreError::NotFound(record_id.to_string()))?;
        update
            .apply_to(record, OffsetDateTime::now_utc())
            .map_err(|e| StoreError::Invalid(format!("num_people: {e}")))
    }

    async fn load_latest(&self, user_id: &str) -> Result<Option<AssessmentRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.updated_at)
            .cloned())
    }
}
