use bill_core::domain::{AssessmentRecord, AssessmentUpdate};

pub mod memory;
pub mod postgres;

pub use memory::MemoryAssessmentStore;
pub use postgres::PgAssessmentStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("assessment '{0}' not found")]
    NotFound(String),
    #[error("invalid update: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(String),
}

/// Durable home of assessment records, keyed by an opaque record id.
#[async_trait::async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn save(&self, record_id: &str, update: AssessmentUpdate) -> Result<(), StoreError>;

    async fn load_latest(&self, user_id: &str) -> Result<Option<AssessmentRecord>, StoreError>;
}
