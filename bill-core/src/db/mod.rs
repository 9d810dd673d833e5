pub mod assessment_queries;

pub use assessment_queries::{latest_assessment, update_assessment};
