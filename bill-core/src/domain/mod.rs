pub mod appliance;
pub mod assessment;
pub mod bill;

pub use appliance::ApplianceEstimate;
pub use assessment::{AssessmentRecord, AssessmentUpdate, HistoryEntry, HouseholdProfile};
pub use bill::{BillResult, Regime};
