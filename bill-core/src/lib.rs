pub mod db;
pub mod domain;
pub mod error;
pub mod numeric;
pub mod reconcile;
pub mod tariff;

pub use error::EstimateError;
pub use reconcile::{distribute_energy_gap, GapReconciler, ReconcileConfig, Reconciliation};
pub use tariff::{bill_details, calculate_bill};
