use std::num::TryFromIntError;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ApplianceEstimate;

/// Household answers collected before an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdProfile {
    pub num_people: Option<u32>,
    pub season: Option<String>,
    pub house_type: Option<String>,
    pub location_type: Option<String>,
    /// Consumption printed on the bill for the two-month period.
    pub bi_monthly_kwh: f64,
}

impl HouseholdProfile {
    pub fn monthly_kwh(&self) -> f64 {
        self.bi_monthly_kwh / 2.0
    }

    /// Location context sent with predictions. Independent houses without an
    /// explicit location are treated as rural.
    pub fn location_or_default(&self) -> &str {
        match (&self.location_type, self.house_type.as_deref()) {
            (Some(loc), _) => loc,
            (None, Some("independent")) => "rural",
            (None, _) => "urban",
        }
    }
}

/// One entry of the per-record analysis history kept inside `appliance_usage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub kwh: f64,
    pub bill: f64,
    pub mode: String,
    #[serde(default)]
    pub breakdown: Vec<ApplianceEstimate>,
}

impl HistoryEntry {
    /// A zero bill is only plausible for near-zero consumption.
    pub fn is_plausible(&self) -> bool {
        self.bill > 0.0 || self.kwh < 5.0
    }

    /// Whether a stored entry records the same reading. Only `kwh` and `bill`
    /// are read, so entries written by older versions still compare.
    pub fn repeats(&self, stored: &serde_json::Value) -> bool {
        stored.get("kwh").and_then(serde_json::Value::as_f64) == Some(self.kwh)
            && stored.get("bill").and_then(serde_json::Value::as_f64) == Some(self.bill)
    }
}

/// Row of the `assessments` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AssessmentRecord {
    pub id: String,
    pub user_id: String,
    pub num_people: Option<i32>,
    pub season: Option<String>,
    pub house_type: Option<String>,
    pub bi_monthly_kwh: Option<f64>,
    pub monthly_kwh: Option<f64>,
    pub estimated_bill: Option<f64>,
    pub input_kwh: Option<f64>,
    pub predicted_kwh: Option<f64>,
    pub selected_appliances: Option<Vec<String>>,
    pub appliance_usage: Option<serde_json::Value>,
    pub final_breakdown: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial write-back after an analysis run. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentUpdate {
    pub num_people: Option<u32>,
    pub season: Option<String>,
    pub house_type: Option<String>,
    pub bi_monthly_kwh: Option<f64>,
    pub estimated_bill: Option<f64>,
    pub selected_appliances: Option<Vec<String>>,
    pub appliance_usage: Option<serde_json::Value>,
    pub final_breakdown: Option<serde_json::Value>,
    /// Raw sum of appliance predictions before reconciliation.
    pub predicted_kwh: Option<f64>,
}

impl AssessmentUpdate {
    pub fn monthly_kwh(&self) -> Option<f64> {
        self.bi_monthly_kwh.map(|kwh| kwh / 2.0)
    }

    /// The bill's own reading, stored next to `predicted_kwh` for model feedback.
    pub fn input_kwh(&self) -> Option<f64> {
        self.bi_monthly_kwh.filter(|kwh| *kwh > 0.0)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `num_people` as stored in the `integer` column.
    pub fn num_people_column(&self) -> Result<Option<i32>, TryFromIntError> {
        self.num_people.map(i32::try_from).transpose()
    }

    /// Apply the non-empty fields of this update onto an existing record.
    /// The record is left untouched when a field does not fit its column.
    pub fn apply_to(&self, record: &mut AssessmentRecord, now: OffsetDateTime) -> Result<(), TryFromIntError> {
        if let Some(v) = self.num_people_column()? {
            record.num_people = Some(v);
        }
        if let Some(v) = &self.season {
            record.season = Some(v.clone());
        }
        if let Some(v) = &self.house_type {
            record.house_type = Some(v.clone());
        }
        if let Some(v) = self.bi_monthly_kwh {
            record.bi_monthly_kwh = Some(v);
            record.monthly_kwh = self.monthly_kwh();
        }
        if let Some(v) = self.input_kwh() {
            record.input_kwh = Some(v);
        }
        if let Some(v) = self.estimated_bill {
            record.estimated_bill = Some(v);
        }
        if let Some(v) = &self.selected_appliances {
            record.selected_appliances = Some(v.clone());
        }
        if let Some(v) = &self.appliance_usage {
            record.appliance_usage = Some(v.clone());
        }
        if let Some(v) = &self.final_breakdown {
            record.final_breakdown = Some(v.clone());
        }
        if let Some(v) = self.predicted_kwh {
            record.predicted_kwh = Some(v);
        }
        record.updated_at = now;
        Ok(())
    }
}
