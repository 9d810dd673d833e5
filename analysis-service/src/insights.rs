//! Rule-based efficiency tips shown next to the breakdown.

use bill_core::domain::HouseholdProfile;
use serde::{Deserialize, Serialize};

use crate::usage::UsageDetails;

/// Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Tip,
    Notice,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    pub message: String,
}

fn fridge_age_years(details: &UsageDetails) -> Option<f64> {
    match details.text("fridge_age") {
        Some("10+") => Some(11.0),
        Some("<1") => Some(0.5),
        _ => details.number("fridge_age"),
    }
}

/// Runs every rule against canonical appliance ids.
///
/// Returns at least one insight; the list is sorted most severe first and
/// keeps rule order within a severity.
pub fn run_diagnostics(household: &HouseholdProfile, appliances: &[String], details: &UsageDetails) -> Vec<Insight> {
    let has = |id: &str| appliances.iter().any(|a| a == id);
    let hours = |key: &str| details.number_or(key, 0.0);
    let mut out: Vec<Insight> = Vec::new();
    let mut push = |severity: Severity, message: String| out.push(Insight { severity, message });

    if has("fridge") {
        match fridge_age_years(details) {
            Some(age) if age > 10.0 => push(
                Severity::Critical,
                "Old Refrigerator: >10 years old. Likely consumes 2x power of new models.".into(),
            ),
            Some(age) if age > 5.0 => push(
                Severity::Notice,
                "Aging Refrigerator: Check door seals. Efficiency drops 2% per year.".into(),
            ),
            _ => {}
        }
    }

    if has("ac") {
        if details.star_rating("ac_star_rating") < 3 {
            push(
                Severity::Critical,
                "Inefficient AC: Low Star Rating (< 3 Stars). Consider upgrading to 5-Star Inverter AC.".into(),
            );
        }
        let temp = hours("ac_temperature");
        if temp > 16.0 && temp < 24.0 {
            push(
                Severity::Warning,
                format!("Low AC Temp ({temp}°C): Every degree below 24°C increases bill by ~6%. Set to 24°C."),
            );
        }
    }

    if has("washing_machine") {
        let wm_type = details.text_or("wm_type", "unknown");
        if wm_type.contains("top") || wm_type.contains("semi") {
            push(
                Severity::Tip,
                "Washing Machine: Front Loaders use 40% less water & energy than Top Loaders.".into(),
            );
        }
    }

    if has("water_heater") {
        push(
            Severity::Warning,
            "Water Heater: High consumption device. Switch to Solar Water Heater if possible.".into(),
        );
    }

    if has("cfl_bulb") || has("tube_light") {
        push(
            Severity::Notice,
            "Old Lighting: CFL/Tube lights waste heat. Switch to LEDs to save 50% on lighting.".into(),
        );
    }

    if has("ceiling_fan") && details.text_or("fan_type", "standard") != "bldc" {
        push(
            Severity::Tip,
            "Ceiling Fans: Standard fans use 75W. BLDC fans use only 28W (60% Savings).".into(),
        );
    }

    if household.num_people.unwrap_or(0) > 4 && household.bi_monthly_kwh > 400.0 {
        push(
            Severity::Critical,
            "High Consumption: Large family usage detected. Focus on behavioral changes.".into(),
        );
    }

    if household.season.as_deref() == Some("summer") && has("ac") {
        push(
            Severity::Notice,
            "Summer Peak: Cooling costs act as the primary bill driver. Use curtains/blinds.".into(),
        );
    }

    if has("water_pump") {
        let pump = hours("pump_hours");
        if pump > 1.5 {
            push(
                Severity::Critical,
                "Pump Alert: > 1.5 hrs/day is high. Check for leaks or float-valve failure.".into(),
            );
        } else if pump < 0.5 {
            push(Severity::Good, "Pump Optimized: Your water usage system is very efficient.".into());
        }
    }

    if has("desktop") && hours("desktop_hours") > 8.0 {
        push(
            Severity::Notice,
            "Desktop Workstation: Running long hours? Ensure 'Sleep' settings are active after 10 mins.".into(),
        );
    }
    if has("laptop") && hours("laptop_hours") > 12.0 {
        push(
            Severity::Tip,
            "Laptop: Always plugged in? Modern batteries manage charge, but it still draws power.".into(),
        );
    }
    if has("iron") && hours("iron_hours") > 0.5 {
        push(
            Severity::Warning,
            "Ironing: Daily heating wastes energy. Iron all clothes in one weekly batch.".into(),
        );
    }
    if has("hair_dryer") && hours("hair_dryer_hours") > 0.5 {
        push(
            Severity::Notice,
            "Hair Dryer: High heat device. 30 mins is equivalent to running 100 LEDs.".into(),
        );
    }
    if has("vacuum") && hours("vacuum_hours") > 0.4 {
        push(
            Severity::Tip,
            "Vacuuming: Frequent heavy motor usage. Check bag/filter to shorten cleaning time.".into(),
        );
    }
    if has("mixer_grinder") && hours("mixer_hours") > 0.5 {
        push(
            Severity::Tip,
            "Mixer/Grinder: Heavy preparation detected. Ensure lids are tight to avoid re-grinding.".into(),
        );
    }

    if out.is_empty() {
        out.push(Insight {
            severity: Severity::Good,
            message: "Efficiency Pro: Your energy habits are exemplary. Low consumption profile.".into(),
        });
    }

    // sort_by is stable, so rule order survives within a severity.
    out.sort_by(|a, b| b.severity.cmp(&a.severity));
    out
}
