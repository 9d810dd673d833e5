//! Rating-based consumption for appliances in exact mode.

use crate::usage::UsageDetails;

/// Days in the monthly estimate.
const DAYS: f64 = 30.0;

/// Nameplate watts used when an appliance has no rating-specific rule.
fn default_watts(id: &str) -> f64 {
    match id {
        "ceiling_fan" => 75.0,
        "led_light" => 10.0,
        "cfl_bulb" => 15.0,
        "tube_light" => 40.0,
        "ac" | "chiller" | "induction" | "kettle" => 1500.0,
        "fridge" => 200.0,
        "washing_machine" | "food_processor" => 500.0,
        "television" => 100.0,
        "desktop" => 200.0,
        "laptop" => 50.0,
        "water_heater" => 2000.0,
        "water_pump" | "mixer_grinder" => 750.0,
        "iron" | "vacuum" => 1000.0,
        "microwave" | "hair_dryer" => 1200.0,
        "rice_cooker" => 700.0,
        "toaster" => 800.0,
        _ => 100.0,
    }
}

/// Running watts derived from the appliance's ratings.
pub fn rated_watts(id: &str, details: &UsageDetails) -> f64 {
    match id {
        "ac" => {
            let tons = details.number_or("ac_tonnage", 1.5);
            let star = details.star_rating("ac_star") as f64;
            tons * 1000.0 * (1.0 + (5.0 - star) * 0.12)
        }
        "ceiling_fan" => {
            if details.text("fan_type") == Some("bldc") {
                28.0
            } else {
                75.0
            }
        }
        "water_pump" => details.number_or("pump_hp", 1.0) * 746.0,
        "television" => details.number_or("tv_size", 43.0) * 2.0,
        "water_heater" => {
            if details.text("geyser_type") == Some("instant") {
                3000.0
            } else {
                2000.0
            }
        }
        "fridge" => details.number_or("fridge_capacity", 250.0) / 250.0 * 40.0,
        other => default_watts(other),
    }
}

fn tv_hours(details: &UsageDetails) -> f64 {
    let from_pattern = match details.text_or("tv_pattern", "moderate") {
        "light" => 2.0,
        "heavy" => 6.5,
        "always" => 10.0,
        _ => 4.0,
    };
    details.number_or("tv_hours", from_pattern)
}

/// Daily hours and unit count for an appliance, or `None` when exact mode
/// does not cover it.
fn hours_and_count(id: &str, details: &UsageDetails) -> Option<(f64, f64)> {
    let usage = match id {
        "ac" => (details.number_or("ac_hours", 6.0), details.number_or("ac_units", 1.0)),
        "ceiling_fan" => (details.number_or("fan_hours", 12.0), details.number_or("num_fans", 3.0)),
        "led_light" => (details.number_or("led_hours", 6.0), details.number_or("num_led", 5.0)),
        "tube_light" => (details.number_or("tube_hours", 5.0), 2.0),
        "cfl_bulb" => (details.number_or("cfl_hours", 5.0), 2.0),
        "fridge" => (details.number_or("fridge_hours", 24.0), 1.0),
        "television" => (tv_hours(details), 1.0),
        "washing_machine" => (details.number_or("wm_cycles_per_week", 4.0) * 1.5 / 7.0, 1.0),
        "water_heater" => (details.number_or("geyser_hours", 1.0), 1.0),
        "water_pump" => (details.number_or("pump_hours", 0.5), 1.0),
        "mixer_grinder" => (details.number_or("mixer_hours", 0.5), 1.0),
        "microwave" => (details.number_or("microwave_hours", 0.5), 1.0),
        "kettle" => (details.number_or("kettle_hours", 0.5), 1.0),
        "induction" => (details.number_or("induction_hours", 1.5), 1.0),
        "iron" => (details.number_or("iron_hours", 0.5), 1.0),
        "desktop" => (details.number_or("desktop_hours", 4.0), 1.0),
        "laptop" => (details.number_or("laptop_hours", 4.0), 1.0),
        _ => return None,
    };
    Some(usage)
}

/// Monthly kWh computed from ratings and hours, `None` when the appliance is
/// not covered or reports no usage.
pub fn exact_mode_kwh(id: &str, details: &UsageDetails) -> Option<f64> {
    let (hours, count) = hours_and_count(id, details)?;
    if hours <= 0.0 {
        return None;
    }

    let kwh = match id {
        "washing_machine" => {
            let cycles = details.number_or("wm_times_week", 4.0) * 4.0;
            cycles * details.number_or("wm_capacity", 7.0) * 0.15
        }
        "fridge" => {
            let base = details.number_or("fridge_capacity", 250.0) / 250.0 * 30.0;
            let age_factor = if details.text("fridge_age") == Some("10+") { 1.3 } else { 1.0 };
            base * age_factor * (hours / 24.0)
        }
        _ => rated_watts(id, details) * hours * DAYS * count / 1000.0,
    };
    Some(kwh)
}
