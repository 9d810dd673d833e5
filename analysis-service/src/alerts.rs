//! Instant feedback on implausible daily usage hours.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageAlert {
    pub appliance: String,
    pub level: AlertLevel,
    pub message: String,
}

fn alert(appliance: &str, level: AlertLevel, message: impl Into<String>) -> Option<UsageAlert> {
    Some(UsageAlert {
        appliance: appliance.to_string(),
        level,
        message: message.into(),
    })
}

/// Alert for `hours` of daily use of a canonical appliance, if any.
pub fn usage_alert(appliance: &str, hours: f64) -> Option<UsageAlert> {
    use AlertLevel::{Error, Warning};

    if !hours.is_finite() {
        return None;
    }

    match appliance {
        "ac" if hours > 16.0 => alert(appliance, Error, "Continuous AC usage (>16h) will drastically spike your bill."),
        "ac" if hours > 12.0 => alert(appliance, Warning, "High AC usage detected. Expect a significant impact on your bill."),
        "water_heater" if hours > 3.0 => alert(appliance, Error, "Geyser running >3 hours/day is extremely expensive."),
        "water_heater" if hours > 1.5 => alert(appliance, Warning, "Most households only need 30-60 mins of geyser usage per day."),
        "water_pump" if hours > 2.0 => alert(appliance, Error, "Water pump >2 hours? Check for leaks or float valve failure."),
        "water_pump" if hours > 1.0 => alert(appliance, Warning, "Pump usage is higher than average (30-45 mins)."),
        "induction" if hours > 3.0 => alert(appliance, Error, "Induction >3 hours makes electricity costlier than LPG."),
        "induction" if hours > 2.0 => alert(appliance, Warning, "High induction usage detected."),
        "iron" if hours > 1.0 => alert(appliance, Warning, "Ironing >1 hour/day? Try batch ironing weekly to save power."),
        "fridge" if hours > 24.0 => alert(appliance, Error, "Hours cannot exceed 24."),
        "fridge" if hours < 10.0 => alert(appliance, Warning, "<10 hours may cause food spoilage unless empty."),
        "washing_machine" if hours > 3.0 => alert(appliance, Warning, "More than 3 hours/day. Verify if this is accurate."),
        "microwave" | "kettle" | "rice_cooker" | "food_processor" if hours > 1.5 => alert(
            appliance,
            Warning,
            format!("High usage for {}. More than 1.5 hours is unusual.", appliance.replace('_', " ")),
        ),
        "mixer_grinder" if hours > 1.0 => alert(appliance, Warning, "Mixer running >1 hr? Ensure jars are not overloaded."),
        "toaster" if hours > 0.5 => alert(appliance, Warning, "More than 30 mins of toasting a day is a lot of bread."),
        "ceiling_fan" if hours > 20.0 => alert(appliance, Warning, "Fans running >20 hours. BLDC fans save about 60%."),
        "led_light" | "cfl_bulb" | "tube_light" if hours > 18.0 => {
            alert(appliance, Warning, "Lights on >18 hours? Switch off when leaving rooms.")
        }
        "television" if hours > 10.0 => alert(appliance, Warning, "TV on >10 hours. Lower brightness to save power."),
        "desktop" if hours > 16.0 => alert(appliance, Warning, "Desktop >16 hours. Enable sleep mode."),
        "laptop" if hours > 16.0 => alert(appliance, Warning, "Laptop plugged in >16 hours. Batteries prefer cycling."),
        "hair_dryer" if hours > 0.5 => alert(appliance, Warning, "Hair dryer >30 mins uses as much as 100 LED bulbs."),
        "vacuum" if hours > 1.0 => alert(appliance, Warning, "Vacuuming >1 hour daily? Check bag/filter for blockages."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ac_thresholds() {
        assert_eq!(usage_alert("ac", 8.0), None);
        assert_eq!(usage_alert("ac", 13.0).unwrap().level, AlertLevel::Warning);
        assert_eq!(usage_alert("ac", 17.0).unwrap().level, AlertLevel::Error);
    }

    #[test]
    fn fridge_checks_both_directions() {
        assert_eq!(usage_alert("fridge", 25.0).unwrap().level, AlertLevel::Error);
        assert_eq!(usage_alert("fridge", 6.0).unwrap().level, AlertLevel::Warning);
        assert_eq!(usage_alert("fridge", 24.0), None);
    }

    #[test]
    fn kitchen_message_names_the_appliance() {
        let a = usage_alert("rice_cooker", 2.0).unwrap();
        assert!(a.message.contains("rice cooker"));
        assert_eq!(a.appliance, "rice_cooker");
    }

    #[test]
    fn unknown_appliance_has_no_alert() {
        assert_eq!(usage_alert("air_purifier", 24.0), None);
    }
}
