use bill_core::domain::HouseholdProfile;
use serde_json::{Map, Value};

use crate::usage::UsageDetails;

/// Field mapper from wizard answers to the prediction service's feature names.
struct Payload<'a> {
    details: &'a UsageDetails,
    out: Map<String, Value>,
}

impl<'a> Payload<'a> {
    fn new(details: &'a UsageDetails, household: &HouseholdProfile) -> Self {
        let mut out = Map::new();
        out.insert("total_kwh_monthly".into(), household.bi_monthly_kwh.into());
        out.insert("n_occupants".into(), household.num_people.unwrap_or(4).into());
        out.insert(
            "season".into(),
            household.season.as_deref().unwrap_or("monsoon").into(),
        );
        out.insert("location_type".into(), household.location_or_default().into());
        Self { details, out }
    }

    fn number(mut self, target: &str, source: &str, default: f64) -> Self {
        let value = self.details.number_or(source, default);
        self.out.insert(target.into(), value.into());
        self
    }

    fn text(mut self, target: &str, source: &str, default: &str) -> Self {
        let value = self.details.text_or(source, default);
        self.out.insert(target.into(), value.into());
        self
    }

    fn star(mut self, target: &str, source: &str) -> Self {
        let value = self.details.star_rating(source);
        self.out.insert(target.into(), value.into());
        self
    }

    fn set(mut self, target: &str, value: impl Into<Value>) -> Self {
        self.out.insert(target.into(), value.into());
        self
    }

    /// Occasional-use appliances describe frequency instead of a pattern.
    fn frequency(mut self, target: &str, source: &str, heavy_scale: bool) -> Self {
        let freq = self.details.text(source);
        let pattern = match (freq, heavy_scale) {
            (Some("daily"), false) => "heavy",
            (Some("2-3"), false) => "moderate",
            (Some("weekly"), false) => "light",
            (_, false) => "rarely",
            (Some("daily"), true) => "very_heavy",
            (Some("2-3"), true) => "heavy",
            (Some("weekly"), true) => "moderate",
            (_, true) => "light",
        };
        self.out.insert(target.into(), pattern.into());
        self
    }

    fn finish(self) -> Map<String, Value> {
        self.out
    }
}

/// Feature map sent to the prediction service for one appliance.
pub fn prediction_details(id: &str, household: &HouseholdProfile, details: &UsageDetails) -> Map<String, Value> {
    let p = Payload::new(details, household);

    let p = match id {
        "ac" => p
            .number("ac_hours_per_day", "ac_hours", 6.0)
            .number("ac_tonnage", "ac_tonnage", 1.5)
            .star("ac_star_rating", "ac_star")
            .number("num_ac_units", "ac_units", 1.0)
            .text("ac_type", "ac_type", "split")
            .text(
                "ac_usage_pattern",
                "ac_usage_pattern",
                details.text_or("ac_pattern", "moderate"),
            ),
        "fridge" => {
            let age = if details.text("fridge_age") == Some("<1") {
                0.5
            } else {
                details.number_or("fridge_age", 5.0)
            };
            let kind = if details.text("fridge_type") == Some("frost") {
                "frost_free"
            } else {
                "direct_cool"
            };
            p.number("fridge_hours", "fridge_hours", 24.0)
                .number("fridge_capacity_liters", "fridge_capacity", 250.0)
                .set("fridge_age_years", age)
                .star("fridge_star_rating", "fridge_star")
                .set("fridge_type", kind)
                .text("refrigerator_usage_pattern", "fridge_pattern", "always")
        }
        "washing_machine" => p
            .number("wm_cycles_per_week", "wm_cycles_per_week", 4.0)
            .number("wm_capacity_kg", "wm_capacity", 7.0)
            .star("wm_star_rating", "wm_star")
            .text("wm_type", "wm_type", "top_load"),
        "ceiling_fan" => p
            .number("ceiling_fan_hours", "fan_hours", 12.0)
            .number("num_ceiling_fans", "num_fans", 3.0)
            .text("fan_type", "fan_type", "standard")
            .text("fan_usage_pattern", "fan_pattern", "most"),
        "led_light" => p
            .number("led_lights_hours", "led_hours", 6.0)
            .number("num_led_lights", "num_led", 5.0)
            .text("led_lights_usage_pattern", "led_pattern", "evening"),
        "tube_light" => p
            .number("tube_lights_hours", "tube_hours", 5.0)
            .number("num_tube_lights", "num_tube", 2.0)
            .text("tube_lights_usage_pattern", "tube_pattern", "evening"),
        "cfl_bulb" => p
            .number("cfl_lights_hours", "cfl_hours", 5.0)
            .number("num_cfl_bulbs", "num_cfl", 2.0)
            .text("cfl_lights_usage_pattern", "cfl_pattern", "evening"),
        "television" => p
            .number("television_hours", "tv_hours", 4.0)
            .text("television_usage_pattern", "tv_pattern", "moderate")
            .number("tv_size_inches", "tv_size", 43.0)
            .number("num_televisions", "num_tv", 1.0)
            .text("television_type", "tv_type", "LED"),
        "water_heater" => p
            .number("water_heater_hours", "geyser_hours", 0.5)
            .number("water_heater_capacity_liters", "geyser_capacity", 15.0)
            .text("water_heater_type", "geyser_type", "instant")
            .text("geyser_usage_pattern", "geyser_pattern", "light"),
        "desktop" => p
            .number("desktop_hours", "desktop_hours", 2.0)
            .text("desktop_usage_pattern", "desktop_pattern", "moderate"),
        "laptop" => p
            .number("laptop_hours", "laptop_hours", 4.0)
            .text("laptop_usage_pattern", "laptop_pattern", "moderate"),
        "water_pump" => p
            .number("water_pump_hours", "pump_hours", 0.5)
            .number("water_pump_hp", "pump_hp", 1.0)
            .text("pump_usage_pattern", "pump_pattern", "moderate"),
        "iron" => p
            .number("iron_hours", "iron_hours", 0.16)
            .frequency("iron_usage_pattern", "iron_frequency", false),
        "kettle" => p
            .number("kettle_hours", "kettle_hours", 0.1)
            .frequency("kettle_usage_pattern", "kettle_frequency", false),
        "induction" => p
            .number("induction_hours", "induction_hours", 1.0)
            .frequency("induction_usage_pattern", "induction_frequency", true),
        "rice_cooker" => p
            .number("rice_cooker_hours", "rice_cooker_hours", 0.5)
            .frequency("rice_cooker_usage_pattern", "rice_cooker_frequency", false),
        "mixer_grinder" => p
            .number("mixer_hours", "mixer_hours", 0.1)
            .frequency("mixer_usage_pattern", "mixer_grinder_frequency", false)
            .set("mixer_grinder_wattage", 750),
        "microwave" => p
            .number("microwave_hours", "microwave_hours", 0.1)
            .frequency("microwave_usage_pattern", "microwave_frequency", false)
            .set("microwave_capacity_liters", 20),
        "toaster" => p
            .number("toaster_hours", "toaster_hours", 0.05)
            .frequency("toaster_usage_pattern", "toaster_frequency", false),
        "food_processor" => p
            .number("food_processor_hours", "food_processor_hours", 0.2)
            .frequency("food_processor_usage_pattern", "food_processor_frequency", false),
        "hair_dryer" => p
            .number("hair_dryer_hours", "hair_dryer_hours", 0.1)
            .frequency("hair_dryer_usage_pattern", "hair_dryer_frequency", false),
        "vacuum" => p
            .number("vacuum_hours", "vacuum_hours", 0.2)
            .frequency("vacuum_usage_pattern", "vacuum_frequency", false),
        _ => p,
    };

    p.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn household() -> HouseholdProfile {
        HouseholdProfile {
            num_people: Some(5),
            season: Some("summer".to_string()),
            house_type: Some("independent".to_string()),
            location_type: None,
            bi_monthly_kwh: 420.0,
        }
    }

    #[test]
    fn ac_payload_maps_fields_and_defaults() {
        let details: UsageDetails = serde_json::from_value(json!({
            "ac_hours": "8",
            "ac_tonnage": "2 Ton",
            "ac_star": "5-star",
        }))
        .unwrap();

        let payload = prediction_details("ac", &household(), &details);
        assert_eq!(payload["total_kwh_monthly"], json!(420.0));
        assert_eq!(payload["n_occupants"], json!(5));
        assert_eq!(payload["location_type"], json!("rural"));
        assert_eq!(payload["ac_hours_per_day"], json!(8.0));
        assert_eq!(payload["ac_tonnage"], json!(2.0));
        assert_eq!(payload["ac_star_rating"], json!(5));
        assert_eq!(payload["num_ac_units"], json!(1.0));
        assert_eq!(payload["ac_type"], json!("split"));
        assert_eq!(payload["ac_usage_pattern"], json!("moderate"));
    }

    #[test]
    fn fridge_payload_normalises_age_and_type() {
        let details: UsageDetails = serde_json::from_value(json!({
            "fridge_age": "<1",
            "fridge_type": "frost",
        }))
        .unwrap();

        let payload = prediction_details("fridge", &household(), &details);
        assert_eq!(payload["fridge_age_years"], json!(0.5));
        assert_eq!(payload["fridge_type"], json!("frost_free"));
        assert_eq!(payload["fridge_hours"], json!(24.0));
    }

    #[test]
    fn frequency_maps_to_usage_pattern() {
        let details: UsageDetails = serde_json::from_value(json!({
            "iron_frequency": "weekly",
            "induction_frequency": "daily",
        }))
        .unwrap();

        let iron = prediction_details("iron", &household(), &details);
        assert_eq!(iron["iron_usage_pattern"], json!("light"));

        let induction = prediction_details("induction", &household(), &details);
        assert_eq!(induction["induction_usage_pattern"], json!("very_heavy"));

        let kettle = prediction_details("kettle", &household(), &details);
        assert_eq!(kettle["kettle_usage_pattern"], json!("rarely"));
    }

    #[test]
    fn unknown_appliance_gets_household_context_only() {
        let payload = prediction_details("air_purifier", &household(), &UsageDetails::default());
        assert_eq!(payload.len(), 4);
        assert_eq!(payload["season"], json!("summer"));
    }
}
