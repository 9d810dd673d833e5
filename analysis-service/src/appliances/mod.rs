//! Appliance catalog: canonical ids, display titles and the usage fields each
//! appliance is described by.

pub mod payload;
pub mod physics;

pub use payload::prediction_details;
pub use physics::exact_mode_kwh;

use crate::usage::UsageDetails;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplianceSpec {
    pub id: &'static str,
    pub title: &'static str,
    /// Usage field holding daily hours, when the appliance has one.
    pub hours_key: Option<&'static str>,
}

const fn spec(id: &'static str, title: &'static str, hours_key: Option<&'static str>) -> ApplianceSpec {
    ApplianceSpec { id, title, hours_key }
}

pub static CATALOG: &[ApplianceSpec] = &[
    spec("ac", "Air Conditioner", Some("ac_hours")),
    spec("fridge", "Refrigerator", Some("fridge_hours")),
    spec("washing_machine", "Washing Machine", None),
    spec("ceiling_fan", "Ceiling Fans", Some("fan_hours")),
    spec("led_light", "LED Lights", Some("led_hours")),
    spec("cfl_bulb", "CFL Lights", Some("cfl_hours")),
    spec("tube_light", "Tube Lights", Some("tube_hours")),
    spec("television", "Television", Some("tv_hours")),
    spec("water_heater", "Water Heater / Geyser", Some("geyser_hours")),
    spec("mixer_grinder", "Mixer / Grinder", Some("mixer_hours")),
    spec("microwave", "Microwave Oven", Some("microwave_hours")),
    spec("kettle", "Electric Kettle", Some("kettle_hours")),
    spec("induction", "Induction Cooktop", Some("induction_hours")),
    spec("water_pump", "Water Pump", Some("pump_hours")),
    spec("iron", "Iron Box", Some("iron_hours")),
    spec("desktop", "Desktop Computer", Some("desktop_hours")),
    spec("laptop", "Laptop", Some("laptop_hours")),
    spec("rice_cooker", "Rice Cooker", Some("rice_cooker_hours")),
    spec("toaster", "Toaster", Some("toaster_hours")),
    spec("food_processor", "Food Processor", Some("food_processor_hours")),
    spec("hair_dryer", "Hair Dryer", Some("hair_dryer_hours")),
    spec("vacuum", "Vacuum Cleaner", Some("vacuum_hours")),
];

/// Map a selection id from the wizard to its canonical appliance id.
pub fn canonical_id(selected: &str) -> &str {
    match selected {
        "air_conditioner" => "ac",
        "refrigerator" => "fridge",
        "fans" => "ceiling_fan",
        "led_lights" => "led_light",
        "cfl_lights" => "cfl_bulb",
        "tube_lights" => "tube_light",
        "mixer" => "mixer_grinder",
        "geyser" => "water_heater",
        "pump" => "water_pump",
        "tv" => "television",
        other => other,
    }
}

pub fn lookup(id: &str) -> Option<&'static ApplianceSpec> {
    CATALOG.iter().find(|s| s.id == id)
}

/// Display title, falling back to a title-cased id for unknown appliances.
pub fn display_name(id: &str) -> String {
    if let Some(spec) = lookup(id) {
        return spec.title.to_string();
    }

    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the user asked for the appliance to be computed from its ratings
/// instead of predicted.
pub fn is_exact_mode(id: &str, details: &UsageDetails) -> bool {
    lookup(id)
        .map(|spec| details.text(&format!("usage_mode_{}", spec.title)) == Some("exact"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aliases_resolve_to_canonical_ids() {
        assert_eq!(canonical_id("air_conditioner"), "ac");
        assert_eq!(canonical_id("geyser"), "water_heater");
        assert_eq!(canonical_id("kettle"), "kettle");
        assert!(CATALOG.iter().all(|s| canonical_id(s.id) == s.id));
    }

    #[test]
    fn display_names_use_catalog_then_title_case() {
        assert_eq!(display_name("ac"), "Air Conditioner");
        assert_eq!(display_name("ceiling_fan"), "Ceiling Fans");
        assert_eq!(display_name("air_purifier"), "Air Purifier");
    }

    #[test]
    fn exact_mode_flag_is_keyed_by_title() {
        let details: UsageDetails =
            serde_json::from_value(json!({ "usage_mode_Air Conditioner": "exact" })).unwrap();
        assert!(is_exact_mode("ac", &details));
        assert!(!is_exact_mode("fridge", &details));
    }
}
