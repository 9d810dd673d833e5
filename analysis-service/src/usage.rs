use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form usage answers keyed by form field (`ac_hours`, `fridge_age`, ...).
///
/// Values arrive as numbers or as strings such as `"1.5 Ton"` or `"4-star"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageDetails(pub Map<String, Value>);

impl UsageDetails {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Numeric value of a field. Strings are read up to the first space.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.split_whitespace().next()?.parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    /// Star rating from values like `4`, `"5"` or `"3-star"`; 3 when unknown.
    pub fn star_rating(&self, key: &str) -> u32 {
        let parsed = match self.0.get(key) {
            Some(Value::Number(n)) => n.as_u64().map(|v| v as u32),
            Some(Value::String(s)) => s
                .split('-')
                .next()
                .and_then(|head| head.trim().parse::<u32>().ok()),
            _ => None,
        };
        parsed.filter(|star| *star > 0).unwrap_or(3)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for UsageDetails {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details(value: Value) -> UsageDetails {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn numbers_parse_from_numbers_and_labelled_strings() {
        let d = details(json!({
            "ac_hours": 8,
            "ac_tonnage": "1.5 Ton",
            "pump_hp": "",
            "fridge_age": "unknown",
        }));

        assert_eq!(d.number("ac_hours"), Some(8.0));
        assert_eq!(d.number("ac_tonnage"), Some(1.5));
        assert_eq!(d.number("pump_hp"), None);
        assert_eq!(d.number("fridge_age"), None);
        assert_eq!(d.number_or("missing", 2.5), 2.5);
    }

    #[test]
    fn star_rating_reads_leading_digit() {
        let d = details(json!({ "a": "5-star", "b": 4, "c": "none", "d": 0 }));
        assert_eq!(d.star_rating("a"), 5);
        assert_eq!(d.star_rating("b"), 4);
        assert_eq!(d.star_rating("c"), 3);
        assert_eq!(d.star_rating("d"), 3);
        assert_eq!(d.star_rating("missing"), 3);
    }

    #[test]
    fn empty_text_counts_as_missing() {
        let d = details(json!({ "fan_type": "bldc", "ac_type": "" }));
        assert_eq!(d.text("fan_type"), Some("bldc"));
        assert_eq!(d.text_or("ac_type", "split"), "split");
    }
}
