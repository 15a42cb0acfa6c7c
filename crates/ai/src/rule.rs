//! Maintenance rule input.
//!
//! Two wire encodings are accepted for the frequency: the nested
//! `frequency: {value, unit}` object and the legacy flat
//! `frequency_value` / `frequency_unit` fields. A key present in the nested
//! object wins, even when its value is null.
//! Values stay raw JSON here; the frequency converter decides what is usable.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use upkeep_core::frequency;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frequency {
    #[serde(default)]
    pub value: JsonValue,
    #[serde(default)]
    pub unit: JsonValue,
}

impl Frequency {
    pub fn new(value: impl Into<JsonValue>, unit: impl Into<JsonValue>) -> Self {
        Self {
            value: value.into(),
            unit: unit.into(),
        }
    }

    /// Whole days for this frequency, `None` when unusable.
    pub fn to_days(&self) -> Option<i64> {
        frequency::to_days(&self.value, &self.unit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRule")]
pub struct Rule {
    /// Raw identifier; blank ids are skipped by the engine.
    pub rule_id: String,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Rule {
    pub fn new(
        rule_id: impl Into<String>,
        value: impl Into<JsonValue>,
        unit: impl Into<JsonValue>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            frequency: Frequency::new(value, unit),
            name: None,
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Display label: name, else description, else empty.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRule {
    #[serde(default)]
    rule_id: Option<JsonValue>,
    #[serde(default)]
    frequency: Option<JsonValue>,
    #[serde(default)]
    frequency_value: Option<JsonValue>,
    #[serde(default)]
    frequency_unit: Option<JsonValue>,
    #[serde(default)]
    name: Option<JsonValue>,
    #[serde(default)]
    description: Option<JsonValue>,
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        let nested = |key: &str| -> Option<JsonValue> {
            raw.frequency
                .as_ref()
                .and_then(|f| f.get(key))
                .cloned()
        };

        let value = nested("value").or(raw.frequency_value.clone()).unwrap_or_default();
        let unit = nested("unit").or(raw.frequency_unit.clone()).unwrap_or_default();

        Rule {
            rule_id: raw.rule_id.as_ref().map(scalar_to_string).unwrap_or_default(),
            frequency: Frequency { value, unit },
            name: raw.name.as_ref().map(scalar_to_string).filter(|s| !s.is_empty()),
            description: raw
                .description
                .as_ref()
                .map(scalar_to_string)
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Text form of a JSON scalar as it appears in tables and ids.
///
/// Strings are unquoted, null is empty, everything else is compact JSON.
pub fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_frequency_is_read() {
        let r: Rule = serde_json::from_value(json!({
            "rule_id": "R_TRIM",
            "name": "Quarterly extinguisher check",
            "frequency": { "value": 3, "unit": "months" }
        }))
        .unwrap();

        assert_eq!(r.rule_id, "R_TRIM");
        assert_eq!(r.frequency.to_days(), Some(90));
        assert_eq!(r.label(), "Quarterly extinguisher check");
    }

    #[test]
    fn legacy_flat_fields_are_read() {
        let r: Rule = serde_json::from_value(json!({
            "rule_id": "R_ANNUAL",
            "frequency_value": "1",
            "frequency_unit": "Years",
            "description": "Annual inspection"
        }))
        .unwrap();

        assert_eq!(r.frequency.to_days(), Some(365));
        assert_eq!(r.label(), "Annual inspection");
    }

    #[test]
    fn nested_fields_win_per_key() {
        let r: Rule = serde_json::from_value(json!({
            "rule_id": "R",
            "frequency": { "unit": "weeks" },
            "frequency_value": 2,
            "frequency_unit": "days"
        }))
        .unwrap();

        assert_eq!(r.frequency.to_days(), Some(14));
    }

    #[test]
    fn nested_null_is_not_replaced_by_flat_fields() {
        let r: Rule = serde_json::from_value(json!({
            "rule_id": "R",
            "frequency": { "value": null, "unit": "days" },
            "frequency_value": 1
        }))
        .unwrap();

        assert_eq!(r.frequency.value, JsonValue::Null);
        assert_eq!(r.frequency.to_days(), None);
    }

    #[test]
    fn odd_shapes_degrade_instead_of_failing() {
        let r: Rule = serde_json::from_value(json!({
            "rule_id": 42,
            "frequency": "every three months"
        }))
        .unwrap();

        assert_eq!(r.rule_id, "42");
        assert_eq!(r.frequency.to_days(), None);

        let r: Rule = serde_json::from_value(json!({})).unwrap();
        assert!(r.rule_id.is_empty());
    }
}
