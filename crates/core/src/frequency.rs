//! Frequency → day-count conversion.
//!
//! Month and year lengths are fixed approximations (30 and 365 days). Changing
//! them changes which rules come out due, so they are not calendar-exact.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Unit of a rule's maintenance frequency.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Day,
    Week,
    Month,
    Year,
}

impl FrequencyUnit {
    pub const ALL: [FrequencyUnit; 4] = [
        FrequencyUnit::Day,
        FrequencyUnit::Week,
        FrequencyUnit::Month,
        FrequencyUnit::Year,
    ];

    /// Days per unit.
    pub fn multiplier(self) -> i64 {
        match self {
            FrequencyUnit::Day => 1,
            FrequencyUnit::Week => 7,
            FrequencyUnit::Month => 30,
            FrequencyUnit::Year => 365,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FrequencyUnit::Day => "day",
            FrequencyUnit::Week => "week",
            FrequencyUnit::Month => "month",
            FrequencyUnit::Year => "year",
        }
    }
}

/// Unrecognized unit spelling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported frequency unit: {0:?}")]
pub struct UnknownUnit(pub String);

impl FromStr for FrequencyUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "days" => Ok(FrequencyUnit::Day),
            "week" | "weeks" => Ok(FrequencyUnit::Week),
            "month" | "months" => Ok(FrequencyUnit::Month),
            "year" | "years" => Ok(FrequencyUnit::Year),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

/// Read a frequency value from any scalar-like JSON representation.
///
/// Integers pass through, finite floats truncate toward zero, strings are
/// trimmed and parsed as base-10 integers. Null and containers are
/// non-numeric.
///
/// Booleans are rejected rather than read as 0 or 1.
pub fn parse_frequency_value(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            let truncated = f.trunc();
            // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
            if truncated.is_finite()
                && truncated >= i64::MIN as f64
                && truncated < i64::MAX as f64
            {
                Some(truncated as i64)
            } else {
                None
            }
        }
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Read a frequency unit. Only strings can name a unit.
pub fn parse_frequency_unit(unit: &JsonValue) -> Option<FrequencyUnit> {
    unit.as_str().and_then(|s| s.parse().ok())
}

/// Convert a `(value, unit)` pair into whole days.
///
/// `None` when the value is non-numeric, the unit is unrecognized, or the
/// product does not fit in an `i64`.
pub fn to_days(value: &JsonValue, unit: &JsonValue) -> Option<i64> {
    let v = parse_frequency_value(value)?;
    let u = parse_frequency_unit(unit)?;
    v.checked_mul(u.multiplier())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn months_and_years_are_approximate() {
        assert_eq!(to_days(&json!(3), &json!("months")), Some(90));
        assert_eq!(to_days(&json!(12), &json!("months")), Some(360));
        assert_eq!(to_days(&json!(1), &json!("year")), Some(365));
        assert_eq!(to_days(&json!(2), &json!("Weeks")), Some(14));
    }

    #[test]
    fn scalar_like_values_are_accepted() {
        assert_eq!(parse_frequency_value(&json!(" 7 ")), Some(7));
        assert_eq!(parse_frequency_value(&json!("+4")), Some(4));
        assert_eq!(parse_frequency_value(&json!(3.9)), Some(3));
        assert_eq!(parse_frequency_value(&json!(-2.5)), Some(-2));
    }

    #[test]
    fn non_numeric_values_are_undefined() {
        assert_eq!(to_days(&json!("3.5"), &json!("days")), None);
        assert_eq!(to_days(&json!("often"), &json!("days")), None);
        assert_eq!(to_days(&json!(null), &json!("days")), None);
        assert_eq!(to_days(&json!(true), &json!("days")), None);
        assert_eq!(to_days(&json!([3]), &json!("days")), None);
    }

    #[test]
    fn booleans_are_not_coerced_to_numbers() {
        assert_eq!(parse_frequency_value(&json!(true)), None);
        assert_eq!(parse_frequency_value(&json!(false)), None);
        assert_eq!(to_days(&json!(true), &json!("day")), None);
    }

    #[test]
    fn unknown_units_are_undefined() {
        assert_eq!(to_days(&json!(3), &json!("fortnights")), None);
        assert_eq!(to_days(&json!(3), &json!(null)), None);
        assert_eq!(to_days(&json!(3), &json!(7)), None);
        assert!("hours".parse::<FrequencyUnit>().is_err());
    }

    #[test]
    fn overflow_is_undefined() {
        assert_eq!(to_days(&json!(i64::MAX), &json!("years")), None);
    }

    fn spelling(unit: FrequencyUnit, plural: bool, upper: bool, pad: bool) -> String {
        let mut s = unit.as_str().to_string();
        if plural {
            s.push('s');
        }
        if upper {
            s = s.to_uppercase();
        }
        if pad {
            s = format!("  {s}\t");
        }
        s
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: due days are value × multiplier regardless of case, plurality or padding.
        #[test]
        fn due_days_invariant_under_spelling(
            value in -100_000i64..100_000i64,
            unit_idx in 0usize..4,
            plural in any::<bool>(),
            upper in any::<bool>(),
            pad in any::<bool>(),
            as_string in any::<bool>(),
        ) {
            let unit = FrequencyUnit::ALL[unit_idx];
            let raw_unit = JsonValue::String(spelling(unit, plural, upper, pad));
            let raw_value = if as_string { json!(value.to_string()) } else { json!(value) };

            prop_assert_eq!(to_days(&raw_value, &raw_unit), Some(value * unit.multiplier()));
        }
    }
}
