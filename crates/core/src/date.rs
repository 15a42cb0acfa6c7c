//! Timestamp normalization.
//!
//! Every timestamp entering the engines passes through [`parse_instant`], which
//! never fails: it reports a three-way [`ParsedInstant`] and leaves the policy
//! for `Absent` vs `Malformed` to the caller.
//!
//! Timezone policy is UTC throughout. Offset-less inputs are read as UTC, and
//! a trailing `Z` is the UTC offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Outcome of normalizing one timestamp field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInstant {
    Valid(DateTime<Utc>),
    /// The field was missing, null or blank.
    Absent,
    /// The field was present but not a recognized ISO-8601 form. Holds the raw input.
    Malformed(String),
}

impl ParsedInstant {
    pub fn valid(&self) -> Option<DateTime<Utc>> {
        match self {
            ParsedInstant::Valid(at) => Some(*at),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedInstant::Valid(_))
    }
}

/// Parse an ISO-8601 date or date-time into a UTC instant.
pub fn parse_instant(raw: Option<&str>) -> ParsedInstant {
    let Some(raw) = raw else {
        return ParsedInstant::Absent;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedInstant::Absent;
    }

    match parse_trimmed(trimmed) {
        Some(at) => ParsedInstant::Valid(at),
        None => ParsedInstant::Malformed(raw.to_string()),
    }
}

/// Resolve the evaluation instant: the parsed value if valid, otherwise `fallback()`.
///
/// A malformed value is not an error here, but it is logged since the caller
/// most likely meant a specific instant.
pub fn resolve_now(raw: Option<&str>, fallback: impl FnOnce() -> DateTime<Utc>) -> DateTime<Utc> {
    match parse_instant(raw) {
        ParsedInstant::Valid(at) => at,
        ParsedInstant::Absent => fallback(),
        ParsedInstant::Malformed(raw) => {
            tracing::warn!(now = %raw, "unparsable `now`; falling back to current UTC time");
            fallback()
        }
    }
}

/// Whole days between `from` and `to`, rounded toward negative infinity.
///
/// Negative when `to` precedes `from`.
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

fn parse_trimmed(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }

    // `Z`/`z` is the UTC offset; rewrite it so the offset formats below apply.
    let with_offset = match s.strip_suffix(['Z', 'z']) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(at) = DateTime::parse_from_str(&with_offset, fmt) {
            return Some(at.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}
