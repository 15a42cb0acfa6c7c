//! Evaluation output shared by both engines.
//!
//! A [`Decision`] is request-scoped and never persisted. Absent optional fields
//! are omitted from the wire form entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RuleId;

/// Why a decision was reached (closed set).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// No usable `lastMaintenance` baseline.
    MissingLastMaintenance,
    /// At least one rule reached its frequency.
    MultipleRulesDue,
    /// The classification capability failed, timed out or was not configured.
    ClassificationUnavailable,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::MissingLastMaintenance => "missing_last_maintenance",
            Reason::MultipleRulesDue => "multiple_rules_due",
            Reason::ClassificationUnavailable => "classification_unavailable",
        }
    }
}

/// Risk tier derived from a risk score.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Tier for a risk score, inclusive lower bounds (0.8 → HIGH, 0.5 → MEDIUM).
    pub fn from_score(risk: f64) -> Self {
        if risk >= 0.8 {
            RiskLevel::High
        } else if risk >= 0.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Scheduling window for the tier, if it defines one.
    pub fn window_days(self) -> Option<i64> {
        match self {
            RiskLevel::High => Some(7),
            RiskLevel::Medium => Some(21),
            RiskLevel::Low => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

/// Decision returned to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub should_create_event: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_window_days: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_rule_ids: Option<Vec<RuleId>>,

    /// Set only when the advisory table query agreed with a deterministic due rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corroborated_rule_id: Option<RuleId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

impl Decision {
    /// `{shouldCreateEvent: false}` with nothing else.
    pub fn no_event() -> Self {
        Self::default()
    }

    /// `shouldCreateEvent: false` with a reason and explanation.
    pub fn declined(reason: Reason, explanation: impl Into<String>) -> Self {
        Self {
            reason: Some(reason),
            explanation: Some(explanation.into()),
            ..Self::default()
        }
    }
}

/// Round half away from zero to 3 decimals.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
