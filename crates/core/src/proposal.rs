//! Maintenance event proposals.
//!
//! A proposal is what a caller would schedule for a positive decision. It is
//! plain data: this crate never stores or schedules it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::{Decision, RiskLevel};
use crate::id::{AssetId, RuleId};

/// Window used when a positive decision carries none.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Which evaluation path produced the decision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    Rule,
    Predictive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProposal {
    pub asset_id: AssetId,
    pub source: EventSource,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub due_rule_ids: Vec<RuleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_rule_id: Option<RuleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl EventProposal {
    /// Build a proposal from a positive decision; `None` when no event is wanted.
    ///
    /// `scheduled_at` is the decision's `suggestedDate` when present, otherwise
    /// `evaluated_at + suggestedWindowDays` (7 days if absent).
    pub fn from_decision(
        asset_id: AssetId,
        source: EventSource,
        decision: &Decision,
        evaluated_at: DateTime<Utc>,
    ) -> Option<Self> {
        if !decision.should_create_event {
            return None;
        }

        let scheduled_at = match decision.suggested_date {
            Some(at) => at,
            None => {
                let window = decision.suggested_window_days.unwrap_or(DEFAULT_WINDOW_DAYS);
                evaluated_at + Duration::days(window)
            }
        };

        let due_rule_ids = decision.due_rule_ids.clone().unwrap_or_default();
        let primary_rule_id = due_rule_ids.first().cloned();

        Some(Self {
            asset_id,
            source,
            scheduled_at,
            due_rule_ids,
            primary_rule_id,
            risk_level: decision.risk_level,
            explanation: decision.explanation.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Reason;
    use chrono::TimeZone;

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, d, 0, 0, 0).unwrap()
    }

    fn asset() -> AssetId {
        "EST-001".parse().unwrap()
    }

    #[test]
    fn negative_decisions_propose_nothing() {
        let d = Decision::declined(Reason::MissingLastMaintenance, "no baseline");
        assert!(EventProposal::from_decision(asset(), EventSource::Rule, &d, at(1)).is_none());
    }

    #[test]
    fn rule_proposal_uses_window_and_first_due_rule() {
        let d = Decision {
            should_create_event: true,
            reason: Some(Reason::MultipleRulesDue),
            suggested_window_days: Some(7),
            due_rule_ids: Some(vec!["R_TRIM".parse().unwrap(), "R_ANNUAL".parse().unwrap()]),
            ..Decision::default()
        };

        let p = EventProposal::from_decision(asset(), EventSource::Rule, &d, at(1)).unwrap();
        assert_eq!(p.scheduled_at, at(8));
        assert_eq!(p.primary_rule_id.unwrap().as_str(), "R_TRIM");
        assert_eq!(p.due_rule_ids.len(), 2);
    }

    #[test]
    fn suggested_date_wins_over_window() {
        let d = Decision {
            should_create_event: true,
            suggested_window_days: Some(21),
            suggested_date: Some(at(3)),
            risk_level: Some(RiskLevel::Medium),
            ..Decision::default()
        };

        let p = EventProposal::from_decision(asset(), EventSource::Predictive, &d, at(1)).unwrap();
        assert_eq!(p.scheduled_at, at(3));
        assert_eq!(p.risk_level, Some(RiskLevel::Medium));
        assert!(p.primary_rule_id.is_none());
    }

    #[test]
    fn missing_window_defaults_to_a_week() {
        let d = Decision {
            should_create_event: true,
            ..Decision::default()
        };
        let p = EventProposal::from_decision(asset(), EventSource::Rule, &d, at(1)).unwrap();
        assert_eq!(p.scheduled_at, at(8));
    }
}
