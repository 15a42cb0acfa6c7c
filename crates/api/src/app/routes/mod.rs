use axum::{Router, routing::post};
use chrono::{DateTime, Utc};
use tracing::info;

use upkeep_core::{AssetId, Decision, EventProposal, EventSource};

pub mod predictive_check;
pub mod rule_check;
pub mod system;

/// Router for the evaluation endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/rule-check", post(rule_check::rule_check))
        .route("/predictive-check", post(predictive_check::predictive_check))
}

/// Log the event a caller would schedule for a positive decision.
pub(crate) fn log_proposal(
    asset_id: AssetId,
    source: EventSource,
    decision: &Decision,
    evaluated_at: DateTime<Utc>,
) {
    if let Some(p) = EventProposal::from_decision(asset_id, source, decision, evaluated_at) {
        info!(
            asset_id = %p.asset_id,
            source = ?p.source,
            scheduled_at = %p.scheduled_at,
            primary_rule_id = p.primary_rule_id.as_ref().map(|r| r.as_str()),
            risk_level = p.risk_level.map(|l| l.as_str()),
            "maintenance event proposed"
        );
    }
}
