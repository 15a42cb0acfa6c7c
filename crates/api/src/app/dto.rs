use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use upkeep_ai::{
    EvaluationCadence, EvaluationKind, ModelDescriptor, PredictiveCheck, Rule, RuleCheck,
};
use upkeep_core::{AssetId, DomainResult, parse_instant, resolve_now};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RuleCheckRequest {
    pub asset_id: String,
    #[serde(default, rename = "lastMaintenance", alias = "last_maintenance")]
    pub last_maintenance: Option<String>,
    #[serde(default)]
    pub now: Option<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleCheckRequest {
    /// Validate the boundary fields and normalize timestamps.
    ///
    /// Only `asset_id` can be rejected; every other gap degrades inside the engine.
    pub fn into_job(self, clock: impl FnOnce() -> DateTime<Utc>) -> DomainResult<RuleCheck> {
        let asset_id: AssetId = self.asset_id.parse()?;
        Ok(RuleCheck {
            asset_id,
            last_maintenance: parse_instant(self.last_maintenance.as_deref()),
            now: resolve_now(self.now.as_deref(), clock),
            rules: self.rules,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictiveCheckRequest {
    pub asset_id: String,
    #[serde(default)]
    pub history: Vec<JsonValue>,
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
    #[serde(default)]
    pub now: Option<String>,
}

impl PredictiveCheckRequest {
    pub fn into_job(self, clock: impl FnOnce() -> DateTime<Utc>) -> DomainResult<PredictiveCheck> {
        let asset_id: AssetId = self.asset_id.parse()?;
        Ok(PredictiveCheck {
            asset_id,
            history: self.history,
            metadata: self.metadata,
            now: resolve_now(self.now.as_deref(), clock),
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: ModelDescriptor,
    pub cadence: CadenceDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CadenceDto {
    pub rule_check_secs: i64,
    pub predictive_check_secs: i64,
}

impl From<EvaluationCadence> for CadenceDto {
    fn from(c: EvaluationCadence) -> Self {
        Self {
            rule_check_secs: c.interval(EvaluationKind::RuleCheck).num_seconds(),
            predictive_check_secs: c.interval(EvaluationKind::PredictiveCheck).num_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use upkeep_core::{DomainError, ParsedInstant};

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn rule_check_request_uses_wire_names() {
        let req: RuleCheckRequest = serde_json::from_value(json!({
            "asset_id": "EST-001",
            "lastMaintenance": "2024-01-10",
            "now": "2025-02-01T00:00:00Z",
            "rules": [{ "rule_id": "R_TRIM", "frequency": { "value": 3, "unit": "months" } }]
        }))
        .unwrap();

        let job = req.into_job(clock).unwrap();
        assert_eq!(job.asset_id.as_str(), "EST-001");
        assert!(job.last_maintenance.is_valid());
        assert_eq!(job.now, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(job.rules.len(), 1);
    }

    #[test]
    fn missing_or_bad_now_falls_back_to_the_clock() {
        let req: RuleCheckRequest = serde_json::from_value(json!({
            "asset_id": "EST-001",
            "now": "yesterday",
            "lastMaintenance": "10/01/2024"
        }))
        .unwrap();

        let job = req.into_job(clock).unwrap();
        assert_eq!(job.now, clock());
        assert_eq!(job.last_maintenance, ParsedInstant::Malformed("10/01/2024".to_string()));
        assert!(job.rules.is_empty());
    }

    #[test]
    fn blank_asset_id_is_rejected() {
        let req: PredictiveCheckRequest =
            serde_json::from_value(json!({ "asset_id": "  ", "history": [] })).unwrap();
        assert!(matches!(req.into_job(clock), Err(DomainError::InvalidId(_))));
    }
}
