use serde::{Deserialize, Serialize};

use upkeep_core::{AssetId, Decision};

use crate::capability::ClassificationCapability;

/// Which evaluation path a job belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    RuleCheck,
    PredictiveCheck,
}

impl EvaluationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationKind::RuleCheck => "rule_check",
            EvaluationKind::PredictiveCheck => "predictive_check",
        }
    }
}

/// A request-scoped evaluation for one asset.
///
/// Jobs carry their full input; running one has no side effects beyond
/// logging and the capability calls it makes. Both paths are independent and
/// never call each other.
pub trait Evaluation: Send + Sync {
    fn kind(&self) -> EvaluationKind;

    /// The asset this evaluation is about.
    fn asset_id(&self) -> &AssetId;

    /// Produce a decision. Never fails: incomplete input and capability
    /// failures degrade to `shouldCreateEvent: false`.
    fn run(&self, capability: &dyn ClassificationCapability) -> Decision;
}
