use chrono::{DateTime, Duration, Utc};
use tracing::{info, info_span};

use upkeep_core::Decision;

use crate::capability::ClassificationCapability;
use crate::job::{Evaluation, EvaluationKind};

/// How often each evaluation path should be re-run for an asset.
///
/// The engines are stateless; callers track `last_run` themselves and ask the
/// cadence whether it is time to evaluate again.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EvaluationCadence {
    rule_check: Duration,
    predictive_check: Duration,
}

impl Default for EvaluationCadence {
    fn default() -> Self {
        Self {
            rule_check: Duration::hours(24),
            predictive_check: Duration::days(3),
        }
    }
}

impl EvaluationCadence {
    pub fn new(rule_check: Duration, predictive_check: Duration) -> Self {
        Self {
            rule_check,
            predictive_check,
        }
    }

    pub fn from_secs(rule_check_secs: i64, predictive_check_secs: i64) -> Self {
        Self::new(
            Duration::seconds(rule_check_secs),
            Duration::seconds(predictive_check_secs),
        )
    }

    pub fn interval(&self, kind: EvaluationKind) -> Duration {
        match kind {
            EvaluationKind::RuleCheck => self.rule_check,
            EvaluationKind::PredictiveCheck => self.predictive_check,
        }
    }

    /// True when the path never ran or its interval has fully elapsed.
    pub fn is_due(
        &self,
        kind: EvaluationKind,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        match last_run {
            None => true,
            Some(last) => now - last >= self.interval(kind),
        }
    }

    /// Earliest instant the path should run again.
    pub fn next_run(
        &self,
        kind: EvaluationKind,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        match last_run {
            None => now,
            Some(last) => last + self.interval(kind),
        }
    }
}

/// Runs evaluations in-process against one capability.
#[derive(Debug, Clone)]
pub struct LocalEvaluator<C> {
    capability: C,
}

impl<C: ClassificationCapability> LocalEvaluator<C> {
    pub fn new(capability: C) -> Self {
        Self { capability }
    }

    pub fn run(&self, job: &dyn Evaluation) -> Decision {
        let span = info_span!(
            "evaluation",
            kind = job.kind().as_str(),
            asset_id = %job.asset_id(),
        );
        let _guard = span.enter();

        let decision = job.run(&self.capability);
        info!(
            should_create_event = decision.should_create_event,
            reason = decision.reason.map(|r| r.as_str()),
            "evaluation finished"
        );
        decision
    }
}
