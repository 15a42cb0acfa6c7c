//! Risk evaluation from a text-classification signal.
//!
//! History and metadata are flattened into one text blob, classified, and the
//! label/confidence pair is mapped to a risk score and tier. There is no
//! feature extraction; the model sees the raw text.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use upkeep_core::{AssetId, Decision, Reason, RiskLevel, round3};

use crate::capability::ClassificationCapability;
use crate::job::{Evaluation, EvaluationKind};
use crate::result::ClassificationSignal;

/// Risk at or above which an event is recommended. Independent of the tier bounds.
pub const EVENT_THRESHOLD: f64 = 0.7;

/// Labels containing this marker (any case) denote the negative, high-risk class.
pub const NEGATIVE_MARKER: &str = "NEG";

pub const EXPLANATION: &str =
    "Risk estimated by text classification over maintenance history and asset metadata";

pub struct PredictiveEngine<'a> {
    classifier: &'a dyn ClassificationCapability,
}

impl<'a> PredictiveEngine<'a> {
    pub fn new(classifier: &'a dyn ClassificationCapability) -> Self {
        Self { classifier }
    }

    pub fn evaluate(
        &self,
        history: &[JsonValue],
        metadata: &Map<String, JsonValue>,
        now: DateTime<Utc>,
    ) -> Decision {
        let text = serialize_input(history, metadata);

        let classified = self
            .classifier
            .classify(&text)
            .and_then(ClassificationSignal::validate);
        let signal = match classified {
            Ok(s) => s,
            Err(e) => {
                warn!(
                    error = %e,
                    model = %self.classifier.descriptor().name,
                    "risk classification failed; returning degraded decision"
                );
                return Decision::declined(
                    Reason::ClassificationUnavailable,
                    format!("risk classification unavailable ({e}); no predictive decision made"),
                );
            }
        };

        let risk = risk_from_signal(&signal);
        let level = RiskLevel::from_score(risk);
        let should_create_event = risk >= EVENT_THRESHOLD;

        // The window only travels with a suggested date.
        let window = level.window_days().filter(|_| should_create_event);

        debug!(
            label = %signal.label,
            confidence = signal.confidence,
            risk,
            level = level.as_str(),
            should_create_event,
            "risk classified"
        );

        Decision {
            should_create_event,
            explanation: Some(EXPLANATION.to_string()),
            suggested_window_days: window,
            suggested_date: window.map(|days| now + Duration::days(days)),
            risk_score: Some(round3(risk)),
            confidence: Some(round3(signal.confidence.clamp(0.0, 1.0))),
            risk_level: Some(level),
            ..Decision::default()
        }
    }
}

/// Flatten history and metadata into the classifier input.
///
/// String items are written raw, everything else as compact JSON; items are
/// space-separated and followed by one space and the metadata object.
pub fn serialize_input(history: &[JsonValue], metadata: &Map<String, JsonValue>) -> String {
    let items: Vec<String> = history
        .iter()
        .map(|item| match item {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    let meta = JsonValue::Object(metadata.clone()).to_string();
    format!("{} {}", items.join(" "), meta)
}

/// Negative labels carry the risk directly; any other label is its complement.
/// The result is clamped to \[0, 1\].
pub fn risk_from_signal(signal: &ClassificationSignal) -> f64 {
    let negative = signal
        .label
        .to_ascii_uppercase()
        .contains(NEGATIVE_MARKER);

    let risk = if negative {
        signal.confidence
    } else {
        1.0 - signal.confidence
    };
    risk.clamp(0.0, 1.0)
}

/// Risk evaluation request for one asset.
#[derive(Debug, Clone)]
pub struct PredictiveCheck {
    pub asset_id: AssetId,
    pub history: Vec<JsonValue>,
    pub metadata: Map<String, JsonValue>,
    pub now: DateTime<Utc>,
}

impl Evaluation for PredictiveCheck {
    fn kind(&self) -> EvaluationKind {
        EvaluationKind::PredictiveCheck
    }

    fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    fn run(&self, capability: &dyn ClassificationCapability) -> Decision {
        PredictiveEngine::new(capability).evaluate(&self.history, &self.metadata, self.now)
    }
}
