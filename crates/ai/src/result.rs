use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label/confidence pair produced by the text classifier.
///
/// Consumed once per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSignal {
    pub label: String,

    /// Expected in \[0, 1\]; out-of-range values are clamped by the consumer.
    pub confidence: f64,
}

impl ClassificationSignal {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Reject signals a risk score cannot be derived from.
    pub fn validate(self) -> Result<Self, ClassificationError> {
        if !self.confidence.is_finite() {
            return Err(ClassificationError::InvalidSignal(format!(
                "confidence must be finite, got {}",
                self.confidence
            )));
        }
        Ok(self)
    }
}

/// Answer string produced by a table question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAnswer {
    pub answer: String,
}

impl TableAnswer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

/// Model identity for audit/debug logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub revision: Option<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("classification capability unavailable: {0}")]
    Unavailable(String),

    #[error("classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("classification queue is full")]
    Busy,

    #[error("not supported by this capability: {0}")]
    Unsupported(&'static str),

    #[error("invalid classification signal: {0}")]
    InvalidSignal(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl ClassificationError {
    /// Errors that are part of normal operation (nothing configured, or an
    /// operation the model does not offer) rather than a malfunction.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ClassificationError::Unavailable(_) | ClassificationError::Unsupported(_)
        )
    }
}
