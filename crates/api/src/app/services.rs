use tracing::{Span, info, warn};

use upkeep_ai::{
    ClassificationCapability, ClassificationError, Evaluation, EvaluationCadence, LocalEvaluator,
    ModelDescriptor, UnavailableClassifier,
};
use upkeep_core::Decision;
use upkeep_infra::ai::{ClassifierHandle, ClassifierWorker, HttpClassifier};

use crate::config::ServiceConfig;

/// Process-wide services shared by all handlers.
///
/// The classifier is constructed once at startup and only reached through its
/// worker handle, so handlers never touch the model concurrently.
#[derive(Debug, Clone)]
pub struct AppServices {
    classifier: ClassifierHandle,
    cadence: EvaluationCadence,
}

impl AppServices {
    pub fn new(classifier: ClassifierHandle, cadence: EvaluationCadence) -> Self {
        Self { classifier, cadence }
    }

    /// Wire services from config. Without a classifier endpoint the worker
    /// serves [`UnavailableClassifier`] and both engines degrade.
    pub fn from_config(config: &ServiceConfig) -> std::io::Result<Self> {
        let worker = config.worker();
        let classifier = match config.http_classifier() {
            Some(http) => {
                info!(
                    url = %http.classify_url,
                    table_qa = http.table_qa_url.is_some(),
                    "using HTTP classifier"
                );
                worker.spawn("classifier", move || HttpClassifier::new(http))?
            }
            None => {
                warn!(
                    "no classifier endpoint configured; \
                     predictive checks will report classification_unavailable"
                );
                worker.spawn("classifier", || Ok::<_, ClassificationError>(UnavailableClassifier))?
            }
        };
        Ok(Self::new(classifier, config.cadence))
    }

    /// Services around an arbitrary capability (tests, embedding).
    pub fn with_capability<F, C>(worker: &ClassifierWorker, factory: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> Result<C, ClassificationError> + Send + 'static,
        C: ClassificationCapability + 'static,
    {
        let classifier = worker.spawn("classifier", factory)?;
        Ok(Self::new(classifier, EvaluationCadence::default()))
    }

    pub fn cadence(&self) -> EvaluationCadence {
        self.cadence
    }

    pub fn model(&self) -> ModelDescriptor {
        self.classifier.descriptor()
    }

    /// Run an evaluation off the async runtime; the capability call may block
    /// for up to the classifier timeout.
    pub async fn evaluate<J>(&self, job: J) -> Result<Decision, tokio::task::JoinError>
    where
        J: Evaluation + 'static,
    {
        let evaluator = LocalEvaluator::new(self.classifier.clone());
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| evaluator.run(&job))).await
    }

    pub fn shutdown(&self) {
        self.classifier.shutdown();
    }
}
