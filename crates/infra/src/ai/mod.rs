//! Classification capability adapters.
//!
//! Models are constructed once and served from a dedicated thread. Failures
//! surface as `ClassificationError`s; the engines turn them into degraded
//! decisions and never propagate them.

pub mod classifier_worker;
pub mod http_classifier;

pub use classifier_worker::{ClassifierHandle, ClassifierWorker};
pub use http_classifier::{HttpClassifier, HttpClassifierConfig};
