//! `upkeep-ai`
//!
//! **Responsibility:** the two decision engines and the boundary to the
//! classification models they consult.
//!
//! - The rule engine is deterministic; a model may only corroborate its result.
//! - The predictive engine derives risk from a label/confidence signal and
//!   degrades to a declined decision when no signal is available.
//! - Nothing here persists state or schedules events.

pub mod capability;
pub mod job;
pub mod predictive;
pub mod result;
pub mod rule;
pub mod rule_engine;
pub mod scheduler;

pub use capability::{ClassificationCapability, RuleTable, UnavailableClassifier};
pub use job::{Evaluation, EvaluationKind};
pub use predictive::{PredictiveCheck, PredictiveEngine};
pub use result::{ClassificationError, ClassificationSignal, ModelDescriptor, TableAnswer};
pub use rule::{Frequency, Rule};
pub use rule_engine::{DueState, RuleCheck, RuleEngine};
pub use scheduler::{EvaluationCadence, LocalEvaluator};
