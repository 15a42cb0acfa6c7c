//! `upkeep-core`: maintenance decision building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no model access):
//! timestamp normalization, frequency conversion and the decision model.

pub mod date;
pub mod decision;
pub mod error;
pub mod frequency;
pub mod id;
pub mod proposal;

pub use date::{ParsedInstant, elapsed_days, parse_instant, resolve_now};
pub use decision::{Decision, Reason, RiskLevel, round3};
pub use error::{DomainError, DomainResult};
pub use frequency::{FrequencyUnit, to_days};
pub use id::{AssetId, EvaluationId, RuleId};
pub use proposal::{EventProposal, EventSource};
