//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of the asset under evaluation.
///
/// Owned by the calling backend; treated as an opaque, non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

/// Identifier of a maintenance rule, unique within one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

/// Identifier of a single evaluation (request correlation only, never persisted).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(Uuid);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{} cannot be empty", $name)));
                }
                Ok(Self(s.to_string()))
            }
        }
    };
}

impl_string_newtype!(AssetId, "asset_id");
impl_string_newtype!(RuleId, "rule_id");

impl EvaluationId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered) so log lines sort by arrival.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EvaluationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Accepts any UUID so callers can supply their own correlation id.
impl FromStr for EvaluationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("evaluation id: {e}")))
    }
}

impl core::fmt::Display for EvaluationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_kept_as_given() {
        let id: RuleId = "  R_TRIM ".parse().unwrap();
        assert_eq!(id.as_str(), "  R_TRIM ");
        assert_eq!(id.to_string(), "  R_TRIM ");
    }

    #[test]
    fn empty_ids_are_rejected() {
        let err = "   ".parse::<AssetId>().unwrap_err();
        assert_eq!(err, DomainError::invalid_id("asset_id cannot be empty"));
        assert!(matches!("\t".parse::<RuleId>(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn evaluation_ids_are_v7() {
        let id = EvaluationId::new();
        assert_eq!(id.as_uuid().get_version_num(), 7);
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn evaluation_ids_parse_from_text() {
        let id = EvaluationId::new();
        assert_eq!(id.to_string().parse::<EvaluationId>().unwrap(), id);
        assert!("not-a-uuid".parse::<EvaluationId>().is_err());
    }
}
