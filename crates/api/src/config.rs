//! Service configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use upkeep_ai::EvaluationCadence;
use upkeep_infra::ai::{ClassifierWorker, HttpClassifierConfig};

pub const BIND_ADDR: &str = "UPKEEP_BIND_ADDR";
pub const CLASSIFIER_URL: &str = "UPKEEP_CLASSIFIER_URL";
pub const TABLE_QA_URL: &str = "UPKEEP_TABLE_QA_URL";
pub const CLASSIFIER_TOKEN: &str = "UPKEEP_CLASSIFIER_TOKEN";
pub const CLASSIFIER_TIMEOUT_MS: &str = "UPKEEP_CLASSIFIER_TIMEOUT_MS";
pub const CLASSIFIER_QUEUE: &str = "UPKEEP_CLASSIFIER_QUEUE";
pub const RULE_CHECK_INTERVAL_SECS: &str = "UPKEEP_RULE_CHECK_INTERVAL_SECS";
pub const PREDICTIVE_CHECK_INTERVAL_SECS: &str = "UPKEEP_PREDICTIVE_CHECK_INTERVAL_SECS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    /// Without a classifier URL both engines run their degraded paths.
    pub classifier_url: Option<String>,
    pub table_qa_url: Option<String>,
    pub classifier_token: Option<String>,
    pub classifier_timeout: Duration,
    pub classifier_queue: usize,
    pub cadence: EvaluationCadence,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            classifier_url: None,
            table_qa_url: None,
            classifier_token: None,
            classifier_timeout: Duration::from_millis(5000),
            classifier_queue: 32,
            cadence: EvaluationCadence::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let bind_addr = parse_or(
            get(BIND_ADDR),
            BIND_ADDR,
            "a socket address",
            defaults.bind_addr,
        )?;
        let timeout_ms: u64 = parse_or(
            get(CLASSIFIER_TIMEOUT_MS),
            CLASSIFIER_TIMEOUT_MS,
            "a number of milliseconds",
            defaults.classifier_timeout.as_millis() as u64,
        )?;
        let classifier_queue = parse_or(
            get(CLASSIFIER_QUEUE),
            CLASSIFIER_QUEUE,
            "a queue length",
            defaults.classifier_queue,
        )?;

        let default_rule = defaults.cadence.interval(upkeep_ai::EvaluationKind::RuleCheck);
        let default_predictive = defaults
            .cadence
            .interval(upkeep_ai::EvaluationKind::PredictiveCheck);
        let rule_secs: u32 = parse_or(
            get(RULE_CHECK_INTERVAL_SECS),
            RULE_CHECK_INTERVAL_SECS,
            "a number of seconds",
            default_rule.num_seconds() as u32,
        )?;
        let predictive_secs: u32 = parse_or(
            get(PREDICTIVE_CHECK_INTERVAL_SECS),
            PREDICTIVE_CHECK_INTERVAL_SECS,
            "a number of seconds",
            default_predictive.num_seconds() as u32,
        )?;

        Ok(Self {
            bind_addr,
            classifier_url: get(CLASSIFIER_URL),
            table_qa_url: get(TABLE_QA_URL),
            classifier_token: get(CLASSIFIER_TOKEN),
            classifier_timeout: Duration::from_millis(timeout_ms),
            classifier_queue,
            cadence: EvaluationCadence::from_secs(rule_secs.into(), predictive_secs.into()),
        })
    }

    pub fn worker(&self) -> ClassifierWorker {
        ClassifierWorker {
            timeout: self.classifier_timeout,
            queue_capacity: self.classifier_queue,
        }
    }

    /// HTTP inference settings, if a classifier endpoint is configured.
    pub fn http_classifier(&self) -> Option<HttpClassifierConfig> {
        let url = self.classifier_url.clone()?;
        Some(HttpClassifierConfig {
            classify_url: url,
            table_qa_url: self.table_qa_url.clone(),
            token: self.classifier_token.clone(),
            timeout: self.classifier_timeout,
        })
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        }),
    }
}
