use chrono::{DateTime, Utc};
use thiserror::Error;

use klocka_config::ConfigError;
use klocka_telemetry::MetricsError;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scenario parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid scenario: {0}")]
    Invalid(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Step {step}: sleeper '{name}' is already running")]
    DuplicateSleeper { step: usize, name: String },

    #[error("Step {step}: no sleeper named '{name}'")]
    UnknownSleeper { step: usize, name: String },

    #[error("Step {step}: sleeper '{name}' still blocked after {within_ms}ms")]
    SleeperTimedOut {
        step: usize,
        name: String,
        within_ms: u64,
    },

    #[error("Step {step}: expected clock at {expected}, found {actual}")]
    UnexpectedTime {
        step: usize,
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },

    #[error("Step {step}: expected frozen={expected}, found frozen={actual}")]
    UnexpectedFrozen {
        step: usize,
        expected: bool,
        actual: bool,
    },
}
