//! Scripted clock scenarios.
//!
//! ```yaml
//! clock:
//!   start: 2014-11-14T01:02:15Z
//!   frozen: true
//! steps:
//!   - spawn_sleeper: { name: poller, ms: 10000 }
//!   - add_ms: 10000
//!   - await_sleeper: { name: poller }
//!   - expect_now: 2014-11-14T01:02:25Z
//! ```

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use klocka_config::ClockConfig;

use crate::error::ScenarioError;

/// A clock setup plus the steps to run against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Overrides the configured clock settings when present.
    #[serde(default)]
    pub clock: Option<ClockConfig>,
    /// Written as `- add_ms: 10000` or `- freeze`.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

/// One scenario instruction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Jump virtual time.
    Set(DateTime<Utc>),
    /// Move virtual time by a signed number of milliseconds.
    AddMs(i64),
    Freeze,
    Unfreeze,
    /// Let real time pass.
    PauseMs(u64),
    ExpectFrozen(bool),
    /// Exact comparison; only meaningful while frozen.
    ExpectNow(DateTime<Utc>),
    /// Start a thread that sleeps `ms` of virtual time.
    SpawnSleeper { name: String, ms: i64 },
    /// Wait, in real time, for a sleeper to wake up.
    AwaitSleeper {
        name: String,
        #[serde(default)]
        within_ms: Option<u64>,
    },
}

impl Step {
    /// Short label used in timelines and logs.
    pub fn label(&self) -> String {
        match self {
            Step::Set(t) => format!("set {}", t.to_rfc3339()),
            Step::AddMs(ms) => format!("add {ms}ms"),
            Step::Freeze => "freeze".into(),
            Step::Unfreeze => "unfreeze".into(),
            Step::PauseMs(ms) => format!("pause {ms}ms"),
            Step::ExpectFrozen(frozen) => format!("expect frozen={frozen}"),
            Step::ExpectNow(t) => format!("expect now={}", t.to_rfc3339()),
            Step::SpawnSleeper { name, ms } => format!("spawn {name} for {ms}ms"),
            Step::AwaitSleeper { name, .. } => format!("await {name}"),
        }
    }
}

impl Scenario {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        scenario.check()?;
        Ok(scenario)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        Self::from_yaml_str(&std::fs::read_to_string(path)?)
    }

    fn check(&self) -> Result<(), ScenarioError> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Step::SpawnSleeper { name, .. } | Step::AwaitSleeper { name, .. } = step {
                if name.trim().is_empty() {
                    return Err(ScenarioError::Invalid(format!(
                        "step {index}: sleeper name must not be empty"
                    )));
                }
            }
            if let Step::AddMs(ms) | Step::SpawnSleeper { ms, .. } = step {
                millis(index, *ms)?;
            }
        }
        Ok(())
    }
}

/// Converts a step's millisecond count, rejecting values `TimeDelta` cannot hold.
pub(crate) fn millis(index: usize, ms: i64) -> Result<TimeDelta, ScenarioError> {
    TimeDelta::try_milliseconds(ms).ok_or_else(|| {
        ScenarioError::Invalid(format!("step {index}: {ms}ms is out of range"))
    })
}
