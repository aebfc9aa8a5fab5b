//! Defaults for the scenario driver.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ScenarioConfig {
    /// Real-time bound for awaiting a sleeper when a step does not give one.
    #[validate(range(min = 1, max = 600_000))]
    #[serde(default = "default_await_timeout_ms")]
    pub await_timeout_ms: u64,
}

fn default_await_timeout_ms() -> u64 {
    5_000
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            await_timeout_ms: default_await_timeout_ms(),
        }
    }
}
