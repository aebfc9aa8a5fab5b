// klocka-simulator/src/lib.rs

/*!
# Klocka Simulator

Drives a [`MockClock`](klocka_core::MockClock) through a scripted scenario and
records what the clock looked like after every step.

## Key Components:
- **Scenario:** YAML list of clock mutations, expectations and sleepers.
- **Runner:** Executes steps in order, starting sleeper threads and waiting for them.
- **Timeline:** Per-step record with a BLAKE3 digest for comparing runs.
*/

use std::path::Path;

use tracing::info;

use klocka_config::KlockaConfig;
use klocka_telemetry::ClockLogger;

pub mod error;
pub mod runner;
pub mod scenario;

pub use error::ScenarioError;
pub use runner::{ScenarioRunner, Timeline, TimelineEntry};
pub use scenario::{Scenario, Step};

/// Loads the scenario at `path` and runs it with `config`.
///
/// Installs the global log subscriber at `config.telemetry.log_level` unless
/// one is already present.
pub fn run_file<P: AsRef<Path>>(path: P, config: &KlockaConfig) -> Result<Timeline, ScenarioError> {
    ClockLogger::init_with_level(&config.telemetry.log_level);

    let path = path.as_ref();
    let scenario = Scenario::load(path)?;
    info!(path = %path.display(), steps = scenario.steps.len(), "running scenario");

    let mut runner = ScenarioRunner::new(&scenario, config)?;
    let timeline = runner.run(&scenario)?;
    info!(digest = %timeline.digest(), "scenario digest");
    Ok(timeline)
}
