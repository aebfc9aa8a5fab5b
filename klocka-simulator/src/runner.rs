//! Executes a [`Scenario`] against a mock clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use blake3::Hasher;
use chrono::{DateTime, Utc};
use crossbeam::channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, instrument};

use klocka_config::KlockaConfig;
use klocka_core::MockClock;
use klocka_telemetry::MetricsRecorder;

use crate::error::ScenarioError;
use crate::scenario::{millis, Scenario, Step};

/// Clock state observed right after a step ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub step: usize,
    pub label: String,
    pub now: DateTime<Utc>,
    pub frozen: bool,
    /// Virtual time a sleeper reported on waking, for `await_sleeper` steps.
    pub woke_at: Option<DateTime<Utc>>,
}

/// Everything a scenario run observed.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// BLAKE3 digest of the timeline, hex encoded. Frozen scenarios produce
    /// the same digest on every run.
    pub fn digest(&self) -> String {
        let mut hasher = Hasher::new();
        for entry in &self.entries {
            hasher.update(&entry.step.to_le_bytes());
            hasher.update(entry.label.as_bytes());
            hasher.update(entry.now.to_rfc3339().as_bytes());
            hasher.update(&[entry.frozen as u8]);
            if let Some(woke_at) = entry.woke_at {
                hasher.update(woke_at.to_rfc3339().as_bytes());
            }
        }
        hex::encode(hasher.finalize().as_bytes())
    }
}

/// Runs scenario steps in order on one [`MockClock`].
pub struct ScenarioRunner {
    clock: MockClock,
    await_timeout: Duration,
    metrics: Option<Arc<MetricsRecorder>>,
    sleepers: HashMap<String, Receiver<DateTime<Utc>>>,
}

impl ScenarioRunner {
    /// Builds the clock from the scenario's `clock` section, falling back to
    /// `config.clock`.
    pub fn new(scenario: &Scenario, config: &KlockaConfig) -> Result<Self, ScenarioError> {
        let clock_config = scenario.clock.as_ref().unwrap_or(&config.clock);
        let mut builder = clock_config.builder();

        let metrics = if config.telemetry.metrics_enabled {
            let recorder = Arc::new(MetricsRecorder::new()?);
            builder = builder.observer(recorder.clone());
            Some(recorder)
        } else {
            None
        };

        Ok(Self {
            clock: builder.build(),
            await_timeout: Duration::from_millis(config.scenario.await_timeout_ms),
            metrics,
            sleepers: HashMap::new(),
        })
    }

    /// Handle to the clock the scenario drives.
    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    pub fn metrics(&self) -> Option<&MetricsRecorder> {
        self.metrics.as_deref()
    }

    /// Runs every step, stopping at the first failure.
    #[instrument(skip_all, fields(steps = scenario.steps.len()))]
    pub fn run(&mut self, scenario: &Scenario) -> Result<Timeline, ScenarioError> {
        let mut timeline = Timeline::default();
        for (index, step) in scenario.steps.iter().enumerate() {
            let woke_at = self.apply(index, step)?;
            let entry = TimelineEntry {
                step: index,
                label: step.label(),
                now: self.clock.now(),
                frozen: self.clock.is_frozen(),
                woke_at,
            };
            debug!(step = index, label = %entry.label, now = %entry.now, "step done");
            timeline.entries.push(entry);
        }
        info!(steps = timeline.entries.len(), "scenario complete");
        Ok(timeline)
    }

    fn apply(&mut self, index: usize, step: &Step) -> Result<Option<DateTime<Utc>>, ScenarioError> {
        match step {
            Step::Set(t) => {
                self.clock.set(*t);
            }
            Step::AddMs(ms) => {
                self.clock.add(millis(index, *ms)?);
            }
            Step::Freeze => {
                self.clock.freeze();
            }
            Step::Unfreeze => {
                self.clock.unfreeze();
            }
            Step::PauseMs(ms) => thread::sleep(Duration::from_millis(*ms)),
            Step::ExpectFrozen(expected) => {
                let actual = self.clock.is_frozen();
                if actual != *expected {
                    return Err(ScenarioError::UnexpectedFrozen {
                        step: index,
                        expected: *expected,
                        actual,
                    });
                }
            }
            Step::ExpectNow(expected) => {
                let actual = self.clock.now();
                if actual != *expected {
                    return Err(ScenarioError::UnexpectedTime {
                        step: index,
                        expected: *expected,
                        actual,
                    });
                }
            }
            Step::SpawnSleeper { name, ms } => self.spawn_sleeper(index, name, *ms)?,
            Step::AwaitSleeper { name, within_ms } => {
                return self.await_sleeper(index, name, *within_ms).map(Some);
            }
        }
        Ok(None)
    }

    fn spawn_sleeper(&mut self, index: usize, name: &str, ms: i64) -> Result<(), ScenarioError> {
        if self.sleepers.contains_key(name) {
            return Err(ScenarioError::DuplicateSleeper {
                step: index,
                name: name.to_string(),
            });
        }

        // Registered before `after` returns, so the next step's mutation is seen.
        let rx = self.clock.after(millis(index, ms)?);
        debug!(step = index, name, ms, "sleeper started");
        self.sleepers.insert(name.to_string(), rx);
        Ok(())
    }

    fn await_sleeper(
        &mut self,
        index: usize,
        name: &str,
        within_ms: Option<u64>,
    ) -> Result<DateTime<Utc>, ScenarioError> {
        let rx = self
            .sleepers
            .remove(name)
            .ok_or_else(|| ScenarioError::UnknownSleeper {
                step: index,
                name: name.to_string(),
            })?;

        let within = within_ms
            .map(Duration::from_millis)
            .unwrap_or(self.await_timeout);
        match rx.recv_timeout(within) {
            Ok(woke_at) => Ok(woke_at),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                Err(ScenarioError::SleeperTimedOut {
                    step: index,
                    name: name.to_string(),
                    within_ms: within.as_millis() as u64,
                })
            }
        }
    }
}
