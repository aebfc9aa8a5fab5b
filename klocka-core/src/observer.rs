//! Observer hooks for clock activity.
//!
//! The mock clock reports every mutation and every waiter entering or leaving
//! its registry. `klocka-telemetry` turns these into Prometheus metrics; tests
//! can plug in their own recorder.

use std::fmt;
use std::time::Duration;

/// Kind of state change applied to a mock clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Set,
    Add,
    Freeze,
    Unfreeze,
}

impl Mutation {
    pub const ALL: [Mutation; 4] = [
        Mutation::Set,
        Mutation::Add,
        Mutation::Freeze,
        Mutation::Unfreeze,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mutation::Set => "set",
            Mutation::Add => "add",
            Mutation::Freeze => "freeze",
            Mutation::Unfreeze => "unfreeze",
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives notifications from a mock clock.
///
/// Callbacks run on the thread that triggered them, after the clock lock has
/// been released. All methods default to no-ops.
pub trait ClockObserver: Send + Sync {
    /// A mutation was applied and is about to be broadcast to `waiters`
    /// registered waiters. Not called for a `freeze` on an already frozen clock.
    fn on_mutation(&self, _mutation: Mutation, _waiters: usize) {}

    /// A waiter joined the registry; `live` counts it.
    fn on_waiter_registered(&self, _live: usize) {}

    /// A waiter left the registry after blocking for `waited` of real time.
    fn on_waiter_released(&self, _live: usize, _waited: Duration) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ClockObserver for NoopObserver {}
