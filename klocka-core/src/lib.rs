//! # klocka-core
//!
//! Controllable virtual clock for deterministic tests of time-dependent code.
//!
//! Code under test talks to a [`Clock`]. Production wiring hands it a
//! [`RealClock`]; tests hand it a [`MockClock`] they can freeze, set, or push
//! forward while sleepers blocked on the clock are woken as virtual time
//! catches up with them.
//!
//! ### Key Submodules:
//! - `time`: the `Clock` trait, the real passthrough and the mock clock with
//!   its waiter registry
//! - `observer`: hooks notified on clock mutations and waiter lifecycle
//!
//! ```
//! use chrono::TimeDelta;
//! use klocka_core::MockClock;
//!
//! let clock = MockClock::new();
//! clock.freeze();
//! let before = clock.now();
//! clock.add(TimeDelta::hours(1));
//! assert_eq!(clock.now() - before, TimeDelta::hours(1));
//! ```

pub mod observer;
pub mod time;

pub mod prelude {
    pub use crate::observer::*;
    pub use crate::time::*;
}

pub use observer::{ClockObserver, Mutation, NoopObserver};
pub use time::{Clock, MockClock, MockClockBuilder, RealClock};
