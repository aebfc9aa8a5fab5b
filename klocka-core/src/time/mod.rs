//! ## klocka-core::time
//! **Clock abstraction, real passthrough and controllable mock**
//!
//! ### Components:
//! - `real`: [`RealClock`], a thin wrapper over the system time source
//! - `mock`: [`MockClock`], virtual time that can be frozen, set and advanced
//! - `waiter`: pending sleeps and the registry the mock clock wakes on change
//!
//! Durations are signed [`TimeDelta`]s. A negative duration is already
//! elapsed: sleeping on it returns immediately.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::Receiver;

mod mock;
mod real;
mod waiter;

pub use mock::{MockClock, MockClockBuilder};
pub use real::RealClock;

/// Time source consumed by code under test.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;

    /// Blocks the calling thread until `duration` has passed on this clock.
    fn sleep(&self, duration: TimeDelta);

    /// Yields the clock's time once, after `duration` has passed.
    fn after(&self, duration: TimeDelta) -> Receiver<DateTime<Utc>>;

    /// Yields the clock's time every `interval`. The stream never ends on its
    /// own; a consumer that stops reading leaves the producer parked until
    /// the next delivery fails.
    fn tick(&self, interval: TimeDelta) -> Receiver<DateTime<Utc>>;

    /// Real-time ticker. Never virtualized, even on a mock clock.
    fn ticker(&self, period: Duration) -> Receiver<Instant> {
        crossbeam::channel::tick(period)
    }
}

/// Moves `t` by `delta`, pinning to the representable range instead of
/// overflowing.
pub(crate) fn shift(t: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    t.checked_add_signed(delta).unwrap_or(if delta < TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Converts a real elapsed duration into a signed delta, saturating.
pub(crate) fn to_delta(elapsed: Duration) -> TimeDelta {
    TimeDelta::from_std(elapsed).unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_saturates() {
        let late = DateTime::<Utc>::MAX_UTC - TimeDelta::seconds(1);
        assert_eq!(shift(late, TimeDelta::days(1)), DateTime::<Utc>::MAX_UTC);

        let early = DateTime::<Utc>::MIN_UTC + TimeDelta::seconds(1);
        assert_eq!(shift(early, -TimeDelta::days(1)), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn shift_moves_both_ways() {
        let t = DateTime::from_timestamp(1_415_926_535, 0).unwrap();
        assert_eq!(shift(t, TimeDelta::seconds(5)).timestamp(), 1_415_926_540);
        assert_eq!(shift(t, TimeDelta::seconds(-5)).timestamp(), 1_415_926_530);
    }

    #[test]
    fn to_delta_saturates_on_huge_durations() {
        assert_eq!(to_delta(Duration::from_millis(1500)), TimeDelta::milliseconds(1500));
        assert_eq!(to_delta(Duration::MAX), TimeDelta::MAX);
    }
}
