//! System time passthrough.

use std::thread;

use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::{self, Receiver};

use super::Clock;

/// [`Clock`] backed by the system wall clock and real sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl Clock for RealClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: TimeDelta) {
        if let Ok(duration) = duration.to_std() {
            thread::sleep(duration);
        }
    }

    fn after(&self, duration: TimeDelta) -> Receiver<DateTime<Utc>> {
        let (tx, rx) = channel::bounded(1);
        thread::spawn(move || {
            RealClock.sleep(duration);
            let _ = tx.send(Utc::now());
        });
        rx
    }

    /// A non-positive interval yields a receiver that never fires.
    fn tick(&self, interval: TimeDelta) -> Receiver<DateTime<Utc>> {
        let Ok(period) = interval.to_std() else {
            return channel::never();
        };
        if period.is_zero() {
            return channel::never();
        }

        let (tx, rx) = channel::bounded(0);
        thread::spawn(move || loop {
            thread::sleep(period);
            if tx.send(Utc::now()).is_err() {
                break;
            }
        });
        rx
    }
}
