//! Pending sleeps on a mock clock.
//!
//! Every `sleep`, `after` and `tick` call registers a [`Waiter`] with the
//! clock. Mutations broadcast a [`Wakeup`] to all registered waiters; each one
//! re-reads virtual time and either fires or blocks again. While unfrozen a
//! waiter also races a real-time deadline, so ordinary elapsed time releases it
//! just like a real sleep would.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Condvar, Mutex};
use tracing::trace;

use super::mock::{Registration, Shared};
use super::shift;

pub(crate) type WaiterId = u64;

/// Notification broadcast to waiters after a clock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wakeup {
    /// Broadcast sequence number, strictly increasing per clock.
    pub seq: u64,
    /// Whether the clock was frozen when the broadcast was issued.
    pub frozen: bool,
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<Wakeup>,
    newest: u64,
}

/// Single-slot wake channel owned by one waiter.
///
/// Broadcasts are delivered outside the clock lock, so two of them can land
/// out of order. The slot only ever moves forward: an unread wakeup is
/// replaced by a newer one and anything older than what was last accepted is
/// dropped.
#[derive(Debug, Default)]
pub(crate) struct WakeSignal {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl WakeSignal {
    pub(crate) fn post(&self, wakeup: Wakeup) {
        let mut slot = self.slot.lock();
        if wakeup.seq <= slot.newest {
            return;
        }
        slot.newest = wakeup.seq;
        slot.pending = Some(wakeup);
        drop(slot);
        self.ready.notify_one();
    }

    /// Blocks until a wakeup is available.
    pub(crate) fn wait(&self) -> Wakeup {
        let mut slot = self.slot.lock();
        loop {
            if let Some(wakeup) = slot.pending.take() {
                return wakeup;
            }
            self.ready.wait(&mut slot);
        }
    }

    /// Blocks until a wakeup is available or `timeout` passes.
    ///
    /// A wakeup that is pending when the deadline expires is still returned.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<Wakeup> {
        let deadline = Instant::now().checked_add(timeout);
        let mut slot = self.slot.lock();
        loop {
            if let Some(wakeup) = slot.pending.take() {
                return Some(wakeup);
            }
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut slot, deadline).timed_out() {
                        return slot.pending.take();
                    }
                }
                None => self.ready.wait(&mut slot),
            }
        }
    }
}

/// Live waiters of one clock, in registration order.
#[derive(Debug, Default)]
pub(crate) struct WaiterRegistry {
    next_id: WaiterId,
    entries: BTreeMap<WaiterId, Arc<WakeSignal>>,
}

impl WaiterRegistry {
    pub(crate) fn insert(&mut self, signal: Arc<WakeSignal>) -> WaiterId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, signal);
        id
    }

    pub(crate) fn remove(&mut self, id: WaiterId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Handles of every registered waiter, so they can be signalled after the
    /// clock lock is released.
    pub(crate) fn snapshot(&self) -> Vec<Arc<WakeSignal>> {
        self.entries.values().cloned().collect()
    }
}

/// One pending "wake me once virtual time has moved by `duration`" request.
///
/// Registered on construction, removed from the registry on drop.
pub(crate) struct Waiter {
    clock: Arc<Shared>,
    id: WaiterId,
    signal: Arc<WakeSignal>,
    duration: TimeDelta,
    target: DateTime<Utc>,
    frozen: bool,
    registered_at: Instant,
}

impl Waiter {
    pub(crate) fn register(clock: &Arc<Shared>, duration: TimeDelta) -> Self {
        let signal = Arc::new(WakeSignal::default());
        let registration = clock.register(Arc::clone(&signal), duration);
        Self {
            clock: Arc::clone(clock),
            id: registration.id,
            signal,
            duration,
            target: registration.target,
            frozen: registration.frozen,
            registered_at: Instant::now(),
        }
    }

    /// Moves the target one more `duration` past the current virtual time.
    /// The frozen state seen so far is kept.
    pub(crate) fn rearm(&mut self) {
        self.target = shift(self.clock.now(), self.duration);
    }

    /// Blocks until virtual time reaches the target.
    pub(crate) fn sleep(&mut self) {
        loop {
            let remaining = self.target.signed_duration_since(self.clock.now());
            if remaining <= TimeDelta::zero() {
                break;
            }

            let wakeup = if self.frozen {
                Some(self.signal.wait())
            } else {
                // `remaining` is positive here, so the conversion cannot fail.
                self.signal.wait_timeout(remaining.to_std().unwrap_or_default())
            };

            match wakeup {
                Some(wakeup) => {
                    trace!(
                        waiter = self.id,
                        seq = wakeup.seq,
                        frozen = wakeup.frozen,
                        "waiter woken"
                    );
                    self.frozen = wakeup.frozen;
                }
                None => break,
            }
        }
        trace!(waiter = self.id, "waiter fired");
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        self.clock.deregister(self.id, self.registered_at.elapsed());
    }
}
