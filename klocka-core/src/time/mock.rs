//! Controllable virtual clock.
//!
//! Virtual time is `base` plus whatever real time has elapsed since `last`,
//! unless the clock is frozen. Reading the clock folds the elapsed real time
//! into `base`; `set`, `add`, `freeze` and `unfreeze` rewrite the fields and
//! broadcast a wakeup so blocked sleepers can re-check their targets.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::waiter::{WaiterId, WaiterRegistry, WakeSignal, Waiter, Wakeup};
use super::{shift, to_delta, Clock};
use crate::observer::{ClockObserver, Mutation, NoopObserver};

struct ClockState {
    base: DateTime<Utc>,
    last: Instant,
    frozen: bool,
    seq: u64,
    waiters: WaiterRegistry,
}

impl ClockState {
    /// Folds real time elapsed since the last sample into `base`.
    fn advance(&mut self) {
        if self.frozen {
            return;
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        self.base = shift(self.base, to_delta(elapsed));
    }

    fn broadcast(&mut self) -> Broadcast {
        self.seq += 1;
        Broadcast {
            wakeup: Wakeup {
                seq: self.seq,
                frozen: self.frozen,
            },
            targets: self.waiters.snapshot(),
        }
    }
}

/// Wakeup captured under the clock lock, delivered after it is released.
struct Broadcast {
    wakeup: Wakeup,
    targets: Vec<Arc<WakeSignal>>,
}

impl Broadcast {
    fn deliver(self) {
        for target in &self.targets {
            target.post(self.wakeup);
        }
    }
}

/// Outcome of adding a waiter to the registry.
pub(crate) struct Registration {
    pub id: WaiterId,
    pub target: DateTime<Utc>,
    pub frozen: bool,
}

/// State shared between a clock handle and its waiters.
pub(crate) struct Shared {
    state: Mutex<ClockState>,
    observer: Arc<dyn ClockObserver>,
}

impl Shared {
    pub(crate) fn now(&self) -> DateTime<Utc> {
        let mut state = self.state.lock();
        state.advance();
        state.base
    }

    /// Adds `signal` to the registry and fixes the waiter's target relative to
    /// the virtual time of registration.
    pub(crate) fn register(&self, signal: Arc<WakeSignal>, duration: TimeDelta) -> Registration {
        let (registration, live) = {
            let mut state = self.state.lock();
            state.advance();
            let registration = Registration {
                id: state.waiters.insert(signal),
                target: shift(state.base, duration),
                frozen: state.frozen,
            };
            (registration, state.waiters.len())
        };
        trace!(
            waiter = registration.id,
            target = %registration.target,
            frozen = registration.frozen,
            live,
            "waiter registered"
        );
        self.observer.on_waiter_registered(live);
        registration
    }

    pub(crate) fn deregister(&self, id: WaiterId, waited: Duration) {
        let live = {
            let mut state = self.state.lock();
            state.waiters.remove(id);
            state.waiters.len()
        };
        trace!(waiter = id, live, ?waited, "waiter released");
        self.observer.on_waiter_released(live, waited);
    }

    fn mutate(&self, mutation: Mutation, apply: impl FnOnce(&mut ClockState) -> bool) {
        let (broadcast, base, frozen) = {
            let mut state = self.state.lock();
            if !apply(&mut state) {
                return;
            }
            (state.broadcast(), state.base, state.frozen)
        };
        debug!(
            %mutation,
            %base,
            frozen,
            waiters = broadcast.targets.len(),
            "clock mutated"
        );
        self.observer.on_mutation(mutation, broadcast.targets.len());
        broadcast.deliver();
    }
}

/// Manipulable [`Clock`] for tests.
///
/// Handles are cheap to clone and all refer to the same virtual time. Code
/// under test sees an ordinary clock; the test drives it through [`set`],
/// [`add`], [`freeze`] and [`unfreeze`].
///
/// [`set`]: MockClock::set
/// [`add`]: MockClock::add
/// [`freeze`]: MockClock::freeze
/// [`unfreeze`]: MockClock::unfreeze
#[derive(Clone)]
pub struct MockClock {
    shared: Arc<Shared>,
}

impl MockClock {
    /// Unfrozen clock starting at the current real time.
    pub fn new() -> Self {
        MockClockBuilder::default().build()
    }

    pub fn builder() -> MockClockBuilder {
        MockClockBuilder::default()
    }

    /// Current virtual time. Unless frozen, real time elapsed since the
    /// previous read is folded in first.
    pub fn now(&self) -> DateTime<Utc> {
        self.shared.now()
    }

    /// Jumps virtual time to `t`. Real time keeps flowing from here unless the
    /// clock is frozen.
    pub fn set(&self, t: DateTime<Utc>) -> &Self {
        self.shared.mutate(Mutation::Set, |state| {
            state.base = t;
            state.last = Instant::now();
            true
        });
        self
    }

    /// Moves virtual time by `delta`, which may be negative.
    pub fn add(&self, delta: TimeDelta) -> &Self {
        self.shared.mutate(Mutation::Add, |state| {
            state.base = shift(state.base, delta);
            true
        });
        self
    }

    /// Stops virtual time from following real time. No-op if already frozen.
    pub fn freeze(&self) -> &Self {
        self.shared.mutate(Mutation::Freeze, |state| {
            if state.frozen {
                return false;
            }
            state.advance();
            state.frozen = true;
            true
        });
        self
    }

    /// Lets virtual time follow real time again, starting from the frozen
    /// value. Real time spent frozen is not caught up.
    pub fn unfreeze(&self) -> &Self {
        self.shared.mutate(Mutation::Unfreeze, |state| {
            state.frozen = false;
            state.last = Instant::now();
            true
        });
        self
    }

    pub fn is_frozen(&self) -> bool {
        self.shared.state.lock().frozen
    }

    /// Blocks until virtual time has moved forward by `duration`.
    ///
    /// While frozen only a mutation can release the caller; otherwise real
    /// time elapsing works too. There is no way to cancel the sleep.
    pub fn sleep(&self, duration: TimeDelta) {
        Waiter::register(&self.shared, duration).sleep();
    }

    /// Receiver that yields the virtual time once `duration` has passed.
    ///
    /// The waiter is registered before this returns, so mutations made right
    /// after the call are observed.
    pub fn after(&self, duration: TimeDelta) -> Receiver<DateTime<Utc>> {
        let mut waiter = Waiter::register(&self.shared, duration);
        let shared = Arc::clone(&self.shared);
        let (tx, rx) = channel::bounded(1);
        thread::spawn(move || {
            waiter.sleep();
            drop(waiter);
            let _ = tx.send(shared.now());
        });
        rx
    }

    /// Receiver that yields the virtual time every `interval`.
    ///
    /// Each value is handed over synchronously and the next interval starts
    /// once the consumer has taken it, so a slow consumer stretches the
    /// period. The producer thread stops only when a delivery finds the
    /// receiver gone.
    pub fn tick(&self, interval: TimeDelta) -> Receiver<DateTime<Utc>> {
        let mut waiter = Waiter::register(&self.shared, interval);
        let shared = Arc::clone(&self.shared);
        let (tx, rx) = channel::bounded(0);
        thread::spawn(move || loop {
            waiter.sleep();
            if tx.send(shared.now()).is_err() {
                trace!("tick receiver dropped");
                break;
            }
            waiter.rearm();
        });
        rx
    }

    /// Future that completes once virtual time has moved forward by
    /// `duration`. The blocking wait runs on Tokio's blocking pool.
    ///
    /// The waiter is registered immediately, before the future is polled.
    #[cfg(feature = "async")]
    pub fn sleep_async(
        &self,
        duration: TimeDelta,
    ) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut waiter = Waiter::register(&self.shared, duration);
        async move {
            if let Err(err) = tokio::task::spawn_blocking(move || waiter.sleep()).await {
                if err.is_panic() {
                    std::panic::resume_unwind(err.into_panic());
                }
                tracing::warn!("virtual sleep abandoned: {err}");
            }
        }
    }

    /// Virtual time elapsed since `earlier`.
    pub fn since(&self, earlier: DateTime<Utc>) -> TimeDelta {
        self.now().signed_duration_since(earlier)
    }

    /// Virtual time left until `later`; negative once it has passed.
    pub fn until(&self, later: DateTime<Utc>) -> TimeDelta {
        later.signed_duration_since(self.now())
    }

    /// Number of sleeps, `after` and `tick` calls currently waiting.
    pub fn waiter_count(&self) -> usize {
        self.shared.state.lock().waiters.len()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("MockClock")
            .field("base", &state.base)
            .field("frozen", &state.frozen)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        MockClock::now(self)
    }

    fn sleep(&self, duration: TimeDelta) {
        MockClock::sleep(self, duration)
    }

    fn after(&self, duration: TimeDelta) -> Receiver<DateTime<Utc>> {
        MockClock::after(self, duration)
    }

    fn tick(&self, interval: TimeDelta) -> Receiver<DateTime<Utc>> {
        MockClock::tick(self, interval)
    }
}

/// Configures a [`MockClock`] before it starts.
#[derive(Default)]
pub struct MockClockBuilder {
    start: Option<DateTime<Utc>>,
    frozen: bool,
    observer: Option<Arc<dyn ClockObserver>>,
}

impl MockClockBuilder {
    /// Virtual time the clock starts at. Defaults to the current real time.
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Start frozen.
    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ClockObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> MockClock {
        let state = ClockState {
            base: self.start.unwrap_or_else(Utc::now),
            last: Instant::now(),
            frozen: self.frozen,
            seq: 0,
            waiters: WaiterRegistry::default(),
        };
        MockClock {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                observer: self.observer.unwrap_or_else(|| Arc::new(NoopObserver)),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use proptest::prelude::*;
    use tracing_test::traced_test;

    const DELAY: Duration = Duration::from_millis(50);

    fn fixed_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_415_926_535, 0).unwrap()
    }

    fn delay() -> TimeDelta {
        to_delta(DELAY)
    }

    fn roughly(actual: TimeDelta, expected: TimeDelta) -> bool {
        (actual - expected).abs() <= TimeDelta::milliseconds(40)
    }

    /// Polls until `clock` has `count` registered waiters.
    fn wait_for_waiters(clock: &MockClock, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while clock.waiter_count() != count {
            assert!(Instant::now() < deadline, "expected {count} waiters");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        mutations: AtomicUsize,
        registered: AtomicUsize,
        released: AtomicUsize,
    }

    impl ClockObserver for CountingObserver {
        fn on_mutation(&self, _mutation: Mutation, _waiters: usize) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }

        fn on_waiter_registered(&self, _live: usize) {
            self.registered.fetch_add(1, Ordering::SeqCst);
        }

        fn on_waiter_released(&self, _live: usize, _waited: Duration) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn returns_the_time() {
        let clock = MockClock::new();
        assert!(!clock.is_frozen());
        assert!((Utc::now() - clock.now()).abs() < TimeDelta::milliseconds(20));
    }

    #[test]
    fn sets_time() {
        let clock = MockClock::new();
        clock.set(fixed_time());
        assert!(clock.now() - fixed_time() < TimeDelta::milliseconds(1));

        thread::sleep(DELAY);
        assert!(roughly(clock.now() - fixed_time(), delay()));
    }

    #[test]
    fn adds_time() {
        let clock = MockClock::new();
        clock.add(TimeDelta::hours(1));
        let diff = Utc::now() - clock.now();
        assert!(roughly(diff, -TimeDelta::hours(1)));
    }

    #[test]
    fn add_accepts_negative_delta() {
        let clock = MockClock::builder().start(fixed_time()).frozen(true).build();
        clock.add(TimeDelta::minutes(-3));
        assert_eq!(clock.now(), fixed_time() - TimeDelta::minutes(3));
    }

    #[test]
    fn freezes() {
        let clock = MockClock::new();
        clock.add(TimeDelta::hours(1)).freeze();
        assert!(clock.is_frozen());
        let frozen_at = clock.now();

        thread::sleep(DELAY);

        assert_eq!(clock.now(), frozen_at);
    }

    #[test]
    fn freezes_at_passed_in_time() {
        let clock = MockClock::new();
        clock.freeze().set(fixed_time());
        assert!(clock.is_frozen());

        thread::sleep(DELAY);

        assert_eq!(clock.now(), fixed_time());
    }

    #[test]
    fn freeze_is_idempotent() {
        let observer = Arc::new(CountingObserver::default());
        let clock = MockClock::builder().observer(observer.clone()).build();
        clock.freeze();
        let frozen_at = clock.now();

        thread::sleep(DELAY);
        clock.freeze();

        assert_eq!(clock.now(), frozen_at);
        assert_eq!(observer.mutations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unfreezes() {
        let clock = MockClock::new();
        clock.freeze();
        assert!(clock.is_frozen());
        let old = clock.now();

        thread::sleep(DELAY);

        clock.unfreeze();
        assert!(!clock.is_frozen());
        assert!(roughly(old - clock.now(), TimeDelta::zero()));
    }

    #[test]
    fn resumes_from_frozen_value_after_unfreeze() {
        let clock = MockClock::builder().start(fixed_time()).frozen(true).build();
        thread::sleep(DELAY);
        clock.unfreeze();
        thread::sleep(DELAY);
        assert!(roughly(clock.now() - fixed_time(), delay()));
    }

    #[test]
    fn can_sleep() {
        let clock = MockClock::new();
        let before = clock.now();
        let start = Instant::now();

        clock.sleep(delay());

        let slept = start.elapsed();
        assert!(slept >= DELAY);
        assert!(roughly(to_delta(slept), delay()));
        assert!(clock.since(before) >= delay());
        assert_eq!(clock.waiter_count(), 0);
    }

    #[test]
    fn negative_sleep_returns_immediately_even_when_frozen() {
        let clock = MockClock::builder().frozen(true).build();
        clock.sleep(TimeDelta::seconds(-1));
        clock.sleep(TimeDelta::zero());
        assert_eq!(clock.waiter_count(), 0);
    }

    #[test]
    fn frozen_sleeper_is_released_by_add() {
        let clock = MockClock::builder().frozen(true).build();
        let sleeper = clock.clone();
        let handle = thread::spawn(move || {
            let start = Instant::now();
            sleeper.sleep(TimeDelta::seconds(10));
            start.elapsed()
        });

        wait_for_waiters(&clock, 1);
        clock.add(TimeDelta::seconds(10));

        let waited = handle.join().unwrap();
        assert!(waited < Duration::from_secs(1));
        assert_eq!(clock.waiter_count(), 0);
    }

    #[test]
    fn frozen_sleeper_ignores_real_time() {
        let clock = MockClock::builder().frozen(true).build();
        let sleeper = clock.clone();
        let handle = thread::spawn(move || sleeper.sleep(TimeDelta::milliseconds(10)));

        wait_for_waiters(&clock, 1);
        thread::sleep(DELAY);
        assert!(!handle.is_finished());

        clock.add(TimeDelta::milliseconds(5));
        thread::sleep(Duration::from_millis(10));
        assert!(!handle.is_finished());

        clock.add(TimeDelta::milliseconds(5));
        handle.join().unwrap();
    }

    #[test]
    fn set_past_target_releases_sleeper() {
        let clock = MockClock::builder().start(fixed_time()).frozen(true).build();
        let sleeper = clock.clone();
        let handle = thread::spawn(move || sleeper.sleep(TimeDelta::days(1)));

        wait_for_waiters(&clock, 1);
        clock.set(fixed_time() + TimeDelta::days(2));
        handle.join().unwrap();
    }

    #[test]
    fn unfreeze_lets_sleeper_finish_in_real_time() {
        let clock = MockClock::builder().frozen(true).build();
        let sleeper = clock.clone();
        let handle = thread::spawn(move || sleeper.sleep(to_delta(DELAY)));

        wait_for_waiters(&clock, 1);
        let start = Instant::now();
        clock.unfreeze();

        handle.join().unwrap();
        let waited = start.elapsed();
        assert!(roughly(to_delta(waited), delay()));
    }

    #[test]
    fn freeze_holds_running_sleeper() {
        let clock = MockClock::new();
        let sleeper = clock.clone();
        let handle = thread::spawn(move || sleeper.sleep(TimeDelta::milliseconds(100)));

        wait_for_waiters(&clock, 1);
        clock.freeze();
        thread::sleep(Duration::from_millis(200));
        assert!(!handle.is_finished());

        clock.add(TimeDelta::milliseconds(100));
        handle.join().unwrap();
    }

    #[test]
    fn one_mutation_wakes_every_sleeper() {
        let clock = MockClock::builder().frozen(true).build();
        let handles: Vec<_> = (1..=4)
            .map(|secs| {
                let sleeper = clock.clone();
                thread::spawn(move || sleeper.sleep(TimeDelta::seconds(secs)))
            })
            .collect();

        wait_for_waiters(&clock, 4);
        clock.add(TimeDelta::seconds(4));
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(clock.waiter_count(), 0);
    }

    #[test]
    fn partial_advance_releases_only_due_sleepers() {
        let clock = MockClock::builder().frozen(true).build();
        let short = {
            let sleeper = clock.clone();
            thread::spawn(move || sleeper.sleep(TimeDelta::seconds(1)))
        };
        let long = {
            let sleeper = clock.clone();
            thread::spawn(move || sleeper.sleep(TimeDelta::seconds(60)))
        };

        wait_for_waiters(&clock, 2);
        clock.add(TimeDelta::seconds(1));
        short.join().unwrap();
        wait_for_waiters(&clock, 1);
        assert!(!long.is_finished());

        clock.add(TimeDelta::seconds(59));
        long.join().unwrap();
    }

    #[test]
    fn after_yields_virtual_time() {
        let clock = MockClock::builder().start(fixed_time()).frozen(true).build();
        let rx = clock.after(TimeDelta::seconds(1));
        assert_eq!(clock.waiter_count(), 1);
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

        clock.add(TimeDelta::seconds(1));
        let fired = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(fired, fixed_time() + TimeDelta::seconds(1));
        assert_eq!(clock.waiter_count(), 0);
    }

    #[test]
    fn after_fires_in_real_time_when_unfrozen() {
        let clock = MockClock::new();
        let start = clock.now();
        let fired = clock
            .after(delay())
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(fired - start >= delay());
    }

    #[test]
    fn tick_repeats_on_frozen_clock() {
        let clock = MockClock::builder().start(fixed_time()).frozen(true).build();
        let rx = clock.tick(TimeDelta::seconds(1));

        let mut ticks = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while ticks.len() < 3 {
            assert!(Instant::now() < deadline, "ticker stalled");
            clock.add(TimeDelta::seconds(1));
            if let Ok(t) = rx.recv_timeout(Duration::from_millis(20)) {
                ticks.push(t);
            }
        }

        assert!(ticks.windows(2).all(|pair| pair[1] - pair[0] >= TimeDelta::seconds(1)));
        assert_eq!(clock.waiter_count(), 1);
    }

    #[test]
    fn tick_follows_real_time_when_unfrozen() {
        let clock = MockClock::new();
        let interval = TimeDelta::milliseconds(20);
        let rx = clock.tick(interval);

        let ticks: Vec<_> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert!(ticks.windows(2).all(|pair| pair[1] - pair[0] >= interval));
    }

    #[test]
    fn tick_producer_exits_after_receiver_dropped() {
        let clock = MockClock::builder().frozen(true).build();
        drop(clock.tick(TimeDelta::seconds(1)));
        assert_eq!(clock.waiter_count(), 1);

        clock.add(TimeDelta::seconds(1));
        wait_for_waiters(&clock, 0);
    }

    #[test]
    fn ticker_is_real_time() {
        let clock = MockClock::builder().frozen(true).build();
        let ticker = Clock::ticker(&clock, Duration::from_millis(10));
        assert!(ticker.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn since_and_until_follow_virtual_time() {
        let clock = MockClock::builder().start(fixed_time()).frozen(true).build();
        let later = fixed_time() + TimeDelta::minutes(5);
        assert_eq!(clock.until(later), TimeDelta::minutes(5));

        clock.add(TimeDelta::minutes(7));
        assert_eq!(clock.since(fixed_time()), TimeDelta::minutes(7));
        assert_eq!(clock.until(later), TimeDelta::minutes(-2));
    }

    #[test]
    fn observer_sees_waiter_lifecycle() {
        let observer = Arc::new(CountingObserver::default());
        let clock = MockClock::builder()
            .frozen(true)
            .observer(observer.clone())
            .build();

        let rx = clock.after(TimeDelta::seconds(1));
        clock.add(TimeDelta::seconds(1));
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(observer.registered.load(Ordering::SeqCst), 1);
        assert_eq!(observer.released.load(Ordering::SeqCst), 1);
        assert_eq!(observer.mutations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn works_behind_the_clock_trait() {
        let mock = MockClock::builder().start(fixed_time()).frozen(true).build();
        let clock: Arc<dyn Clock> = Arc::new(mock.clone());
        assert_eq!(clock.now(), fixed_time());

        let rx = clock.after(TimeDelta::seconds(30));
        mock.add(TimeDelta::seconds(30));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            fixed_time() + TimeDelta::seconds(30)
        );
    }

    #[traced_test]
    #[test]
    fn logs_mutations() {
        let clock = MockClock::new();
        clock.freeze().add(TimeDelta::seconds(1));
        assert!(logs_contain("clock mutated"));
        assert!(logs_contain("mutation=freeze"));
        assert!(logs_contain("mutation=add"));
    }

    #[cfg(feature = "async")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn sleep_async_is_released_by_add() {
        let clock = MockClock::builder().frozen(true).build();
        let sleep = clock.sleep_async(TimeDelta::minutes(1));
        assert_eq!(clock.waiter_count(), 1);

        let task = tokio::spawn(sleep);
        clock.add(TimeDelta::minutes(1));
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("virtual sleep should complete")
            .unwrap();
        assert_eq!(clock.waiter_count(), 0);
    }

    proptest! {
        #[test]
        fn add_on_frozen_clock_is_exact(secs in -1_000_000i64..1_000_000, nanos in 0u32..1_000_000_000) {
            let clock = MockClock::builder().start(fixed_time()).frozen(true).build();
            let delta = TimeDelta::new(secs, nanos).unwrap();
            clock.add(delta);
            prop_assert_eq!(clock.now() - fixed_time(), delta);
        }

        #[test]
        fn set_then_now_round_trips_when_frozen(secs in 0i64..4_000_000_000, nanos in 0u32..1_000_000_000) {
            let clock = MockClock::builder().frozen(true).build();
            let t = DateTime::from_timestamp(secs, nanos).unwrap();
            clock.set(t);
            prop_assert_eq!(clock.now(), t);
        }
    }
}
