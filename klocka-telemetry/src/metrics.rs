//! ## klocka-telemetry::metrics
//! **Prometheus view of clock activity**
//!
//! Plug a [`MetricsRecorder`] into a clock with
//! `MockClock::builder().observer(recorder)` and scrape it with
//! [`MetricsRecorder::gather_metrics`].

use std::time::Duration;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

use klocka_core::{ClockObserver, Mutation};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub mutations: IntCounterVec,
    pub live_waiters: IntGauge,
    pub released_waiters: IntCounter,
    pub wait_seconds: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let mutations = IntCounterVec::new(
            Opts::new("klocka_mutations_total", "Clock mutations by kind"),
            &["kind"],
        )?;
        let live_waiters = IntGauge::new("klocka_waiters", "Waiters currently registered")?;
        let released_waiters =
            IntCounter::new("klocka_waiters_released_total", "Waiters that fired")?;
        let wait_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "klocka_wait_seconds",
                "Real time a waiter spent registered",
            )
            .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0]),
        )?;

        registry.register(Box::new(mutations.clone()))?;
        registry.register(Box::new(live_waiters.clone()))?;
        registry.register(Box::new(released_waiters.clone()))?;
        registry.register(Box::new(wait_seconds.clone()))?;

        // Every kind shows up in the exposition, even before it happens.
        for mutation in Mutation::ALL {
            mutations.with_label_values(&[mutation.as_str()]);
        }

        Ok(Self {
            registry,
            mutations,
            live_waiters,
            released_waiters,
            wait_seconds,
        })
    }

    /// Text exposition of every registered metric.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn mutation_count(&self, mutation: Mutation) -> u64 {
        self.mutations.with_label_values(&[mutation.as_str()]).get()
    }
}

impl ClockObserver for MetricsRecorder {
    fn on_mutation(&self, mutation: Mutation, _waiters: usize) {
        self.mutations.with_label_values(&[mutation.as_str()]).inc();
    }

    fn on_waiter_registered(&self, live: usize) {
        self.live_waiters.set(live as i64);
    }

    fn on_waiter_released(&self, live: usize, waited: Duration) {
        self.live_waiters.set(live as i64);
        self.released_waiters.inc();
        self.wait_seconds.observe(waited.as_secs_f64());
    }
}
