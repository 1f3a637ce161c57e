//! Run metrics for the simulation.
//!
//! Atomic gauges for tick and population counts plus a map of named event
//! counters. The relaxation mover reports non-convergence and displacement
//! clamping here so that calibration runs can see how often they happen.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DIVISIONS: &str = "divisions";
pub const REMOVALS_OUT_OF_BOUNDS: &str = "removals_out_of_bounds";
pub const REMOVALS_NON_VIABLE: &str = "removals_non_viable";
pub const RELAXATION_NON_CONVERGED: &str = "relaxation_non_converged";
pub const RELAXATION_DISPLACEMENT_CLAMPED: &str = "relaxation_displacement_clamped";
pub const CONTACT_EVENTS: &str = "contact_events";

/// Collector shared by the world and the mover.
pub struct Metrics {
    tick_count: AtomicU64,
    population: AtomicU64,
    pub counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tick_count", &self.tick_count())
            .field("population", &self.population())
            .finish()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            population: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, population: usize, log_interval: u64) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.population.store(population as u64, Ordering::Relaxed);

        let tick = self.tick_count.load(Ordering::Relaxed);
        if log_interval > 0 && tick % log_interval == 0 {
            tracing::info!(
                tick = tick,
                population = population,
                duration_us = duration.as_micros() as u64,
                divisions = self.counter(DIVISIONS),
                non_converged = self.counter(RELAXATION_NON_CONVERGED),
                "Simulation tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, amount: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    /// Current value of a named counter; zero if it was never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honors `RUST_LOG` when set, INFO otherwise. Only binaries call this.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
