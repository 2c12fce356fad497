//! Run metrics and structured logging for the navigation loop.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Names of the counters incremented by the engines' callers.
pub mod counters {
    pub const PATH_FOUND: &str = "path_found";
    pub const PATH_MISSING: &str = "path_missing";
    pub const AGENT_STUCK: &str = "agent_stuck";
    pub const HIGHWAY: &str = "highway";
    pub const GENOME_PRUNED: &str = "genome_pruned";
    pub const GENOME_GROWN: &str = "genome_grown";
    pub const AGENT_REPLACED: &str = "agent_replaced";
}

/// Thread-safe metrics collector shared by a simulation run.
pub struct Metrics {
    tick_count: AtomicU64,
    agent_count: AtomicU64,
    deposit_count: AtomicU64,
    counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            agent_count: AtomicU64::new(0),
            deposit_count: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, agents: usize, deposits: usize) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
        self.agent_count.store(agents as u64, Ordering::Relaxed);
        self.deposit_count
            .fetch_add(deposits as u64, Ordering::Relaxed);

        // Log at info level every 1000 ticks
        let tick = self.tick_count.load(Ordering::Relaxed);
        if tick % 1000 == 0 {
            tracing::info!(
                tick = tick,
                agents = agents,
                deposits = self.deposit_count.load(Ordering::Relaxed),
                duration_us = duration.as_micros() as u64,
                "Navigation tick"
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

    /// Current value of a named counter; 0 if it was never touched.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// All named counters, sorted by name.
    #[must_use]
    pub fn counters_snapshot(&self) -> BTreeMap<String, u64> {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect()
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn agent_count(&self) -> u64 {
        self.agent_count.load(Ordering::Relaxed)
    }

    /// Deposits applied over the whole run.
    #[must_use]
    pub fn deposit_count(&self) -> u64 {
        self.deposit_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a global fmt subscriber at INFO. Later calls are no-ops.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.counter(counters::PATH_FOUND), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_millis(16), 100, 5);
        metrics.record_tick(Duration::from_millis(16), 90, 3);
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.agent_count(), 90);
        assert_eq!(metrics.deposit_count(), 8);
    }

    #[test]
    fn test_named_counters() {
        let metrics = Metrics::new();
        metrics.increment_counter(counters::AGENT_STUCK);
        metrics.increment_counter(counters::AGENT_STUCK);
        metrics.add_to_counter(counters::HIGHWAY, 4);
        assert_eq!(metrics.counter(counters::AGENT_STUCK), 2);
        assert_eq!(metrics.counter(counters::HIGHWAY), 4);
        let snapshot = metrics.counters_snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["agent_stuck", "highway"]);
    }
}
