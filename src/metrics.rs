// Performance metrics module
//
// Lightweight counters for the clicking runs, logged on shutdown

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide clicker metrics
///
/// Uses atomic operations so the clicking task and the command context can
/// record without sharing a lock.
#[derive(Debug)]
pub struct Metrics {
    /// Clicks issued through the click action
    pub clicks_issued: AtomicU64,

    /// Start commands that opened a countdown
    pub runs_started: AtomicU64,

    /// Countdowns that reached the Running phase
    pub runs_entered: AtomicU64,

    /// Countdowns abandoned by Stop
    pub countdowns_cancelled: AtomicU64,

    /// Click cycles halted by Stop
    pub runs_stopped: AtomicU64,

    /// Time spent in the Running phase, in milliseconds
    pub total_running_time_ms: AtomicU64,

    /// Re-render requests sent to the presenter
    pub renders_requested: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            clicks_issued: AtomicU64::new(0),
            runs_started: AtomicU64::new(0),
            runs_entered: AtomicU64::new(0),
            countdowns_cancelled: AtomicU64::new(0),
            runs_stopped: AtomicU64::new(0),
            total_running_time_ms: AtomicU64::new(0),
            renders_requested: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_click(&self) {
        self.clicks_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_entered(&self) {
        self.runs_entered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_countdown_cancelled(&self) {
        self.countdowns_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_stopped(&self) {
        self.runs_stopped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_running_time(&self, duration: Duration) {
        self.total_running_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_render(&self) {
        self.renders_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clicks(&self) -> u64 {
        self.clicks_issued.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average achieved clicks per second across all Running time
    pub fn avg_cps(&self) -> f64 {
        let ms = self.total_running_time_ms.load(Ordering::Relaxed);
        if ms > 0 {
            self.clicks() as f64 * 1000.0 / ms as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Clicker Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Runs: {} started, {} reached clicking, {} cancelled during countdown, {} stopped",
            self.runs_started.load(Ordering::Relaxed),
            self.runs_entered.load(Ordering::Relaxed),
            self.countdowns_cancelled.load(Ordering::Relaxed),
            self.runs_stopped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Clicks: {} in {:.2}s of clicking (avg {:.1} CPS)",
            self.clicks(),
            self.total_running_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_cps()
        );
        tracing::info!(
            "Render requests: {}",
            self.renders_requested.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
