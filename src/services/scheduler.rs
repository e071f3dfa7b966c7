use crate::metrics::Metrics;
use crate::models::{AppConfig, ClickingState, DEFAULT_COUNTDOWN_STEPS};
use crate::services::click_action::ClickAction;
use crate::state::StateManager;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Timing of the warm-up between Start and the first click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Number of countdown steps, announced as "Starting in N..."
    pub countdown_steps: u32,

    /// Length of one countdown step
    pub step_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            countdown_steps: DEFAULT_COUNTDOWN_STEPS,
            step_interval: Duration::from_secs(1),
        }
    }
}

impl SchedulerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            countdown_steps: config.countdown_seconds,
            ..Self::default()
        }
    }
}

/// Owner of the clicking state machine
///
/// `Idle --start--> Countdown --(steps elapse)--> Running --stop--> Idle`, with
/// `Countdown --stop--> Idle` abandoning the run before any click.
///
/// The countdown and the click cycle run as one tokio task per Start (the
/// clicking context). The command context only ever calls [`start()`](Self::start)
/// and [`stop()`](Self::stop), neither of which blocks.
///
/// Every transition goes through [`StateManager`], so the "keep looping?"
/// check of the task and the Stop of the command context are serialized by
/// its lock. Each run also gets a `watch` channel; Stop signals it so a
/// pending countdown step or inter-click sleep wakes immediately.
pub struct ClickScheduler {
    state: StateManager,
    clicker: Arc<dyn ClickAction>,
    metrics: Arc<Metrics>,
    runtime: tokio::runtime::Handle,
    config: SchedulerConfig,

    /// Run id and cancellation sender of the current run
    ///
    /// Start and Stop hold this lock for their whole transition, so the
    /// installed sender always belongs to the run the state names.
    active_run: Mutex<Option<(u64, watch::Sender<bool>)>>,
}

impl ClickScheduler {
    pub fn new(
        state: StateManager,
        clicker: Arc<dyn ClickAction>,
        metrics: Arc<Metrics>,
        runtime: tokio::runtime::Handle,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            state,
            clicker,
            metrics,
            runtime,
            config,
            active_run: Mutex::new(None),
        }
    }

    /// Begin a countdown if the machine is idle
    ///
    /// # Returns
    /// `true` if a new run was spawned, `false` if Start was ignored
    pub fn start(&self) -> bool {
        let mut active_run = self.active_run.lock();

        let Some(run_id) = self.state.begin_countdown(self.config.countdown_steps) else {
            tracing::debug!(
                "Start ignored, clicker is {}",
                self.state.read(|s| s.clicking)
            );
            return false;
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        if let Some((previous, _)) = active_run.replace((run_id, cancel_tx)) {
            tracing::debug!("Dropping stale cancel channel of run {}", previous);
        }

        self.metrics.record_run_started();
        tracing::info!(
            "Run {} started, countdown of {} x {:?}",
            run_id,
            self.config.countdown_steps,
            self.config.step_interval
        );

        let run = ClickRun {
            run_id,
            state: self.state.clone(),
            clicker: Arc::clone(&self.clicker),
            metrics: Arc::clone(&self.metrics),
            config: self.config,
        };
        self.runtime.spawn(run.execute(cancel_rx));

        true
    }

    /// Return to idle, cancelling a countdown or halting the click cycle
    ///
    /// # Returns
    /// `true` if something was stopped, `false` if the machine was already idle
    pub fn stop(&self) -> bool {
        let mut active_run = self.active_run.lock();

        let Some(interrupted) = self.state.halt() else {
            tracing::debug!("Stop ignored, clicker is idle");
            return false;
        };

        match interrupted {
            ClickingState::Countdown { remaining } => {
                self.metrics.record_countdown_cancelled();
                tracing::info!("Countdown cancelled with {} step(s) left", remaining);
            }
            ClickingState::Running => {
                self.metrics.record_run_stopped();
                tracing::info!("Clicking stopped");
            }
            ClickingState::Idle => {}
        }

        if let Some((run_id, cancel_tx)) = active_run.take() {
            tracing::debug!("Cancelling run {}", run_id);
            let _ = cancel_tx.send(true);
        }

        true
    }

    /// True while a countdown or click cycle is in flight
    pub fn is_active(&self) -> bool {
        self.state.read(|s| s.clicking.is_active())
    }

    /// Stop any run before the process exits
    pub fn shutdown(&self) {
        if self.stop() {
            tracing::warn!("Clicker was active at shutdown, run cancelled");
        }
    }
}

/// One Start's worth of work, moved into the clicking task
struct ClickRun {
    run_id: u64,
    state: StateManager,
    clicker: Arc<dyn ClickAction>,
    metrics: Arc<Metrics>,
    config: SchedulerConfig,
}

impl ClickRun {
    async fn execute(self, mut cancel_rx: watch::Receiver<bool>) {
        for remaining in (1..=self.config.countdown_steps).rev() {
            if !self.state.countdown_tick(self.run_id, remaining) {
                tracing::debug!("Run {} left countdown early", self.run_id);
                return;
            }
            if !wait_or_cancel(self.config.step_interval, &mut cancel_rx).await {
                tracing::debug!("Run {} cancelled during countdown", self.run_id);
                self.release();
                return;
            }
        }

        if !self.state.enter_running(self.run_id) {
            tracing::debug!("Run {} stopped before clicking", self.run_id);
            return;
        }
        self.metrics.record_run_entered();
        tracing::info!("Run {} clicking", self.run_id);

        let started = Instant::now();
        let mut clicks: u64 = 0;

        // Interval is read fresh each iteration so rate changes apply to the next click
        while let Some(interval) = self.state.running_interval(self.run_id) {
            self.clicker.click();
            self.metrics.record_click();
            clicks += 1;

            if !wait_or_cancel(interval, &mut cancel_rx).await {
                self.release();
                break;
            }
        }

        let elapsed = started.elapsed();
        self.metrics.record_running_time(elapsed);
        tracing::info!(
            "Run {} finished: {} clicks in {:.2}s",
            self.run_id,
            clicks,
            elapsed.as_secs_f64()
        );
    }

    /// A cancelled run must not stay active
    fn release(&self) {
        if let Some(phase) = self.state.release_run(self.run_id) {
            tracing::warn!(
                "Run {} cancelled while still {}, returned to idle",
                self.run_id,
                phase
            );
        }
    }
}

/// Sleep for `duration` unless the run is cancelled first
///
/// # Returns
/// `true` if the full duration elapsed, `false` on cancellation
async fn wait_or_cancel(duration: Duration, cancel_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel_rx.wait_for(|cancelled| *cancelled) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClickRate;
    use crate::services::click_action::NoopClicker;

    fn create_scheduler(steps: u32) -> (ClickScheduler, StateManager, Arc<NoopClicker>) {
        let state = StateManager::new();
        let clicker = Arc::new(NoopClicker::new());
        let scheduler = ClickScheduler::new(
            state.clone(),
            clicker.clone(),
            Arc::new(Metrics::new()),
            tokio::runtime::Handle::current(),
            SchedulerConfig {
                countdown_steps: steps,
                step_interval: Duration::from_secs(1),
            },
        );
        (scheduler, state, clicker)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_scheduler_config_from_app_config() {
        let mut app = AppConfig::default();
        app.countdown_seconds = 3;
        let config = SchedulerConfig::from_app_config(&app);
        assert_eq!(config.countdown_steps, 3);
        assert_eq!(config.step_interval, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_announces_each_step() {
        let (scheduler, state, _clicker) = create_scheduler(5);

        assert!(scheduler.start());
        for expected in (1..=5).rev() {
            advance(10).await;
            assert_eq!(state.snapshot().status, format!("Starting in {expected}..."));
            assert_eq!(
                state.snapshot().clicking,
                ClickingState::Countdown {
                    remaining: expected
                }
            );
            advance(990).await;
        }

        advance(10).await;
        assert_eq!(state.snapshot().clicking, ClickingState::Running);
        assert_eq!(state.snapshot().status, "Clicking started!");
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_clicks_until_stopped() {
        let (scheduler, state, clicker) = create_scheduler(5);

        scheduler.start();
        advance(5_010).await;
        assert_eq!(state.snapshot().clicking, ClickingState::Running);
        assert!(clicker.clicks() >= 1);

        advance(500).await;
        let clicks = clicker.clicks();
        assert!((5..=7).contains(&clicks), "unexpected click count {clicks}");

        assert!(scheduler.stop());
        assert_eq!(state.snapshot().clicking, ClickingState::Idle);
        assert_eq!(state.snapshot().status, "Clicking stopped.");

        advance(2_000).await;
        assert_eq!(clicker.clicks(), clicks);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_countdown_never_clicks() {
        let (scheduler, state, clicker) = create_scheduler(5);

        scheduler.start();
        advance(2_500).await;
        assert!(scheduler.stop());
        assert_eq!(state.snapshot().status, "Start cancelled.");

        advance(10_000).await;
        assert_eq!(state.snapshot().clicking, ClickingState::Idle);
        assert_eq!(state.snapshot().status, "Start cancelled.");
        assert_eq!(clicker.clicks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_active_is_noop() {
        let (scheduler, state, _clicker) = create_scheduler(1);

        assert!(scheduler.start());
        assert!(!scheduler.start());
        advance(1_010).await;
        assert_eq!(state.snapshot().clicking, ClickingState::Running);

        assert!(!scheduler.start());
        assert_eq!(state.snapshot().run_id, 1);
        assert_eq!(state.snapshot().clicking, ClickingState::Running);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_idle_is_noop() {
        let (scheduler, state, _clicker) = create_scheduler(5);

        assert!(!scheduler.stop());
        assert_eq!(state.snapshot().status, "Ready");
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_change_applies_to_next_interval() {
        let (scheduler, state, clicker) = create_scheduler(0);

        scheduler.start();
        advance(1_005).await;
        let at_ten_cps = clicker.clicks();
        assert!((10..=11).contains(&at_ten_cps));

        state.set_rate(ClickRate::from_cps(2.0).unwrap(), "CPS set to 2");
        advance(2_000).await;
        let slowed = clicker.clicks() - at_ten_cps;
        assert!((4..=5).contains(&slowed), "unexpected click count {slowed}");

        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_cancel_runs_single_loop() {
        let (scheduler, state, clicker) = create_scheduler(2);

        scheduler.start();
        advance(500).await;
        scheduler.stop();
        assert!(scheduler.start());

        advance(2_010).await;
        assert_eq!(state.snapshot().clicking, ClickingState::Running);

        // One loop at 10 CPS: clicks at 2.5s, 2.6s, ... 3.5s
        advance(1_000).await;
        let clicks = clicker.clicks();
        assert!((10..=11).contains(&clicks), "unexpected click count {clicks}");
        scheduler.shutdown();
        assert!(!scheduler.is_active());
    }

    #[test]
    fn test_racing_start_and_restart_never_strands_countdown() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .build()
            .unwrap();
        let state = StateManager::new();
        let scheduler = Arc::new(ClickScheduler::new(
            state.clone(),
            Arc::new(NoopClicker::new()),
            Arc::new(Metrics::new()),
            runtime.handle().clone(),
            SchedulerConfig {
                countdown_steps: 1,
                step_interval: Duration::from_millis(5),
            },
        ));

        for _ in 0..50 {
            scheduler.stop();

            let first = {
                let scheduler = Arc::clone(&scheduler);
                std::thread::spawn(move || {
                    scheduler.start();
                })
            };
            let second = {
                let scheduler = Arc::clone(&scheduler);
                std::thread::spawn(move || {
                    scheduler.stop();
                    scheduler.start();
                })
            };
            first.join().unwrap();
            second.join().unwrap();

            // Whatever run won has had time to finish its countdown
            std::thread::sleep(Duration::from_millis(40));
            let clicking = state.snapshot().clicking;
            assert!(
                matches!(clicking, ClickingState::Idle | ClickingState::Running),
                "left in {clicking}"
            );
        }

        scheduler.shutdown();
        assert!(!scheduler.is_active());
        runtime.shutdown_timeout(Duration::from_secs(1));
    }
}
