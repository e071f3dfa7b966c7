use crate::metrics::Metrics;
use crate::models::{AppState, ClickRate, PersistedSettings, Theme};
use crate::services::scheduler::ClickScheduler;
use crate::state::{StateChange, StateManager};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

/// Presentation layer consumed by the dispatcher
///
/// Implementations draw the current state; they never mutate it. Hit-testing
/// and the rate prompt belong to the implementation, which reports results
/// back through [`CommandDispatcher`].
pub trait Presenter: Send + Sync {
    /// Redraw everything from a snapshot
    fn render(&self, snapshot: &AppState);

    /// Repaint the window background for `theme`
    fn recolor_background(&self, theme: Theme);
}

/// Rejections of a rate change; each maps to a status line
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("rate change cancelled")]
    Cancelled,

    #[error("'{0}' is not a number")]
    Parse(String),

    #[error("{0} CPS is outside 1..=10000")]
    Range(f64),
}

impl CommandError {
    /// Status line shown to the user for this rejection
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::Cancelled => "CPS change cancelled",
            Self::Parse(_) => "Invalid CPS input!",
            Self::Range(_) => "CPS must be between 1 and 10000!",
        }
    }
}

/// Parse a user-entered rate
///
/// `None` and the empty string mean the prompt was dismissed. Surrounding
/// whitespace is ignored.
pub fn parse_rate(input: Option<&str>) -> Result<ClickRate, CommandError> {
    parse_cps(input).map(|(_, rate)| rate)
}

fn parse_cps(input: Option<&str>) -> Result<(f64, ClickRate), CommandError> {
    let raw = match input {
        None | Some("") => return Err(CommandError::Cancelled),
        Some(raw) => raw,
    };

    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CommandError::Parse(raw.to_string()))?;

    ClickRate::from_cps(value)
        .map(|rate| (value, rate))
        .ok_or(CommandError::Range(value))
}

/// Entry point for every user command
///
/// Validates input, mutates state (directly or through [`ClickScheduler`]),
/// updates the status line and asks the [`Presenter`] to redraw. It is the
/// only component that talks to the presenter.
pub struct CommandDispatcher {
    state: StateManager,
    scheduler: Arc<ClickScheduler>,
    presenter: Arc<dyn Presenter>,
    metrics: Arc<Metrics>,
}

impl CommandDispatcher {
    pub fn new(
        state: StateManager,
        scheduler: Arc<ClickScheduler>,
        presenter: Arc<dyn Presenter>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            state,
            scheduler,
            presenter,
            metrics,
        }
    }

    /// Apply a rate typed into the prompt
    ///
    /// On success the delay becomes `1 / cps` and the status reports the
    /// rounded value. Any rejection leaves the rate untouched.
    pub fn set_rate(&self, input: Option<&str>) -> Result<ClickRate, CommandError> {
        let result = match parse_cps(input) {
            Ok((value, rate)) => {
                let cps = value.round_ties_even() as u64;
                tracing::info!("Rate set to {} CPS (delay {}s)", cps, rate.delay_secs());
                self.state.set_rate(rate, format!("CPS set to {cps}"));
                Ok(rate)
            }
            Err(e) => {
                tracing::info!("Rate change rejected: {}", e);
                self.state.set_status(e.status_message());
                Err(e)
            }
        };

        self.request_render();
        result
    }

    /// Flip between dark and light mode
    pub fn toggle_theme(&self) -> Theme {
        let theme = self.state.toggle_theme();
        tracing::info!("Switched to {}", theme.label());

        self.presenter.recolor_background(theme);
        self.request_render();
        theme
    }

    /// Start the countdown; ignored while a run is active
    pub fn start(&self) -> bool {
        let started = self.scheduler.start();
        self.request_render();
        started
    }

    /// Stop the countdown or click cycle; ignored while idle
    pub fn stop(&self) -> bool {
        let stopped = self.scheduler.stop();
        self.request_render();
        stopped
    }

    /// Paint the initial frame: background plus full render
    pub fn refresh(&self) {
        let theme = self.state.read(|s| s.theme);
        self.presenter.recolor_background(theme);
        self.request_render();
    }

    /// Preferences to write back on exit
    pub fn persisted_settings(&self) -> PersistedSettings {
        self.state.persisted_settings()
    }

    /// Cancel any active run before exit
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    /// Forward state changes made by the clicking task to the presenter
    ///
    /// Countdown steps and the switch to Running happen off the command
    /// context; this background thread turns them into re-renders. Bursts
    /// are coalesced into a single render.
    pub fn spawn_render_listener(&self) -> std::thread::JoinHandle<()> {
        let mut rx = self.state.subscribe();
        let state = self.state.clone();
        let presenter = Arc::clone(&self.presenter);
        let metrics = Arc::clone(&self.metrics);

        std::thread::spawn(move || {
            tracing::debug!("Render listener thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);
                        if !matches!(
                            change,
                            StateChange::ClickingChanged { .. } | StateChange::StatusChanged { .. }
                        ) {
                            continue;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Render listener lagged, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }

                while rx.try_recv().is_ok() {}

                metrics.record_render();
                presenter.render(&state.snapshot());
            }

            tracing::debug!("Render listener thread terminated");
        })
    }

    fn request_render(&self) {
        self.metrics.record_render();
        self.presenter.render(&self.state.snapshot());
    }
}
