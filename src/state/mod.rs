// State management module
//
// This module provides the StateManager which owns AppState behind a lock
// and emits change events so the presenter can re-render without polling.

use crate::models::{AppState, ClickRate, ClickingState, PersistedSettings, Theme};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Change events emitted when state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The click rate has been updated
    RateChanged { cps: u64 },

    /// The display theme has been flipped
    ThemeChanged { theme: Theme },

    /// The status line has a new message
    StatusChanged { message: String },

    /// The clicking state machine moved to a new phase
    ClickingChanged { state: ClickingState },
}

/// Thread-safe state manager with event emission
///
/// This is the exclusive-access guard around [`AppState`]:
/// - Every read-modify-write happens inside one [`update()`](Self::update) call
/// - Changes are detected by diffing and broadcast as [`StateChange`] events
/// - The clicking task and the command context share it through `Arc`/`Clone`
///
/// The lock is a `parking_lot::RwLock`, which never poisons, and it is never
/// held across an `.await`.
///
/// # Related Types
///
/// - [`crate::services::ClickScheduler`]: drives the clicking transitions
/// - [`crate::services::CommandDispatcher`]: drives rate, theme and Start/Stop
pub struct StateManager {
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// The broadcast channel buffers 100 events.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let running = state_manager.read(|state| state.clicking == ClickingState::Running);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Holds the write lock for the whole closure, so check-then-set logic
    /// inside `update_fn` is atomic with respect to every other caller.
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // No subscribers is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.clicking != new.clicking {
            changes.push(StateChange::ClickingChanged {
                state: new.clicking,
            });
        }

        if old.rate != new.rate {
            changes.push(StateChange::RateChanged {
                cps: new.rate.display_cps(),
            });
        }

        if old.theme != new.theme {
            changes.push(StateChange::ThemeChanged { theme: new.theme });
        }

        if old.status != new.status {
            changes.push(StateChange::StatusChanged {
                message: new.status.clone(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Replace theme and rate with values read from disk
    pub fn load_from_settings(&self, settings: &PersistedSettings) -> Vec<StateChange> {
        self.update(|state| {
            state.theme = settings.theme;
            state.rate = settings.rate;

            tracing::info!(
                "Loaded settings into state: theme={}, delay={}s",
                state.theme.label(),
                state.rate.delay_secs()
            );
        })
    }

    /// Current theme and rate, in the shape the settings file stores
    pub fn persisted_settings(&self) -> PersistedSettings {
        self.read(|state| PersistedSettings {
            theme: state.theme,
            rate: state.rate,
        })
    }

    /// Set the status line
    pub fn set_status(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| state.status = message)
    }

    /// Set a new click rate along with its status line
    pub fn set_rate(&self, rate: ClickRate, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.rate = rate;
            state.status = message;
        })
    }

    /// Flip the theme, returning the new one
    pub fn toggle_theme(&self) -> Theme {
        let mut theme = Theme::default();
        self.update(|state| {
            state.theme = state.theme.toggled();
            state.status = format!("Switched to {}", state.theme.label());
            theme = state.theme;
        });
        theme
    }

    /// Move `Idle` to `Countdown { remaining: steps }` and open a new run
    ///
    /// # Returns
    /// The new run id, or `None` if a countdown or click cycle already exists
    pub fn begin_countdown(&self, steps: u32) -> Option<u64> {
        let mut run_id = None;
        self.update(|state| {
            if state.clicking.is_idle() {
                state.run_id += 1;
                state.clicking = ClickingState::Countdown { remaining: steps };
                run_id = Some(state.run_id);
            }
        });
        run_id
    }

    /// Record one countdown step for `run_id`
    ///
    /// # Returns
    /// `false` if the run was stopped or superseded, in which case nothing changes
    pub fn countdown_tick(&self, run_id: u64, remaining: u32) -> bool {
        let mut applied = false;
        self.update(|state| {
            if state.owns_run(run_id) && matches!(state.clicking, ClickingState::Countdown { .. })
            {
                state.clicking = ClickingState::Countdown { remaining };
                state.status = format!("Starting in {remaining}...");
                applied = true;
            }
        });
        applied
    }

    /// Finish the countdown for `run_id` and enter `Running`
    pub fn enter_running(&self, run_id: u64) -> bool {
        let mut applied = false;
        self.update(|state| {
            if state.owns_run(run_id) && matches!(state.clicking, ClickingState::Countdown { .. })
            {
                state.clicking = ClickingState::Running;
                state.status = "Clicking started!".to_string();
                applied = true;
            }
        });
        applied
    }

    /// Sleep interval for the next click of `run_id`, read fresh from the rate
    ///
    /// `None` once the run has been stopped or superseded.
    pub fn running_interval(&self, run_id: u64) -> Option<Duration> {
        self.read(|state| {
            (state.run_id == run_id && state.clicking == ClickingState::Running)
                .then(|| state.rate.interval())
        })
    }

    /// Return to `Idle` from any active phase
    ///
    /// Sets "Start cancelled." when interrupting a countdown and
    /// "Clicking stopped." when interrupting a click cycle.
    ///
    /// # Returns
    /// The phase that was interrupted, or `None` if already idle
    pub fn halt(&self) -> Option<ClickingState> {
        self.halt_if(|_| true)
    }

    /// Like [`halt()`](Self::halt), but only while `run_id` is the current run
    ///
    /// Lets a clicking task that was woken by cancellation make sure it does
    /// not leave its own run behind in an active phase.
    pub fn release_run(&self, run_id: u64) -> Option<ClickingState> {
        self.halt_if(|state| state.run_id == run_id)
    }

    fn halt_if(&self, applies: impl FnOnce(&AppState) -> bool) -> Option<ClickingState> {
        let mut interrupted = None;
        self.update(|state| {
            if !applies(state) {
                return;
            }
            let previous = state.clicking;
            match previous {
                ClickingState::Idle => return,
                ClickingState::Countdown { .. } => {
                    state.status = "Start cancelled.".to_string();
                }
                ClickingState::Running => {
                    state.status = "Clicking stopped.".to_string();
                }
            }
            state.clicking = ClickingState::Idle;
            interrupted = Some(previous);
        });
        interrupted
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
