//! Data models for the auto clicker.
//!
//! - [`AppState`]: the central state container (theme, rate, clicking phase, status)
//! - [`ClickRate`]: validated clicks-per-second value, stored as an inter-click delay
//! - [`ClickingState`]: `Idle`, `Countdown` or `Running`
//! - [`Theme`]: dark/light display preference
//! - [`AppConfig`]: application configuration loaded from `Auto Clicker Config.yaml`
//! - [`PersistedSettings`]: the `{theme, rate}` pair written to the settings file
//!
//! # Architecture Note
//!
//! `AppState` is never shared directly. [`StateManager`](crate::state::StateManager)
//! owns it behind a lock and is the only way to read or mutate it.

pub mod app_state;
pub mod config;

pub use app_state::{
    AppState, ClickRate, ClickingState, DEFAULT_COUNTDOWN_STEPS, DEFAULT_DELAY_SECS,
    INITIAL_STATUS, MAX_CPS, MIN_CPS, MIN_DELAY_SECS, Theme,
};
pub use config::{AppConfig, PersistedSettings};
