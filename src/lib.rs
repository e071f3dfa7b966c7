// Auto Clicker - countdown-delayed, rate-controlled mouse clicking
//
// This is the library crate containing the clicking core and its data structures.
// The binary crate (main.rs) provides the GUI entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::{ConfigManager, SettingsStore};
pub use metrics::Metrics;
pub use models::{AppConfig, AppState, ClickRate, ClickingState, PersistedSettings, Theme};
pub use services::{ClickAction, ClickScheduler, CommandDispatcher, CommandError, Presenter};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
