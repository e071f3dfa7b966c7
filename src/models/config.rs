use super::app_state::{ClickRate, DEFAULT_COUNTDOWN_STEPS, Theme};
use serde::{Deserialize, Serialize};

/// Application configuration from `Auto Clicker Config.yaml`
///
/// Controls where preferences are persisted, how long the warm-up lasts,
/// and how logging is set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "Settings File", default = "default_settings_file")]
    pub settings_file: String,

    #[serde(rename = "Countdown Seconds", default = "default_countdown_seconds")]
    pub countdown_seconds: u32,

    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Console Logging", default = "default_console_logging")]
    pub console_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
            countdown_seconds: default_countdown_seconds(),
            log_dir: default_log_dir(),
            debug_mode: false,
            console_logging: default_console_logging(),
        }
    }
}

fn default_settings_file() -> String {
    "auto_clicker_settings.txt".to_string()
}

fn default_countdown_seconds() -> u32 {
    DEFAULT_COUNTDOWN_STEPS
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_console_logging() -> bool {
    true
}

/// Preferences that survive a restart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PersistedSettings {
    pub theme: Theme,
    pub rate: ClickRate,
}
