//! Auto Clicker - countdown-delayed, rate-controlled mouse clicking
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary wires the clicking core to the Slint window. It initializes:
//! - Application config ([`ConfigManager`]) from `Auto Clicker Data/`
//! - Logging infrastructure (file rotation + optional console output)
//! - Tokio runtime that hosts the clicking task and its timers
//! - State management ([`StateManager`]) seeded from the settings file
//! - GUI controller ([`GuiController`]) and its command dispatcher
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Run the countdown and click cycle
//! - **Render listener**: Background std::thread turning state changes into redraws
//!
//! # Execution Flow
//!
//! 1. Load `Auto Clicker Data/Auto Clicker Config.yaml` (defaults if unusable)
//! 2. Initialize logging → `<log dir>/autoclicker.<date>`
//! 3. Create tokio runtime
//! 4. Load the settings file into the StateManager
//! 5. Create GuiController and run the Slint event loop
//! 6. On close: cancel any run, write the settings file once, shut down

use anyhow::{Result, anyhow};
use autoclicker::config::ConfigManager;
use autoclicker::models::AppConfig;
use autoclicker::services::{ClickAction, ClickScheduler, EnigoClicker, SchedulerConfig};
use autoclicker::ui::GuiController;
use autoclicker::{APP_NAME, Metrics, StateManager, VERSION};
use std::sync::Arc;
use std::time::Duration;

const CONFIG_DIR: &str = "Auto Clicker Data";
const LOG_PREFIX: &str = "autoclicker";
const WORKER_THREADS: usize = 2;

/// Load the app config, falling back to defaults when it cannot be read
///
/// Logging is not up yet, so problems are reported on stderr and again once
/// the subscriber is installed.
fn load_app_config() -> (Option<ConfigManager>, AppConfig, Option<String>) {
    let manager = match ConfigManager::new(CONFIG_DIR) {
        Ok(manager) => manager,
        Err(e) => {
            let problem = format!("{:#}", e);
            eprintln!("Config directory unavailable: {}", problem);
            return (None, AppConfig::default(), Some(problem));
        }
    };

    match manager.load_app_config() {
        Ok(config) => (Some(manager), config, None),
        Err(e) => {
            let problem = format!("{:#}", e);
            eprintln!("Using default config: {}", problem);
            (Some(manager), AppConfig::default(), Some(problem))
        }
    }
}

fn main() -> Result<()> {
    let (config_manager, app_config, config_problem) = load_app_config();

    // Held until exit; dropping it stops the file writer
    let _log_guard = autoclicker::logging::setup_logging(&app_config, LOG_PREFIX)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if let Some(problem) = config_problem {
        tracing::warn!("App config not loaded, using defaults: {}", problem);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(WORKER_THREADS)
        .thread_name("autoclicker-worker")
        .build()?;

    tracing::info!(
        "Tokio runtime initialized with {} worker threads",
        WORKER_THREADS
    );

    let state_manager = StateManager::new();
    let settings_store = match &config_manager {
        Some(manager) => manager.settings_store(&app_config),
        None => autoclicker::SettingsStore::new(&app_config.settings_file),
    };
    state_manager.load_from_settings(&settings_store.load());
    tracing::info!("Settings loaded into state manager");

    let metrics = Arc::new(Metrics::new());
    let clicker: Arc<dyn ClickAction> = Arc::new(EnigoClicker::new());
    let scheduler = Arc::new(ClickScheduler::new(
        state_manager.clone(),
        clicker,
        Arc::clone(&metrics),
        runtime.handle().clone(),
        SchedulerConfig::from_app_config(&app_config),
    ));

    let gui_controller =
        GuiController::new(state_manager.clone(), scheduler, Arc::clone(&metrics))?;
    let dispatcher = gui_controller.dispatcher();

    tracing::info!("GUI controller initialized, launching window");

    // Blocks until the window is closed
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");

    dispatcher.shutdown();
    settings_store.save(&dispatcher.persisted_settings());
    metrics.log_summary();

    runtime.shutdown_timeout(Duration::from_secs(2));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow!("GUI error: {}", e)
    })
}
