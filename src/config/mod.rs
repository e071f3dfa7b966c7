use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

pub mod settings_store;

pub use settings_store::{SettingsError, SettingsStore, format_settings, parse_settings};

/// Configuration manager for the YAML application config.
///
/// Manages `Auto Clicker Config.yaml` inside the configuration directory
/// and resolves where the user preferences file lives.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    app_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            app_config_path: config_dir.join("Auto Clicker Config.yaml"),
            config_dir,
        })
    }

    /// Load the application configuration.
    ///
    /// # Returns
    /// The loaded AppConfig. When the file doesn't exist the defaults are
    /// written out so users have something to edit.
    pub fn load_app_config(&self) -> Result<AppConfig> {
        if !self.app_config_path.exists() {
            tracing::warn!(
                "App config file not found at {}, writing defaults",
                self.app_config_path
            );
            let config = AppConfig::default();
            self.save_app_config(&config)?;
            return Ok(config);
        }

        let file_contents = fs::read_to_string(&self.app_config_path)
            .with_context(|| format!("Failed to read app config: {}", self.app_config_path))?;

        let config: AppConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse app config: {}", self.app_config_path))?;

        tracing::info!("Loaded app config from {}", self.app_config_path);
        Ok(config)
    }

    /// Save the application configuration.
    pub fn save_app_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize app config to YAML")?;

        fs::write(&self.app_config_path, yaml_string)
            .with_context(|| format!("Failed to write app config: {}", self.app_config_path))?;

        tracing::info!("Saved app config to {}", self.app_config_path);
        Ok(())
    }

    /// Settings store for the preferences file named in `config`.
    ///
    /// Relative paths are taken as-is (relative to the working directory),
    /// matching where earlier versions wrote the file.
    pub fn settings_store(&self, config: &AppConfig) -> SettingsStore {
        SettingsStore::new(Utf8PathBuf::from(&config.settings_file))
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the application config file path.
    pub fn app_config_path(&self) -> &Utf8Path {
        &self.app_config_path
    }
}
