use crate::models::{ClickRate, PersistedSettings, Theme};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use thiserror::Error;

/// Failures reading or writing the settings file
///
/// None of these reach the user: [`SettingsStore::load`] falls back to the
/// defaults and [`SettingsStore::save`] logs and moves on.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings file {0} does not exist")]
    NotFound(Utf8PathBuf),

    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("settings file has {0} line(s), expected 2")]
    MissingField(usize),

    #[error("invalid theme flag {0:?}, expected True or False")]
    InvalidTheme(String),

    #[error("invalid click delay {0:?}")]
    InvalidDelay(String),

    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse the two-line settings record
///
/// Line 1 is the dark-mode flag as `True`/`False`, line 2 the delay between
/// clicks in seconds. Surrounding whitespace on either line and extra lines
/// are ignored. The delay is clamped to the
/// click floor.
pub fn parse_settings(contents: &str) -> Result<PersistedSettings, SettingsError> {
    let lines: Vec<&str> = contents.lines().take(2).collect();
    let &[theme_field, delay_field] = lines.as_slice() else {
        return Err(SettingsError::MissingField(lines.len()));
    };

    let theme = match theme_field.trim() {
        "True" => Theme::Dark,
        "False" => Theme::Light,
        other => return Err(SettingsError::InvalidTheme(other.to_string())),
    };

    let rate = delay_field
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(ClickRate::from_delay_secs)
        .ok_or_else(|| SettingsError::InvalidDelay(delay_field.to_string()))?;

    Ok(PersistedSettings { theme, rate })
}

/// Render the settings record, e.g. `"True\n0.1\n"`
pub fn format_settings(settings: &PersistedSettings) -> String {
    let flag = if settings.theme.is_dark() { "True" } else { "False" };
    format!("{}\n{:?}\n", flag, settings.rate.delay_secs())
}

/// Durable storage for the theme and click rate
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Utf8PathBuf,
}

impl SettingsStore {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load persisted settings, falling back to defaults on any failure
    pub fn load(&self) -> PersistedSettings {
        match self.try_load() {
            Ok(settings) => {
                tracing::info!(
                    "Loaded settings from {}: {}, delay {}s",
                    self.path,
                    settings.theme.label(),
                    settings.rate.delay_secs()
                );
                settings
            }
            Err(SettingsError::NotFound(_)) => {
                tracing::info!("No settings file at {}, using defaults", self.path);
                PersistedSettings::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings, using defaults: {}", e);
                PersistedSettings::default()
            }
        }
    }

    /// Load persisted settings, reporting why they could not be used
    pub fn try_load(&self) -> Result<PersistedSettings, SettingsError> {
        if !self.path.exists() {
            return Err(SettingsError::NotFound(self.path.clone()));
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;

        parse_settings(&contents)
    }

    /// Save settings, logging and discarding any write failure
    pub fn save(&self, settings: &PersistedSettings) {
        match self.try_save(settings) {
            Ok(()) => tracing::info!("Saved settings to {}", self.path),
            Err(e) => tracing::warn!("Settings not saved: {}", e),
        }
    }

    /// Save settings, overwriting the file
    pub fn try_save(&self, settings: &PersistedSettings) -> Result<(), SettingsError> {
        fs::write(&self.path, format_settings(settings)).map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MIN_DELAY_SECS;
    use tempfile::TempDir;

    fn create_test_store() -> (SettingsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (SettingsStore::new(dir.join("auto_clicker_settings.txt")), temp_dir)
    }

    #[test]
    fn test_parse_settings() {
        let settings = parse_settings("False\n0.05\n").unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.rate.delay_secs(), 0.05);
    }

    #[test]
    fn test_parse_settings_crlf_and_extra_lines() {
        let settings = parse_settings("True\r\n0.2\r\nextra\n").unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.rate.delay_secs(), 0.2);
    }

    #[test]
    fn test_parse_settings_tolerates_padding() {
        let settings = parse_settings("True \n 0.25\n").unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.rate.delay_secs(), 0.25);

        let settings = parse_settings("\tFalse\n0.5\n").unwrap();
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn test_parse_settings_clamps_delay() {
        let settings = parse_settings("True\n0.00001\n").unwrap();
        assert_eq!(settings.rate.delay_secs(), MIN_DELAY_SECS);
    }

    #[test]
    fn test_parse_settings_errors() {
        assert!(matches!(
            parse_settings("True\n"),
            Err(SettingsError::MissingField(1))
        ));
        assert!(matches!(
            parse_settings(""),
            Err(SettingsError::MissingField(0))
        ));
        assert!(matches!(
            parse_settings("yes\n0.1\n"),
            Err(SettingsError::InvalidTheme(_))
        ));
        assert!(matches!(
            parse_settings("True\nfast\n"),
            Err(SettingsError::InvalidDelay(_))
        ));
        assert!(matches!(
            parse_settings("True\n-1\n"),
            Err(SettingsError::InvalidDelay(_))
        ));
    }

    #[test]
    fn test_format_settings() {
        let settings = PersistedSettings::default();
        assert_eq!(format_settings(&settings), "True\n0.1\n");

        let slow = PersistedSettings {
            theme: Theme::Light,
            rate: ClickRate::from_cps(1.0).unwrap(),
        };
        assert_eq!(format_settings(&slow), "False\n1.0\n");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let (store, _temp_dir) = create_test_store();
        assert!(matches!(store.try_load(), Err(SettingsError::NotFound(_))));
        assert_eq!(store.load(), PersistedSettings::default());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let (store, _temp_dir) = create_test_store();
        let settings = PersistedSettings {
            theme: Theme::Light,
            rate: ClickRate::from_cps(3.0).unwrap(),
        };

        store.save(&settings);

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_save_to_missing_directory_is_silent() {
        let (store, temp_dir) = create_test_store();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let broken = SettingsStore::new(dir.join("no_such_dir").join("settings.txt"));

        assert!(broken.try_save(&PersistedSettings::default()).is_err());
        broken.save(&PersistedSettings::default());
        assert_eq!(store.load(), PersistedSettings::default());
    }
}
