//! Integration tests for the settings file and app config
//!
//! These tests verify:
//! - ConfigManager writes and reads the YAML app config
//! - The settings file round-trips through SettingsStore
//! - Corrupt or partial settings fall back to defaults
//! - State loaded from disk is what gets written back

use autoclicker::config::{ConfigManager, SettingsStore};
use autoclicker::models::{AppConfig, ClickRate, PersistedSettings, Theme};
use autoclicker::StateManager;
use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

fn temp_dir_path(temp_dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
}

#[test]
fn test_app_config_yaml_keys() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::new(temp_dir_path(&temp_dir)).unwrap();

    manager.save_app_config(&AppConfig::default()).unwrap();
    let yaml = fs::read_to_string(manager.app_config_path()).unwrap();

    assert!(yaml.contains("Settings File: auto_clicker_settings.txt"));
    assert!(yaml.contains("Countdown Seconds: 5"));
    assert!(yaml.contains("Log Directory: logs"));
    assert!(yaml.contains("Debug Mode: false"));
    assert!(yaml.contains("Console Logging: true"));
}

#[test]
fn test_config_manager_creates_nested_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir_path(&temp_dir).join("Auto Clicker Data");

    let manager = ConfigManager::new(&dir).unwrap();
    let config = manager.load_app_config().unwrap();

    assert!(dir.exists());
    assert_eq!(config.countdown_seconds, 5);
    assert_eq!(
        manager.app_config_path(),
        dir.join("Auto Clicker Config.yaml")
    );
}

#[test]
fn test_settings_file_format_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir_path(&temp_dir).join("auto_clicker_settings.txt");
    let store = SettingsStore::new(&path);

    store.save(&PersistedSettings {
        theme: Theme::Light,
        rate: ClickRate::from_cps(4.0).unwrap(),
    });

    assert_eq!(fs::read_to_string(&path).unwrap(), "False\n0.25\n");
}

#[test]
fn test_hand_written_settings_are_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir_path(&temp_dir).join("auto_clicker_settings.txt");
    fs::write(&path, "False\n0.5\n").unwrap();

    let settings = SettingsStore::new(&path).load();

    assert_eq!(settings.theme, Theme::Light);
    assert_eq!(settings.rate.delay_secs(), 0.5);
    assert_eq!(settings.rate.display_cps(), 2);
}

#[test]
fn test_corrupt_settings_fall_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir_path(&temp_dir).join("auto_clicker_settings.txt");
    let store = SettingsStore::new(&path);

    for contents in ["", "True", "maybe\n0.1\n", "False\nquick\n", "False\n0\n"] {
        fs::write(&path, contents).unwrap();
        assert!(store.try_load().is_err(), "accepted {contents:?}");
        assert_eq!(store.load(), PersistedSettings::default());
    }
}

#[test]
fn test_state_round_trip_through_disk() {
    let temp_dir = TempDir::new().unwrap();
    let store = SettingsStore::new(temp_dir_path(&temp_dir).join("settings.txt"));

    // First session: change both preferences, save on exit
    let first = StateManager::new();
    first.load_from_settings(&store.load());
    first.toggle_theme();
    first.set_rate(ClickRate::from_cps(25.0).unwrap(), "CPS set to 25");
    store.save(&first.persisted_settings());

    // Second session starts where the first left off
    let second = StateManager::new();
    second.load_from_settings(&store.load());
    let snapshot = second.snapshot();

    assert_eq!(snapshot.theme, Theme::Light);
    assert_eq!(snapshot.rate.delay_secs(), 0.04);
    assert_eq!(snapshot.rate_label(), "Clicks Per Second (1 - 1000): 25");
    assert_eq!(snapshot.status, "Ready");
}

#[test]
fn test_sub_floor_delay_is_raised_on_reload() {
    let temp_dir = TempDir::new().unwrap();
    let store = SettingsStore::new(temp_dir_path(&temp_dir).join("settings.txt"));

    store.save(&PersistedSettings {
        theme: Theme::Dark,
        rate: ClickRate::from_cps(5_000.0).unwrap(),
    });

    assert_eq!(store.load().rate.delay_secs(), 0.001);
}
