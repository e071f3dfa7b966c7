//! Property tests for rate parsing and persistence
//!
//! These tests verify:
//! - Every CPS in [1, 10000] is accepted and stored as 1 / cps
//! - Values outside the range and non-numeric input are rejected
//! - A stored delay survives a write/read of the settings file

use autoclicker::config::{format_settings, parse_settings};
use autoclicker::models::{ClickRate, MIN_DELAY_SECS, PersistedSettings, Theme};
use autoclicker::services::{CommandError, parse_rate};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_in_range_rate_is_inverse_of_cps(cps in 1.0f64..=10_000.0) {
        let rate = parse_rate(Some(&cps.to_string())).unwrap();
        prop_assert_eq!(rate.delay_secs(), 1.0 / cps);
    }

    #[test]
    fn prop_integer_rate_displays_unchanged(cps in 1u64..=1_000) {
        let rate = parse_rate(Some(&cps.to_string())).unwrap();
        prop_assert_eq!(rate.display_cps(), cps);
    }

    #[test]
    fn prop_out_of_range_rate_is_rejected(
        cps in prop_oneof![-1.0e6f64..1.0, 10_000.000_001f64..1.0e9]
    ) {
        prop_assert_eq!(
            parse_rate(Some(&cps.to_string())),
            Err(CommandError::Range(cps))
        );
    }

    #[test]
    fn prop_non_numeric_rate_is_a_parse_error(input in "[a-zA-Z][a-zA-Z ]{0,12}") {
        // "inf" and "nan" parse as floats
        prop_assume!(input.trim().parse::<f64>().is_err());
        prop_assert!(matches!(parse_rate(Some(&input)), Err(CommandError::Parse(_))));
    }

    #[test]
    fn prop_settings_file_preserves_delay(delay in MIN_DELAY_SECS..=10.0, dark in any::<bool>()) {
        let settings = PersistedSettings {
            theme: Theme::from_dark_flag(dark),
            rate: ClickRate::from_delay_secs(delay).unwrap(),
        };

        let reloaded = parse_settings(&format_settings(&settings)).unwrap();
        prop_assert_eq!(reloaded, settings);
    }
}
