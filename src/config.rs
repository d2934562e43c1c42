use crate::guard::RECHECK_DELAY_MS;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Guard
    pub recheck_delay: Duration,

    // Persisted state
    pub state_file: PathBuf,

    // Engine
    pub legacy_codes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recheck_delay: Duration::from_millis(RECHECK_DELAY_MS),
            state_file: PathBuf::from("data/guard_state.json"),
            legacy_codes: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let recheck_delay = match std::env::var("RECHECK_DELAY_MS") {
            Ok(value) => Duration::from_millis(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("RECHECK_DELAY_MS is not a number: {:?}", value))?,
            ),
            Err(_) => defaults.recheck_delay,
        };

        Ok(Self {
            recheck_delay,

            state_file: std::env::var("GUARD_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_file),

            legacy_codes: std::env::var("GUARD_LEGACY_CODES")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.legacy_codes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("RECHECK_DELAY_MS");
        std::env::remove_var("GUARD_STATE_FILE");
        std::env::remove_var("GUARD_LEGACY_CODES");
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("defaults should load");

        assert_eq!(config.recheck_delay, Duration::from_millis(1000));
        assert_eq!(config.state_file, PathBuf::from("data/guard_state.json"));
        assert!(!config.legacy_codes);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("RECHECK_DELAY_MS", "250");
        std::env::set_var("GUARD_STATE_FILE", "/tmp/state.json");
        std::env::set_var("GUARD_LEGACY_CODES", "TRUE");

        let config = Config::from_env().expect("overrides should load");
        clear_env();

        assert_eq!(config.recheck_delay, Duration::from_millis(250));
        assert_eq!(config.state_file, PathBuf::from("/tmp/state.json"));
        assert!(config.legacy_codes);
    }

    #[test]
    #[serial]
    fn test_from_env_zero_delay_allowed() {
        clear_env();
        std::env::set_var("RECHECK_DELAY_MS", "0");

        let config = Config::from_env().expect("zero delay should load");
        clear_env();

        assert_eq!(config.recheck_delay, Duration::ZERO);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_delay() {
        clear_env();
        std::env::set_var("RECHECK_DELAY_MS", "soon");

        let result = Config::from_env();
        clear_env();

        let err = result.expect_err("non-numeric delay should fail");
        assert!(err.to_string().contains("RECHECK_DELAY_MS"));
    }

    #[test]
    #[serial]
    fn test_from_env_legacy_codes_false_values() {
        clear_env();
        std::env::set_var("GUARD_LEGACY_CODES", "no");

        let config = Config::from_env().expect("should load");
        clear_env();

        assert!(!config.legacy_codes);
    }
}
