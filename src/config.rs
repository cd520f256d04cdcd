//! Application configuration read from the environment

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use app_state::MIN_SPLASH_DURATION;

/// Data directory override
pub const DATA_DIR_VAR: &str = "HUSTLEHUB_DATA_DIR";
/// Minimum splash duration override, in milliseconds
pub const SPLASH_MS_VAR: &str = "HUSTLEHUB_SPLASH_MS";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding preferences and the session file
    pub data_dir: PathBuf,
    /// Minimum time the splash screen stays up
    pub min_splash_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("hustlehub-data"),
            min_splash_duration: MIN_SPLASH_DURATION,
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var(DATA_DIR_VAR).ok(),
            std::env::var(SPLASH_MS_VAR).ok(),
        )
    }

    fn from_vars(data_dir: Option<String>, splash_ms: Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(ms) = splash_ms {
            let ms: u64 = ms
                .trim()
                .parse()
                .with_context(|| {
                    format!("{SPLASH_MS_VAR} must be a whole number of milliseconds, got {ms:?}")
                })?;
            config.min_splash_duration = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Preference database directory
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("hustlehub_preferences")
    }

    /// Session document path
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}
