//! Configuration file support for Nereid.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nereid/config.toml`.
//! Every section is optional; missing keys fall back to defaults.

use crate::{Error, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Inference window configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Recent logs the condition-risk scorer looks at (5 to 7)
    #[serde(default = "default_risk_log_window")]
    pub risk_log_window: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            risk_log_window: default_risk_log_window(),
        }
    }
}

/// Times of day (`HH:MM`) for planned reminders
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    #[serde(default = "default_tracking_reminder")]
    pub tracking_reminder: String,

    #[serde(default = "default_checkin_reminder")]
    pub checkin_reminder: String,

    #[serde(default = "default_wellbeing_reminder")]
    pub wellbeing_reminder: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            tracking_reminder: default_tracking_reminder(),
            checkin_reminder: default_checkin_reminder(),
            wellbeing_reminder: default_wellbeing_reminder(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("nereid")
}

fn default_risk_log_window() -> usize {
    crate::risk::DEFAULT_RISK_LOG_WINDOW
}

fn default_tracking_reminder() -> String {
    "20:00".into()
}

fn default_checkin_reminder() -> String {
    "09:00".into()
}

fn default_wellbeing_reminder() -> String {
    "12:00".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("nereid").join("config.toml")
    }

    /// Check values that have a fixed allowed range
    pub fn validate(&self) -> Result<()> {
        if !(5..=7).contains(&self.inference.risk_log_window) {
            return Err(Error::Config(format!(
                "risk_log_window must be between 5 and 7, got {}",
                self.inference.risk_log_window
            )));
        }

        for (key, value) in [
            ("tracking_reminder", &self.notifications.tracking_reminder),
            ("checkin_reminder", &self.notifications.checkin_reminder),
            ("wellbeing_reminder", &self.notifications.wellbeing_reminder),
        ] {
            NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
                Error::Config(format!("{} must be HH:MM, got {:?}: {}", key, value, e))
            })?;
        }

        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.inference.risk_log_window, 7);
        assert_eq!(config.notifications.tracking_reminder, "20:00");
        assert!(config.data.data_dir.ends_with("nereid"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[inference]
risk_log_window = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.inference.risk_log_window, 5);
        assert_eq!(config.notifications.checkin_reminder, "09:00"); // default
    }

    #[test]
    fn test_window_outside_policy_is_rejected() {
        let mut config = Config::default();
        config.inference.risk_log_window = 10;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_reminder_time_is_rejected() {
        let mut config = Config::default();
        config.notifications.wellbeing_reminder = "noon".into();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.inference.risk_log_window = 6;
        config.notifications.tracking_reminder = "21:30".into();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.inference.risk_log_window, 6);
        assert_eq!(loaded.notifications.tracking_reminder, "21:30");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[inference]\nrisk_log_window = 2\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
