//! Controller configuration

use crate::{source::DEFAULT_EXTENSIONS, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Period of the playback position sampler (milliseconds)
    pub progress_interval_ms: u64,
    /// Idle time before the overlay hides during playback (milliseconds)
    pub auto_hide_delay_ms: u64,
    /// Fraction of the maximum volume moved by one volume button press
    pub volume_step_fraction: f64,
    /// Accepted source container extensions, including the leading dot
    pub accepted_extensions: Vec<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 500,
            auto_hide_delay_ms: 5000,
            volume_step_fraction: 0.1,
            accepted_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ControllerConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ControllerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_interval_ms == 0 {
            return Err(Error::InvalidConfig("progress_interval_ms must be positive".into()));
        }
        if self.auto_hide_delay_ms == 0 {
            return Err(Error::InvalidConfig("auto_hide_delay_ms must be positive".into()));
        }
        if !(self.volume_step_fraction > 0.0 && self.volume_step_fraction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "volume_step_fraction must be in (0, 1], got {}",
                self.volume_step_fraction
            )));
        }
        if self.accepted_extensions.is_empty() {
            return Err(Error::InvalidConfig("accepted_extensions is empty".into()));
        }
        if let Some(bad) = self
            .accepted_extensions
            .iter()
            .find(|e| e.len() < 2 || !e.starts_with('.'))
        {
            return Err(Error::InvalidConfig(format!("bad extension {bad:?}")));
        }
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn auto_hide_delay(&self) -> Duration {
        Duration::from_millis(self.auto_hide_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.progress_interval(), Duration::from_millis(500));
        assert_eq!(config.auto_hide_delay(), Duration::from_secs(5));
        assert_eq!(config.volume_step_fraction, 0.1);
        assert_eq!(config.accepted_extensions, vec![".mp4", ".3gp", ".3gpp"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ControllerConfig::from_json_str(r#"{ "auto_hide_delay_ms": 2500 }"#).unwrap();
        assert_eq!(config.auto_hide_delay_ms, 2500);
        assert_eq!(config.progress_interval_ms, 500);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ControllerConfig::from_json_str("{ not json"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validation() {
        for json in [
            r#"{ "progress_interval_ms": 0 }"#,
            r#"{ "volume_step_fraction": 1.5 }"#,
            r#"{ "accepted_extensions": [] }"#,
            r#"{ "accepted_extensions": ["mp4"] }"#,
        ] {
            assert!(
                matches!(ControllerConfig::from_json_str(json), Err(Error::InvalidConfig(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(ControllerConfig::from_json_str(&config.to_json()).unwrap(), config);
    }
}
