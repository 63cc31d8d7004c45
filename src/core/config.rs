use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::scheduler::{Cadence, PerfMode};
use crate::error::PulseError;

/// Tools probed for availability when no list is configured.
pub const DEFAULT_TOOLS: [&str; 7] = ["nmap", "sqlmap", "hydra", "masscan", "gobuster", "nikto", "john"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base interval scaled by each task's fast multiplier
    pub fast_base_ms: u64,
    /// Base interval scaled by each task's slow multiplier
    pub slow_base_ms: u64,
    /// Extra multiplier applied to slow intervals while idle
    pub slow_factor: u32,
    /// Timeout for each availability probe
    pub probe_timeout_ms: u64,
    /// How long a resolved public IP is reused
    pub public_ip_ttl_secs: u64,
    /// Binaries checked by the tools monitor
    pub tools: Vec<String>,
    /// Start in idle (slow) mode
    pub start_idle: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fast_base_ms: 1000,
            slow_base_ms: 1000,
            slow_factor: 5,
            probe_timeout_ms: 1500,
            public_ip_ttl_secs: 60,
            tools: DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect(),
            start_idle: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Ok(Self::load_from(&config_path))
    }

    /// Read config from `path`; missing, empty or corrupted files give defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }

        match fs::read_to_string(path) {
            Ok(data) if !data.trim().is_empty() => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::debug!("Ignoring malformed config {:?}: {}", path, e);
                Config::default()
            }),
            Ok(_) => Config::default(),
            Err(e) => {
                log::debug!("Ignoring unreadable config {:?}: {}", path, e);
                Config::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("pulsemon").join("config.json"))
    }

    /// Reject values that would make the scheduler spin or never fire.
    pub fn validate(&self) -> std::result::Result<(), PulseError> {
        if self.fast_base_ms == 0 || self.slow_base_ms == 0 {
            return Err(PulseError::config("base intervals must be greater than zero"));
        }
        if self.slow_factor == 0 {
            return Err(PulseError::config("slow_factor must be at least 1"));
        }
        if self.probe_timeout_ms == 0 {
            return Err(PulseError::config("probe_timeout_ms must be greater than zero"));
        }
        if self.public_ip_ttl_secs == 0 {
            return Err(PulseError::config("public_ip_ttl_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn cadence(&self) -> Cadence {
        Cadence {
            fast_base: Duration::from_millis(self.fast_base_ms),
            slow_base: Duration::from_millis(self.slow_base_ms),
        }
    }

    pub fn initial_mode(&self) -> PerfMode {
        PerfMode {
            active: !self.start_idle,
            slow_factor: self.slow_factor,
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn public_ip_ttl(&self) -> Duration {
        Duration::from_secs(self.public_ip_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tools.len(), 7);
        assert!(config.initial_mode().active);
        assert_eq!(config.cadence().slow(1.5), Duration::from_millis(1500));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            slow_factor: 3,
            start_idle: true,
            tools: vec!["nmap".into()],
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"slow_factor": 10}"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.slow_factor, 10);
        assert_eq!(config.fast_base_ms, 1000);
    }

    #[test]
    fn test_corrupted_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{{{").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());

        fs::write(&path, "").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = Config {
            slow_factor: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PulseError::Config(_))));

        let config = Config {
            fast_base_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
