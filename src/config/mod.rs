use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::clock::DEFAULT_REFRESH;

fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH.as_secs()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// How often the dashboard clock is resampled
    #[serde(default = "default_refresh_secs")]
    pub clock_refresh_secs: u64,

    /// Offset applied to calendar dates, in minutes east of UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Snapshot to open when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    /// Show USD values under token balances
    #[serde(default = "default_true")]
    pub show_usd: bool,

    /// Color overrides by role name ("accent" = "#ffc107")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theme: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clock_refresh_secs: default_refresh_secs(),
            utc_offset_minutes: 0,
            snapshot_path: None,
            show_usd: true,
            theme: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("govboard");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Leave a broken file alone so the user can fix it
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(&path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let mut theme = BTreeMap::new();
        theme.insert("accent".to_string(), "#ffc107".to_string());
        let config = AppConfig {
            clock_refresh_secs: 10,
            utc_offset_minutes: 120,
            snapshot_path: Some(PathBuf::from("/tmp/dashboard.json")),
            show_usd: false,
            theme,
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::parse("utc_offset_minutes = -300\n").unwrap();
        assert_eq!(config.clock_refresh_secs, 30);
        assert_eq!(config.utc_offset_minutes, -300);
        assert!(config.show_usd);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = AppConfig {
            clock_refresh_secs: 5,
            ..AppConfig::default()
        };
        config.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(AppConfig::parse(&content).unwrap(), config);
    }
}
