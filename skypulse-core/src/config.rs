use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::events::TOAST_TTL;

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1";
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Remote endpoints and request shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Set to an empty string to skip the air-quality lookup.
    pub air_quality_url: String,
    pub language: String,
    pub suggestion_count: u8,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            air_quality_url: DEFAULT_AIR_QUALITY_URL.to_string(),
            language: "en".to_string(),
            suggestion_count: 5,
            timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// All endpoints rooted at one base URL (handy for mock servers).
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            geocoding_url: base.to_string(),
            forecast_url: base.to_string(),
            air_quality_url: base.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// When false, position requests fail as permission-denied.
    pub enabled: bool,
    pub ip_lookup_url: String,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub suggestion_debounce_ms: u64,
    pub toast_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            suggestion_debounce_ms: 300,
            toast_secs: TOAST_TTL.as_secs(),
        }
    }
}

impl UiConfig {
    pub fn suggestion_debounce(&self) -> Duration {
        Duration::from_millis(self.suggestion_debounce_ms)
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [api]
/// language = "de"
///
/// [geolocation]
/// enabled = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Overrides the location of the key-value storage file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    pub api: ApiConfig,
    pub geolocation: GeolocationConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skypulse", "skypulse")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where recent searches, favorites and preferences live.
    pub fn storage_file_path(&self) -> Result<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("storage.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_open_meteo() {
        let cfg = Config::default();
        assert_eq!(cfg.api.suggestion_count, 5);
        assert_eq!(cfg.api.language, "en");
        assert_eq!(cfg.ui.suggestion_debounce(), Duration::from_millis(300));
        assert_eq!(cfg.ui.toast_ttl(), TOAST_TTL);
        assert!(cfg.geolocation.enabled);
    }

    #[test]
    fn retired_forecast_days_key_is_ignored() {
        let cfg: Config = toml::from_str(
            r#"
            [api]
            forecast_days = 14
            suggestion_count = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api.suggestion_count, 3);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [api]
            language = "de"

            [geolocation]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api.language, "de");
        assert_eq!(cfg.api.forecast_url, DEFAULT_FORECAST_URL);
        assert!(!cfg.geolocation.enabled);
        assert_eq!(cfg.ui, UiConfig::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");

        let mut cfg = Config::default();
        cfg.api.language = "fr".to_string();
        cfg.storage_path = Some(dir.path().join("storage.json"));
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.storage_file_path().unwrap(), dir.path().join("storage.json"));
    }

    #[test]
    fn base_url_override_strips_trailing_slash() {
        let api = ApiConfig::with_base_url("http://127.0.0.1:9999/");
        assert_eq!(api.geocoding_url, "http://127.0.0.1:9999");
        assert_eq!(api.forecast_url, "http://127.0.0.1:9999");
    }
}
