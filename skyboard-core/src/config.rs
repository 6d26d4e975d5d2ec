use anyhow::{Context, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{error::WeatherError, model::Coordinates};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Value shipped in sample configs; treated the same as no key at all.
const PLACEHOLDER_KEY: &str = "YOUR_OPENWEATHER_API_KEY_HERE";

/// Display preference for temperatures. The core always works in metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn temperature(&self, celsius: f64) -> f64 {
        match self {
            Units::Metric => celsius,
            Units::Imperial => crate::units::celsius_to_fahrenheit(celsius),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Base URLs of the OpenWeather APIs, without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub weather_base_url: String,
    pub air_quality_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            air_quality_base_url: "http://api.openweathermap.org/data/2.5".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at one base URL, e.g. a local mock server.
    pub fn single(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            weather_base_url: base.clone(),
            air_quality_base_url: base,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
///
/// [home]
/// lat = 35.68
/// lon = 139.69
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Units,
    pub theme: Theme,
    /// Position reported by the configured geolocator.
    pub home: Option<Coordinates>,
    pub endpoints: Endpoints,
}

impl Config {
    /// The API key, or a configuration error when it is missing, blank, or
    /// still the sample placeholder.
    pub fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && *k != PLACEHOLDER_KEY)
            .ok_or_else(|| {
                WeatherError::Configuration(
                    "API key is not configured. Please add your OpenWeather API key.\n\
                     Hint: run `skyboard configure` or set OPENWEATHER_API_KEY."
                        .to_string(),
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Apply an API key from the environment if one is set.
    pub fn with_env_override(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// The `OPENWEATHER_API_KEY` environment variable wins over the file.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            // First run: no config file, return empty.
            Self::default()
        };

        Ok(cfg.with_env_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> anyhow::Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyboard", "skyboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
