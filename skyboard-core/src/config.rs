use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::DISTRICTS;

/// Settings for the regional observatory feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalConfig {
    #[serde(default = "default_regional_base_url")]
    pub base_url: String,

    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for RegionalConfig {
    fn default() -> Self {
        Self { base_url: default_regional_base_url(), lang: default_lang() }
    }
}

/// Settings for the global geocoding + forecast feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// How many geocoding candidates to ask for. Only the first is used.
    #[serde(default = "default_result_count")]
    pub result_count: u8,

    #[serde(default = "default_lang")]
    pub language: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            result_count: default_result_count(),
            language: default_lang(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// District shown after a regional refresh when none was picked.
    #[serde(default = "default_district")]
    pub default_district: String,

    /// chrono format string for the "last update" slot.
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { default_district: default_district(), time_format: default_time_format() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [regional]
/// lang = "en"
///
/// [display]
/// default_district = "Sha Tin"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub regional: RegionalConfig,

    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_regional_base_url() -> String {
    "https://data.weather.gov.hk/weatherAPI/opendata/weather.php".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

const fn default_result_count() -> u8 {
    10
}

fn default_district() -> String {
    DISTRICTS[0].to_string()
}

fn default_time_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
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
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skyboard", "skyboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Change the default district. Names outside the known list are rejected.
    pub fn set_default_district(&mut self, district: &str) -> Result<()> {
        if !DISTRICTS.contains(&district) {
            return Err(anyhow!(
                "Unknown district '{district}'.\n\
                 Hint: run `skyboard districts` to list the supported names."
            ));
        }

        self.display.default_district = district.to_string();
        Ok(())
    }
}
