//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the places API key, search parameters, and the last used
//! email.
//!
//! Configuration is stored at `~/.config/fillup/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "fillup";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured places API key.
const API_KEY_ENV: &str = "FILLUP_PLACES_API_KEY";

/// Default nearby-search radius in meters.
const DEFAULT_SEARCH_RADIUS_M: u32 = 10_000;

fn default_search_radius() -> u32 {
    DEFAULT_SEARCH_RADIUS_M
}

fn default_region() -> String {
    "NG".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub places_api_key: Option<String>,
    #[serde(default = "default_search_radius")]
    pub search_radius_m: u32,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            places_api_key: None,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            region: default_region(),
            language: default_language(),
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The places API key, preferring the environment override.
    pub fn places_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.places_api_key.clone())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
