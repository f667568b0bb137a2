use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory used when `--output` is not given
    #[serde(default)]
    pub output_dir: Option<String>,
    /// Cookie file path or browser name used when `--cookies` is not given
    #[serde(default)]
    pub cookie_source: Option<String>,
    /// Explicit yt-dlp binary, otherwise looked up on PATH
    #[serde(default)]
    pub yt_dlp_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path).map_err(|e| {
            KvError::config(format!("Failed to read config file {:?}: {}", config_path, e))
        })?;

        // An empty or corrupted file falls back to defaults
        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config file {:?}: {}", config_path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                KvError::config(format!("Failed to create config directory {:?}: {}", parent, e))
            })?;
        }

        let data = serde_json::to_string_pretty(self)?;

        fs::write(config_path, data).map_err(|e| {
            KvError::config(format!("Failed to write config file {:?}: {}", config_path, e))
        })?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| KvError::config("Could not determine config directory"))?;

        Ok(config_dir.join("keep-videos").join("config.json"))
    }

    pub fn set_output_dir(&mut self, path: String) {
        self.output_dir = Some(path);
    }

    pub fn get_output_dir(&self) -> Option<&String> {
        self.output_dir.as_ref()
    }

    pub fn set_cookie_source(&mut self, source: String) {
        self.cookie_source = Some(source);
    }

    pub fn get_cookie_source(&self) -> Option<&String> {
        self.cookie_source.as_ref()
    }

    pub fn set_yt_dlp_path(&mut self, path: String) {
        self.yt_dlp_path = Some(path);
    }

    pub fn get_yt_dlp_path(&self) -> Option<&String> {
        self.yt_dlp_path.as_ref()
    }
}
