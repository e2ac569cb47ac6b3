//! codesage configuration.
//!
//! User configuration for the model endpoint and output preferences.
//! Config file: ~/.config/codesage/config.toml (override with
//! $CODESAGE_CONFIG).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::model::DEFAULT_MODEL_URL;

/// Color display mode for rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Auto-detect based on terminal capabilities.
    Auto,
    /// No colors (plain text).
    None,
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Auto
    }
}

/// Local model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the Ollama-compatible service.
    #[serde(default = "default_url")]
    pub url: String,

    /// Model to run. When unset, picked from the installed list at startup.
    #[serde(default)]
    pub name: Option<String>,

    /// Client-side bound on one generation call (ms). There is no retry and
    /// no cancellation; a call that outlives this fails.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_num_predict")]
    pub num_predict: i32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_url() -> String {
    DEFAULT_MODEL_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_num_predict() -> i32 {
    1024
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            name: None,
            timeout_ms: default_timeout_ms(),
            temperature: default_temperature(),
            num_predict: default_num_predict(),
            top_p: default_top_p(),
        }
    }
}

/// Output preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,
}

/// Main codesage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SageConfig {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl SageConfig {
    /// Path of the user config file.
    pub fn user_config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("CODESAGE_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir().context("Cannot determine config directory")?;
        Ok(config_dir.join("codesage").join("config.toml"))
    }

    /// Load configuration from the user file, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::user_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: SageConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the user file.
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(&path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Apply one `key=value` setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "model.url" => self.model.url = value.trim_end_matches('/').to_string(),
            "model.name" => {
                self.model.name = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "model.timeout_ms" => {
                self.model.timeout_ms = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: '{}'", value))?;
            }
            "model.temperature" => {
                self.model.temperature = value
                    .parse()
                    .with_context(|| format!("Invalid temperature: '{}'", value))?;
            }
            "output.color" => {
                self.output.color = match value.to_lowercase().as_str() {
                    "auto" => ColorMode::Auto,
                    "none" | "off" => ColorMode::None,
                    _ => anyhow::bail!("Invalid color mode: '{}'. Valid values: auto, none", value),
                };
            }
            _ => anyhow::bail!(
                "Unknown config key: '{}'. Valid keys: model.url, model.name, \
                 model.timeout_ms, model.temperature, output.color",
                key
            ),
        }
        Ok(())
    }
}
