//! Configuration management for minutebook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "minutebook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "minutes.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `MINUTEBOOK_`, `__` between levels)
/// 2. `OPENAI_API_KEY` / `OPENAI_MODEL`
/// 3. TOML config file at `~/.config/minutebook/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Text-improvement service configuration.
    pub assist: AssistConfig,
    /// Rendered document configuration.
    pub document: DocumentConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/minutebook/minutes.db`
    pub database_path: Option<PathBuf>,
}

/// Text-improvement service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// Use the external service when a key is available.
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible API.
    pub endpoint: String,
    /// API key. External mode is off without one.
    pub api_key: Option<String>,
    /// Chat model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on one request, in seconds.
    pub timeout_secs: u64,
}

/// Rendered document configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Label printed in the top-right corner of the header band.
    pub confidential_label: String,
    /// Text appended to the page number in the footer.
    pub footer_text: String,
    /// Prefix of generated file names (`<prefix>_<date>.pdf`).
    pub filename_prefix: String,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout_secs: 20,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            confidential_label: "Confidential Document".to_string(),
            footer_text: "Enterprise Meeting Minutes System".to_string(),
            filename_prefix: "meeting_minutes".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Self::openai_env())
            .merge(Env::prefixed("MINUTEBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The conventional OpenAI variables, mapped onto `[assist]`.
    fn openai_env() -> Env {
        Env::raw()
            .only(&["OPENAI_API_KEY", "OPENAI_MODEL"])
            .map(|key| {
                if key.as_str().eq_ignore_ascii_case("OPENAI_MODEL") {
                    "assist.model".into()
                } else {
                    "assist.api_key".into()
                }
            })
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.assist.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "assist.timeout_secs must be greater than 0".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.assist.temperature) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "assist.temperature must be between 0 and 2 (got {})",
                    self.assist.temperature
                ),
            });
        }

        let endpoint = self.assist.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("assist.endpoint must be an http(s) URL: {endpoint}"),
            });
        }

        if self.document.filename_prefix.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "document.filename_prefix must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Whether the external text-improvement service should be used.
    #[must_use]
    pub fn external_assist_enabled(&self) -> bool {
        self.assist.enabled
            && self
                .assist
                .api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty())
    }

    /// Get the assist request timeout as a Duration.
    #[must_use]
    pub fn assist_timeout(&self) -> Duration {
        Duration::from_secs(self.assist.timeout_secs)
    }
}
