//! Configuration management for alttext.
//!
//! Configuration is loaded from the platform config directory
//! (`config.toml`) with sensible defaults, then merged once with the persisted
//! settings record (`settings.json` next to it). The merged [`Config`] is
//! immutable for the rest of the process.

mod settings;
mod types;
mod validate;

pub use settings::{merge_overrides, PersistedSettings, SettingsStore, SettingsUpdate};
pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Root configuration structure for alttext.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Prompt rendering settings
    pub prompt: PromptConfig,

    /// Image delivery settings
    pub vision: VisionConfig,

    /// Network limits
    pub limits: LimitsConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Provider descriptors keyed by provider name
    pub providers: BTreeMap<String, ProviderDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert("openai".to_string(), ProviderDescriptor::openai());
        providers.insert("anthropic".to_string(), ProviderDescriptor::anthropic());

        Self {
            general: GeneralConfig::default(),
            prompt: PromptConfig::default(),
            vision: VisionConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
            providers,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse, normalize and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load the config file and apply the persisted settings record on top.
    ///
    /// This is the configuration every command runs with.
    pub fn load_effective() -> Result<Self, ConfigError> {
        let base = Self::load()?;
        let persisted = SettingsStore::new(Self::settings_path()).load()?;
        Ok(merge_overrides(&base, persisted.as_ref()))
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.alttext.alttext/config.toml
    /// - Linux: ~/.config/alttext/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\alttext\config\config.toml
    ///
    /// Falls back to ~/.alttext/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Path of the persisted settings record.
    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    fn config_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "alttext", "alttext")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".alttext")
            })
    }

    /// Get the resolved media library path (with ~ expansion).
    pub fn library_path(&self) -> PathBuf {
        let path_str = self.general.library.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
