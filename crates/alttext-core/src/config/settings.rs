//! Persisted settings record and its merge into the process configuration.
//!
//! The record is a small JSON document edited by `alttext settings`. It is
//! read once at startup and folded into the base [`Config`] by
//! [`merge_overrides`]; nothing mutates the merged config afterwards.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{clamp_max_words, Config, PromptConfig, VisionMode};

/// The persisted override record.
///
/// Every field is optional so that older or hand-edited records still load.
/// Values are sanitized when written through [`PersistedSettings::apply`] and
/// again when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_verbatim_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_mode: Option<String>,
}

/// A partial edit submitted by a user. Unset fields keep their stored value.
pub type SettingsUpdate = PersistedSettings;

impl PersistedSettings {
    /// The values a freshly saved record starts from.
    pub fn defaults() -> Self {
        let prompt = PromptConfig::default();
        Self {
            custom_instructions: Some(prompt.custom_instructions),
            tone: Some(prompt.tone),
            max_words: Some(prompt.max_words as i64),
            force_verbatim_text: Some(prompt.force_verbatim_text),
            vision_enabled: Some(false),
            vision_mode: Some(VisionMode::Auto.to_string()),
        }
    }

    /// Apply `update` on top of this record and return a complete, sanitized record.
    ///
    /// `max_words` is clamped to [5, 60]; an unrecognized `vision_mode`
    /// falls back to `auto`; a blank tone falls back to the default tone.
    pub fn apply(&self, update: &SettingsUpdate) -> Self {
        let defaults = Self::defaults();
        let pick = |new: &Option<String>, old: &Option<String>, default: &Option<String>| {
            new.clone().or_else(|| old.clone()).or_else(|| default.clone())
        };

        let tone = pick(&update.tone, &self.tone, &defaults.tone)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or(defaults.tone.clone());

        let custom_instructions = pick(
            &update.custom_instructions,
            &self.custom_instructions,
            &defaults.custom_instructions,
        )
        .map(|c| c.trim().to_string());

        let max_words = update
            .max_words
            .or(self.max_words)
            .or(defaults.max_words)
            .map(|w| clamp_max_words(w) as i64);

        let vision_mode = pick(&update.vision_mode, &self.vision_mode, &defaults.vision_mode)
            .and_then(|m| VisionMode::parse(&m))
            .unwrap_or_default()
            .to_string();

        Self {
            custom_instructions,
            tone,
            max_words,
            force_verbatim_text: update
                .force_verbatim_text
                .or(self.force_verbatim_text)
                .or(defaults.force_verbatim_text),
            vision_enabled: update
                .vision_enabled
                .or(self.vision_enabled)
                .or(defaults.vision_enabled),
            vision_mode: Some(vision_mode),
        }
    }
}

/// Merge a persisted settings record into the base configuration.
///
/// Pure: returns a new config and leaves `base` untouched. Vision fields are
/// only taken from the record when it carries `vision_enabled`; an
/// unrecognized `vision_mode` keeps the base mode.
pub fn merge_overrides(base: &Config, persisted: Option<&PersistedSettings>) -> Config {
    let mut config = base.clone();
    let Some(settings) = persisted else {
        return config;
    };

    if let Some(tone) = settings.tone.as_deref().map(str::trim) {
        if !tone.is_empty() {
            config.prompt.tone = tone.to_string();
        }
    }
    if let Some(max_words) = settings.max_words {
        config.prompt.max_words = clamp_max_words(max_words);
    }
    if let Some(custom) = &settings.custom_instructions {
        config.prompt.custom_instructions = custom.trim().to_string();
    }
    if let Some(verbatim) = settings.force_verbatim_text {
        config.prompt.force_verbatim_text = verbatim;
    }

    if let Some(enabled) = settings.vision_enabled {
        config.vision.enabled = enabled;
        if let Some(raw) = settings.vision_mode.as_deref().filter(|m| !m.trim().is_empty()) {
            match VisionMode::parse(raw) {
                Some(mode) => config.vision.mode = mode,
                None => tracing::warn!(
                    "Ignoring unrecognized vision_mode '{raw}', keeping '{}'",
                    config.vision.mode
                ),
            }
        }
    }

    config
}

/// File-backed store for the settings record.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record. A missing file means "no overrides".
    pub fn load(&self) -> Result<Option<PersistedSettings>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let settings = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SettingsError(format!("{}: {e}", self.path.display()))
        })?;
        Ok(Some(settings))
    }

    /// Write the record, creating the parent directory if needed.
    pub fn save(&self, settings: &PersistedSettings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| ConfigError::SettingsError(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("Settings saved to {}", self.path.display());
        Ok(())
    }

    /// Apply a partial update to the stored record (or the defaults) and save it.
    pub fn update(&self, update: &SettingsUpdate) -> Result<PersistedSettings, ConfigError> {
        let current = self.load()?.unwrap_or_default();
        let next = current.apply(update);
        self.save(&next)?;
        Ok(next)
    }

    /// Delete the record, reverting to process defaults.
    ///
    /// Returns whether a record existed.
    pub fn reset(&self) -> Result<bool, ConfigError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
