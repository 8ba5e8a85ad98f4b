//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Smallest accepted word budget for a suggestion.
pub const MIN_MAX_WORDS: u32 = 5;

/// Largest accepted word budget for a suggestion.
pub const MAX_MAX_WORDS: u32 = 60;

/// Clamp a requested word budget into `[MIN_MAX_WORDS, MAX_MAX_WORDS]`.
pub fn clamp_max_words(value: i64) -> u32 {
    value.clamp(MIN_MAX_WORDS as i64, MAX_MAX_WORDS as i64) as u32
}

/// Accept any integer for `max_words` and clamp it.
fn deserialize_max_words<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    let clamped = clamp_max_words(raw);
    if i64::from(clamped) != raw {
        tracing::warn!("prompt.max_words = {raw} is out of range, using {clamped}");
    }
    Ok(clamped)
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Provider key used when a request does not name one
    pub default_provider: String,

    /// Generate a suggestion when media is created or edited
    pub autosuggest_on_upload: bool,

    /// Also write primed suggestions into the primary alt text field
    pub auto_fill_empty_alt: bool,

    /// Media library manifest used by the CLI
    pub library: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            autosuggest_on_upload: false,
            auto_fill_empty_alt: false,
            library: PathBuf::from("~/.alttext/library.json"),
        }
    }
}

/// Prompt rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Word budget for the suggestion, clamped to [5, 60]
    #[serde(deserialize_with = "deserialize_max_words")]
    pub max_words: u32,

    /// Tone descriptor ("neutral and descriptive")
    pub tone: String,

    /// Extra instructions appended to the prompt (may be empty)
    pub custom_instructions: String,

    /// Ask the model to copy visible on-image text verbatim
    pub force_verbatim_text: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_words: 20,
            tone: "neutral and descriptive".to_string(),
            custom_instructions: String::new(),
            force_verbatim_text: false,
        }
    }
}

/// Preferred image delivery strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionMode {
    /// URL first, inline fallback
    #[default]
    Auto,
    /// URL first, inline fallback
    Url,
    /// Inline first, URL fallback
    Base64,
}

impl VisionMode {
    /// Parse a mode name (case-insensitive). Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "url" => Some(Self::Url),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for VisionMode {
    /// Unknown mode names fall back to `auto` with a warning.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_else(|| {
            tracing::warn!("vision.mode = {raw:?} is not recognized, using auto");
            Self::Auto
        }))
    }
}

impl fmt::Display for VisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisionMode::Auto => write!(f, "auto"),
            VisionMode::Url => write!(f, "url"),
            VisionMode::Base64 => write!(f, "base64"),
        }
    }
}

/// Vision (image delivery) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Attach the image to the provider request
    pub enabled: bool,

    /// Delivery preference
    pub mode: VisionMode,

    /// Largest file that may be inlined as base64
    pub max_inline_bytes: u64,

    /// HEAD-probe candidate URLs before sending them
    pub verify_url_reachable: bool,

    /// Public host substituted for local/private hosts ("cdn.example.com")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_host: Option<String>,

    /// Scheme used with `public_host`
    pub public_scheme: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: VisionMode::Auto,
            max_inline_bytes: 1_500_000,
            verify_url_reachable: false,
            public_host: None,
            public_scheme: "https".to_string(),
        }
    }
}

/// Network limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Provider request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Reachability probe timeout in milliseconds
    pub probe_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 20_000,
            probe_timeout_ms: 5_000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// One configured LLM provider.
///
/// Empty `model`/`endpoint` and a missing `max_tokens` fall back to the
/// defaults of the driver's client family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderDescriptor {
    /// Client family identifier ("openai", "anthropic"); defaults to the provider key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Full request URL
    pub endpoint: String,

    /// Completion token budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ProviderDescriptor {
    /// Chat-completions provider with the stock OpenAI settings.
    pub fn openai() -> Self {
        Self {
            driver: Some("openai".to_string()),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            max_tokens: Some(120),
        }
    }

    /// Messages provider with the stock Anthropic settings.
    pub fn anthropic() -> Self {
        Self {
            driver: Some("anthropic".to_string()),
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            max_tokens: Some(180),
        }
    }

    /// Driver identifier, falling back to the provider's own key.
    pub fn driver_or<'a>(&'a self, name: &'a str) -> &'a str {
        match self.driver.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_max_words() {
        assert_eq!(clamp_max_words(-3), 5);
        assert_eq!(clamp_max_words(0), 5);
        assert_eq!(clamp_max_words(4), 5);
        assert_eq!(clamp_max_words(20), 20);
        assert_eq!(clamp_max_words(61), 60);
        assert_eq!(clamp_max_words(10_000), 60);
    }

    #[test]
    fn test_vision_mode_parse() {
        assert_eq!(VisionMode::parse("URL"), Some(VisionMode::Url));
        assert_eq!(VisionMode::parse(" base64 "), Some(VisionMode::Base64));
        assert_eq!(VisionMode::parse("auto"), Some(VisionMode::Auto));
        assert_eq!(VisionMode::parse("inline"), None);
    }

    #[test]
    fn test_driver_falls_back_to_name() {
        let mut descriptor = ProviderDescriptor::default();
        assert_eq!(descriptor.driver_or("anthropic"), "anthropic");
        descriptor.driver = Some("openai".into());
        assert_eq!(descriptor.driver_or("azure"), "openai");
    }
}
