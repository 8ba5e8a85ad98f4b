//! Error types for the alt text suggestion pipeline.
//!
//! Errors are split by concern: configuration loading, and the suggestion
//! call chain itself. Every variant carries enough context (subject id,
//! provider name, status code) to be reported without the original call site.

use thiserror::Error;

/// Top-level error type for alttext operations.
#[derive(Error, Debug)]
pub enum AltTextError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Suggestion pipeline errors
    #[error("Suggestion error: {0}")]
    Suggest(#[from] SuggestError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The persisted settings record could not be read or written
    #[error("Settings record error: {0}")]
    SettingsError(String),
}

/// Errors raised while producing a single suggestion.
#[derive(Error, Debug)]
pub enum SuggestError {
    /// Missing or invalid provider descriptor or credential
    #[error("{0}")]
    Configuration(String),

    /// Unknown subject, or a subject that is not an attachment
    #[error("Subject {id} not found: {reason}")]
    NotFound { id: u64, reason: String },

    /// Network or HTTP failure talking to a provider
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The media library or metadata store failed
    #[error("Media library error: {0}")]
    Library(String),
}

impl SuggestError {
    /// Stable machine-readable kind, used in structured error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SuggestError::Configuration(_) => "configuration",
            SuggestError::NotFound { .. } => "not_found",
            SuggestError::Transport { .. } => "transport",
            SuggestError::Library(_) => "library",
        }
    }

    /// Upstream HTTP status, when the failure came from a provider response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SuggestError::Transport { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Convenience type alias for alttext results.
pub type Result<T> = std::result::Result<T, AltTextError>;

/// Convenience type alias for suggestion results.
pub type SuggestResult<T> = std::result::Result<T, SuggestError>;
