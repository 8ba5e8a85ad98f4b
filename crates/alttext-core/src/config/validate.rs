//! Configuration normalization and validation.
//!
//! Values with a safe range are clamped; values with no safe default are
//! rejected.

use crate::error::ConfigError;

use super::{clamp_max_words, Config};

impl Config {
    /// Clamp out-of-range values into their accepted ranges.
    pub(crate) fn normalize(&mut self) {
        let clamped = clamp_max_words(self.prompt.max_words as i64);
        if clamped != self.prompt.max_words {
            tracing::warn!(
                "prompt.max_words = {} is out of range, using {clamped}",
                self.prompt.max_words
            );
            self.prompt.max_words = clamped;
        }
        self.vision.public_host = self
            .vision
            .public_host
            .take()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
    }

    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.general.default_provider.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "general.default_provider must not be empty".into(),
            ));
        }
        if self.vision.max_inline_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "vision.max_inline_bytes must be > 0".into(),
            ));
        }
        if !matches!(self.vision.public_scheme.as_str(), "http" | "https") {
            return Err(ConfigError::ValidationError(
                "vision.public_scheme must be \"http\" or \"https\"".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.probe_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.probe_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_normalize_clamps_max_words() {
        let mut config = Config::default();
        config.prompt.max_words = 0;
        config.normalize();
        assert_eq!(config.prompt.max_words, 5);

        config.prompt.max_words = 61;
        config.normalize();
        assert_eq!(config.prompt.max_words, 60);
    }

    #[test]
    fn test_normalize_drops_blank_public_host() {
        let mut config = Config::default();
        config.vision.public_host = Some("   ".into());
        config.normalize();
        assert_eq!(config.vision.public_host, None);
    }

    #[test]
    fn test_validate_rejects_zero_inline_bytes() {
        let mut config = Config::default();
        config.vision.max_inline_bytes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_inline_bytes"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_unknown_scheme() {
        let mut config = Config::default();
        config.vision.public_scheme = "ftp".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("public_scheme"));
    }
}
