//! Provider client trait and shared request plumbing.
//!
//! Defines the interface every client family implements, the per-client
//! settings resolved from a [`ProviderDescriptor`], and the helpers that
//! normalize transport failures into a single error shape.

use crate::config::ProviderDescriptor;
use crate::error::{SuggestError, SuggestResult};
use crate::types::ImageSource;
use async_trait::async_trait;
use std::time::Duration;

/// Per-call options for [`AltTextClient::generate_alt_text`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Completion token budget; falls back to the descriptor, then the family default
    pub max_tokens: Option<u32>,
    /// Image attached to the request (`ImageSource::None` for text-only)
    pub image: ImageSource,
}

/// Trait that all provider clients implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the registry hands out `Arc<dyn AltTextClient>`).
#[async_trait]
pub trait AltTextClient: Send + Sync {
    /// Configured provider name (e.g., "openai", "anthropic", "azure-eu").
    fn name(&self) -> &str;

    /// Send the prompt (and image, if any) and return the trimmed generated text.
    ///
    /// Returns an empty string when the response carries no text.
    async fn generate_alt_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> SuggestResult<String>;

    /// Per-request timeout for this client.
    fn timeout(&self) -> Duration;
}

/// Settings a client is constructed from.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Provider name the client reports
    pub name: String,
    /// Resolved API key (`None` when unset or the env var is missing)
    pub api_key: Option<String>,
    /// Model override (`None` uses the family default)
    pub model: Option<String>,
    /// Endpoint override (`None` uses the family default)
    pub endpoint: Option<String>,
    /// Descriptor token budget
    pub max_tokens: Option<u32>,
    /// Request timeout
    pub timeout: Duration,
}

impl ClientSettings {
    /// Resolve a descriptor into client settings.
    pub fn from_descriptor(name: &str, descriptor: &ProviderDescriptor, timeout: Duration) -> Self {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            name: name.to_string(),
            api_key: resolve_env_var(descriptor.api_key.trim()),
            model: non_empty(&descriptor.model),
            endpoint: non_empty(&descriptor.endpoint),
            max_tokens: descriptor.max_tokens,
            timeout,
        }
    }

    /// The API key, or a configuration error naming the provider.
    ///
    /// Clients call this before building any request.
    pub fn require_api_key(&self) -> SuggestResult<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SuggestError::Configuration(format!(
                "API key for provider '{}' is missing",
                self.name
            ))),
        }
    }

    /// Build the HTTP client used for every request of this provider.
    pub(crate) fn http_client(&self) -> SuggestResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                SuggestError::Configuration(format!(
                    "Failed to build HTTP client for '{}': {e}",
                    self.name
                ))
            })
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Split a `data:<mime>;base64,<payload>` URI into its mime type and payload.
pub fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    Some((mime, data))
}

/// Normalize a reqwest failure into a transport error.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> SuggestError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    SuggestError::Transport {
        provider: provider.to_string(),
        message,
        status_code: err.status().map(|s| s.as_u16()),
    }
}

/// Read a response body, turning non-2xx statuses into transport errors.
pub(crate) async fn success_body(provider: &str, resp: reqwest::Response) -> SuggestResult<String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        return Err(SuggestError::Transport {
            provider: provider.to_string(),
            message: format!("HTTP {status}: {}", body.trim()),
            status_code: Some(status.as_u16()),
        });
    }

    Ok(body)
}

/// Parse a JSON response body, mapping failures to a transport error.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(
    provider: &str,
    body: &str,
) -> SuggestResult<T> {
    serde_json::from_str(body).map_err(|e| SuggestError::Transport {
        provider: provider.to_string(),
        message: format!("Failed to parse response: {e}"),
        status_code: None,
    })
}
