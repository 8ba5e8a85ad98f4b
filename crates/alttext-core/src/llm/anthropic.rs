//! Messages client family (Anthropic Messages API).
//!
//! Sends the prompt as a text block followed by an image block. Inline images
//! become `base64` sources with the mime type taken from the data URI; URL
//! images become `url` sources.

use super::provider::{
    parse_body, split_data_uri, success_body, transport_error, AltTextClient, ClientSettings,
    GenerateOptions,
};
use crate::error::SuggestResult;
use crate::types::ImageSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_MAX_TOKENS: u32 = 180;
pub const API_VERSION: &str = "2023-06-01";
const SYSTEM_PROMPT: &str = "You write concise, accessible alt text. Keep it short.";

/// Client for the Messages API.
pub struct MessagesClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl MessagesClient {
    pub fn new(settings: ClientSettings) -> SuggestResult<Self> {
        let client = settings.http_client()?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> &str {
        self.settings.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn model(&self) -> &str {
        self.settings.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { source: BlockSource },
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum BlockSource {
    #[serde(rename = "base64")]
    Base64 { media_type: String, data: String },
    #[serde(rename = "url")]
    Url { url: String },
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    text: Option<String>,
}

fn content_blocks(prompt: &str, image: &ImageSource) -> Vec<ContentBlock> {
    let mut blocks = vec![ContentBlock::Text {
        text: prompt.to_string(),
    }];

    let source = match image {
        ImageSource::None => None,
        ImageSource::Url(url) => Some(BlockSource::Url { url: url.clone() }),
        ImageSource::Base64(value) => {
            let (media_type, data) = split_data_uri(value).unwrap_or_else(|| {
                tracing::warn!("Inline image is not a base64 data URI, assuming image/jpeg");
                ("image/jpeg", value.as_str())
            });
            Some(BlockSource::Base64 {
                media_type: media_type.to_string(),
                data: data.to_string(),
            })
        }
    };

    if let Some(source) = source {
        blocks.push(ContentBlock::Image { source });
    }

    blocks
}

#[async_trait]
impl AltTextClient for MessagesClient {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn generate_alt_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> SuggestResult<String> {
        let api_key = self.settings.require_api_key()?;
        let provider = self.name();

        let body = MessagesRequest {
            model: self.model().to_string(),
            max_tokens: options
                .max_tokens
                .or(self.settings.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: content_blocks(prompt, &options.image),
            }],
        };

        tracing::debug!(
            provider,
            model = self.model(),
            image = %options.image.mode(),
            "Sending messages request"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let text = success_body(provider, resp).await?;
        let messages_resp: MessagesResponse = parse_body(provider, &text)?;

        let content = messages_resp
            .content
            .into_iter()
            .next()
            .and_then(|c| c.text)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }

    fn timeout(&self) -> Duration {
        self.settings.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_has_single_block() {
        let json = serde_json::to_value(content_blocks("Describe", &ImageSource::None)).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["type"], "text");
        assert_eq!(json[0]["text"], "Describe");
    }

    #[test]
    fn test_url_source_is_reference() {
        let image = ImageSource::Url("https://cdn.example.com/a.jpg".into());
        let json = serde_json::to_value(content_blocks("Describe", &image)).unwrap();
        assert_eq!(json[1]["type"], "image");
        assert_eq!(json[1]["source"]["type"], "url");
        assert_eq!(json[1]["source"]["url"], "https://cdn.example.com/a.jpg");
        assert!(json[1]["source"].get("data").is_none());
    }

    #[test]
    fn test_inline_source_uses_declared_mime() {
        let image = ImageSource::Base64("data:image/webp;base64,UklGRg==".into());
        let json = serde_json::to_value(content_blocks("Describe", &image)).unwrap();
        assert_eq!(json[1]["source"]["type"], "base64");
        assert_eq!(json[1]["source"]["media_type"], "image/webp");
        assert_eq!(json[1]["source"]["data"], "UklGRg==");
    }
}
