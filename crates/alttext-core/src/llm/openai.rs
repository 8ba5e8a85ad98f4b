//! Chat-completions client family (OpenAI and compatible endpoints).
//!
//! Without an image the user turn is the plain prompt string. With an image
//! the user turn becomes a content array: the prompt text, then an
//! `image_url` part carrying either the public URL or the inline data URI.

use super::provider::{
    parse_body, success_body, transport_error, AltTextClient, ClientSettings, GenerateOptions,
};
use crate::error::SuggestResult;
use crate::types::ImageSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 120;
const SYSTEM_PROMPT: &str = "You write concise, accessible alt text.";
const TEMPERATURE: f32 = 0.4;

/// Client for Chat Completions style APIs.
pub struct ChatCompletionsClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
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
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ChatContent>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    detail: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn user_content(prompt: &str, image: &ImageSource) -> MessageContent {
    let url = match image {
        ImageSource::None => return MessageContent::Text(prompt.to_string()),
        ImageSource::Url(url) => url,
        ImageSource::Base64(data_uri) => data_uri,
    };

    MessageContent::Parts(vec![
        ChatContent::Text {
            text: prompt.to_string(),
        },
        ChatContent::ImageUrl {
            image_url: ImageUrl {
                url: url.clone(),
                detail: "auto".to_string(),
            },
        },
    ])
}

#[async_trait]
impl AltTextClient for ChatCompletionsClient {
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

        let body = ChatRequest {
            model: self.model().to_string(),
            max_tokens: options
                .max_tokens
                .or(self.settings.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_content(prompt, &options.image),
                },
            ],
        };

        tracing::debug!(
            provider,
            model = self.model(),
            image = %options.image.mode(),
            "Sending chat completions request"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let text = success_body(provider, resp).await?;
        let chat_resp: ChatResponse = parse_body(provider, &text)?;

        let content = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
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
    fn test_text_only_content_is_plain_string() {
        let json = serde_json::to_value(user_content("Describe", &ImageSource::None)).unwrap();
        assert_eq!(json, serde_json::json!("Describe"));
    }

    #[test]
    fn test_url_image_part() {
        let image = ImageSource::Url("https://cdn.example.com/a.jpg".into());
        let json = serde_json::to_value(user_content("Describe", &image)).unwrap();
        assert_eq!(json[0]["type"], "text");
        assert_eq!(json[1]["type"], "image_url");
        assert_eq!(json[1]["image_url"]["url"], "https://cdn.example.com/a.jpg");
        assert_eq!(json[1]["image_url"]["detail"], "auto");
    }

    #[test]
    fn test_inline_image_part_carries_data_uri() {
        let image = ImageSource::Base64("data:image/png;base64,AAAA".into());
        let json = serde_json::to_value(user_content("Describe", &image)).unwrap();
        assert_eq!(json[1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_response_missing_content_defaults_empty() {
        let resp: ChatResponse = serde_json::from_str(r#"{"choices":[{"message":{}}]}"#).unwrap();
        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);
        assert_eq!(content, None);

        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_empty());
    }
}
