//! Core data types for the suggestion pipeline.
//!
//! These types flow between the pipeline stages: the subject context that
//! feeds the prompt, the image source attached to the provider request, and
//! the result handed back to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Everything known about the image a suggestion is generated for.
///
/// Built once per suggestion request and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectContext {
    pub attachment_id: u64,
    pub title: String,
    pub caption: String,
    pub description: String,
    /// Alt text already stored for the attachment, if any
    pub existing_alt: String,
    /// File name including extension ("sunset.jpg")
    pub file_name: String,
    /// File name without extension ("sunset")
    pub short_file_name: String,
    pub mime_type: String,
    /// Publicly served URL of the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    /// Local path to the original file, when the library has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_file_path: Option<PathBuf>,
    /// Summary of the post the attachment belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentSummary>,
}

/// Short summary of the content an attachment is attached to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentSummary {
    pub id: u64,
    pub post_type: String,
    pub title: String,
    pub excerpt: String,
    pub permalink: String,
}

/// How the image is delivered to the provider, if at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ImageSource {
    /// Text-only prompt
    #[default]
    None,
    /// Publicly reachable URL reference
    Url(String),
    /// Inline `data:<mime>;base64,<bytes>` URI
    Base64(String),
}

impl ImageSource {
    /// The delivery mode this source represents.
    pub fn mode(&self) -> ImageMode {
        match self {
            ImageSource::None => ImageMode::None,
            ImageSource::Url(_) => ImageMode::Url,
            ImageSource::Base64(_) => ImageMode::Base64,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ImageSource::None)
    }
}

/// Delivery mode actually used for a suggestion (for observability).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    #[default]
    None,
    Url,
    Base64,
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageMode::None => write!(f, "none"),
            ImageMode::Url => write!(f, "url"),
            ImageMode::Base64 => write!(f, "base64"),
        }
    }
}

/// The output of a successful suggestion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    /// Post-processed alt text. Empty means the image is decorative.
    pub suggestion: String,
    /// Name of the provider that produced it
    pub provider: String,
    /// Exact prompt sent to the provider (for preview and audit)
    pub prompt: String,
    /// How the image was delivered
    pub image_mode: ImageMode,
}
