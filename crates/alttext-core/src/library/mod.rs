//! Media library collaborators.
//!
//! The pipeline never talks to a content store directly. It reads subjects
//! through [`MediaLibrary`] and the inbound triggers write results through
//! [`MetadataStore`]. [`ManifestLibrary`] implements both over a JSON file.

mod manifest;
mod summary;

pub use manifest::{Manifest, ManifestLibrary, ManifestPost};
pub use summary::{strip_tags, summarize_post, trim_words, EXCERPT_WORDS};

use crate::error::SuggestResult;
use crate::types::ParentSummary;
use async_trait::async_trait;
use std::path::PathBuf;

/// Post type of media items.
pub const ATTACHMENT_POST_TYPE: &str = "attachment";

/// Metadata key of the primary alt text field.
pub const ALT_TEXT_KEY: &str = "alt_text";

/// Metadata key of the stored (not yet applied) suggestion.
pub const SUGGESTION_KEY: &str = "alt_suggestion";

/// A media item as the library stores it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub id: u64,
    /// "attachment" for media items; anything else is not a valid subject
    pub post_type: String,
    pub title: String,
    pub caption: String,
    pub description: String,
    pub alt_text: String,
    pub mime_type: String,
    pub url: Option<String>,
    pub file_path: Option<PathBuf>,
    /// Id of the post the attachment belongs to
    pub parent: Option<u64>,
}

/// Read access to subjects and their related content.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Look up a post by id. `None` when it does not exist.
    async fn attachment(&self, id: u64) -> SuggestResult<Option<Attachment>>;

    /// Summarize a related post for prompt context. `None` when it does not exist.
    async fn summarize(&self, post_id: u64) -> SuggestResult<Option<ParentSummary>>;
}

/// Write access to per-subject metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Current primary alt text, if any.
    async fn alt_text(&self, id: u64) -> SuggestResult<Option<String>>;

    /// Store a suggestion as auxiliary metadata.
    async fn set_suggestion(&self, id: u64, suggestion: &str) -> SuggestResult<()>;

    /// Overwrite the primary alt text.
    async fn set_alt_text(&self, id: u64, alt_text: &str) -> SuggestResult<()>;
}
