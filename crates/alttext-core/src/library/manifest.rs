//! JSON manifest media library.
//!
//! A manifest lists posts and attachments in one document:
//!
//! ```json
//! {
//!   "posts": [
//!     { "id": 3, "post_type": "post", "title": "Summer recap", "excerpt": "Highlights" },
//!     { "id": 7, "post_type": "attachment", "title": "Sunset over bay",
//!       "mime_type": "image/jpeg", "file_path": "images/sunset.jpg",
//!       "url": "https://example.com/uploads/sunset.jpg", "parent": 3 }
//!   ]
//! }
//! ```
//!
//! Relative file paths resolve against the manifest's directory. Metadata
//! writes are persisted back to the same file.

use super::{
    summarize_post, Attachment, MediaLibrary, MetadataStore, ALT_TEXT_KEY, SUGGESTION_KEY,
};
use crate::error::{SuggestError, SuggestResult};
use crate::types::ParentSummary;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// On-disk manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub posts: Vec<ManifestPost>,
}

/// One post or attachment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestPost {
    pub id: u64,
    pub post_type: String,
    pub title: String,
    /// Body (HTML allowed); the description for attachments
    pub content: String,
    pub excerpt: String,
    pub caption: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    pub meta: BTreeMap<String, String>,
}

/// Media library backed by a JSON manifest file.
pub struct ManifestLibrary {
    path: PathBuf,
    base_dir: PathBuf,
    manifest: RwLock<Manifest>,
}

impl ManifestLibrary {
    /// Load a manifest from disk.
    pub async fn open(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        let content = tokio::fs::read_to_string(&path).await?;
        let manifest: Manifest = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded {} posts from {}",
            manifest.posts.len(),
            path.display()
        );
        Ok(Self::from_manifest(manifest, path))
    }

    /// Wrap an in-memory manifest that persists to `path`.
    pub fn from_manifest(manifest: Manifest, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path,
            base_dir,
            manifest: RwLock::new(manifest),
        }
    }

    /// Ids of all attachments, in manifest order.
    pub async fn attachment_ids(&self) -> Vec<u64> {
        self.manifest
            .read()
            .await
            .posts
            .iter()
            .filter(|p| p.post_type == super::ATTACHMENT_POST_TYPE)
            .map(|p| p.id)
            .collect()
    }

    /// Read one metadata value.
    pub async fn meta(&self, id: u64, key: &str) -> Option<String> {
        self.manifest
            .read()
            .await
            .posts
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.meta.get(key).cloned())
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Persist one metadata value.
    ///
    /// The in-memory manifest only changes once the file has been replaced.
    async fn set_meta(&self, id: u64, key: &str, value: &str) -> SuggestResult<()> {
        let mut manifest = self.manifest.write().await;
        let mut updated = manifest.clone();
        let post = updated
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| SuggestError::NotFound {
                id,
                reason: "no such post in manifest".to_string(),
            })?;
        post.meta.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&updated)
            .map_err(|e| SuggestError::Library(e.to_string()))?;
        self.write_atomic(json).await?;

        *manifest = updated;
        tracing::debug!(id, key, "Stored metadata");
        Ok(())
    }

    /// Write to a sibling temp file, then rename over the manifest.
    async fn write_atomic(&self, json: String) -> SuggestResult<()> {
        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        let write_failed = |e: std::io::Error| {
            SuggestError::Library(format!("Failed to write {}: {e}", self.path.display()))
        };
        tokio::fs::write(&tmp, json).await.map_err(write_failed)?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_failed(e));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaLibrary for ManifestLibrary {
    async fn attachment(&self, id: u64) -> SuggestResult<Option<Attachment>> {
        let manifest = self.manifest.read().await;
        let Some(post) = manifest.posts.iter().find(|p| p.id == id) else {
            return Ok(None);
        };

        Ok(Some(Attachment {
            id: post.id,
            post_type: post.post_type.clone(),
            title: post.title.clone(),
            caption: post.caption.clone(),
            description: post.content.clone(),
            alt_text: post.meta.get(ALT_TEXT_KEY).cloned().unwrap_or_default(),
            mime_type: post.mime_type.clone(),
            url: post.url.clone(),
            file_path: post.file_path.as_deref().map(|p| self.resolve_path(p)),
            parent: post.parent.filter(|&p| p != 0),
        }))
    }

    async fn summarize(&self, post_id: u64) -> SuggestResult<Option<ParentSummary>> {
        let manifest = self.manifest.read().await;
        Ok(manifest
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(summarize_post))
    }
}

#[async_trait]
impl MetadataStore for ManifestLibrary {
    async fn alt_text(&self, id: u64) -> SuggestResult<Option<String>> {
        Ok(self
            .meta(id, ALT_TEXT_KEY)
            .await
            .filter(|alt| !alt.trim().is_empty()))
    }

    async fn set_suggestion(&self, id: u64, suggestion: &str) -> SuggestResult<()> {
        self.set_meta(id, SUGGESTION_KEY, suggestion).await
    }

    async fn set_alt_text(&self, id: u64, alt_text: &str) -> SuggestResult<()> {
        self.set_meta(id, ALT_TEXT_KEY, alt_text).await
    }
}
