//! AltText Core - Embeddable alt text suggestion library.
//!
//! AltText turns what a media library knows about an image (title, caption,
//! description, file name, the post it belongs to) plus the image itself into
//! a short, accessible alt text, using any configured LLM provider.
//!
//! # Architecture
//!
//! The pipeline has no storage of its own; the media library and metadata
//! store are collaborators behind traits:
//!
//! ```text
//! Attachment → Context → Prompt → Image source → Provider → Sanitize → Suggestion
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use alttext_core::{Config, ManifestLibrary, SuggestionPipeline};
//!
//! #[tokio::main]
//! async fn main() -> alttext_core::Result<()> {
//!     let config = Arc::new(Config::load_effective()?);
//!     let library = Arc::new(ManifestLibrary::open(config.library_path()).await?);
//!     let pipeline = SuggestionPipeline::from_config(config, library);
//!
//!     let result = pipeline.suggest(42, None).await?;
//!     println!("Alt: {}", result.suggestion);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod image_source;
pub mod library;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod service;
pub mod types;

// Re-exports for convenient access
pub use config::{merge_overrides, Config, PersistedSettings, SettingsStore};
pub use error::{AltTextError, ConfigError, Result, SuggestError, SuggestResult};
pub use image_source::{HttpProbe, ImageSourceResolver, ReachabilityProbe};
pub use library::{Attachment, ManifestLibrary, MediaLibrary, MetadataStore};
pub use llm::{AltTextClient, GenerateOptions, ProviderRegistry};
pub use output::{OutputFormat, RecordWriter};
pub use pipeline::SuggestionPipeline;
pub use prompt::PromptBuilder;
pub use service::{
    AltTextService, Caller, Capability, ErrorResponse, GenerationObserver, PrimeOutcome,
    SuggestRequest, SuggestResponse, TracingObserver,
};
pub use types::{ImageMode, ImageSource, ParentSummary, SubjectContext, SuggestionResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
