//! Suggestion orchestration - wires together all stages.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::instrument;

use crate::config::Config;
use crate::error::{SuggestError, SuggestResult};
use crate::image_source::ImageSourceResolver;
use crate::library::{MediaLibrary, ATTACHMENT_POST_TYPE};
use crate::llm::{GenerateOptions, ProviderRegistry};
use crate::prompt::PromptBuilder;
use crate::types::{SubjectContext, SuggestionResult};

use super::context::build_context;
use super::postprocess::sanitize_suggestion;

/// Produces alt text suggestions for attachments.
///
/// Holds no per-request state; concurrent `suggest` calls are independent.
pub struct SuggestionPipeline {
    config: Arc<Config>,
    library: Arc<dyn MediaLibrary>,
    registry: Arc<ProviderRegistry>,
    resolver: ImageSourceResolver,
    prompt_builder: PromptBuilder,
}

impl SuggestionPipeline {
    pub fn new(
        config: Arc<Config>,
        library: Arc<dyn MediaLibrary>,
        registry: Arc<ProviderRegistry>,
        resolver: ImageSourceResolver,
    ) -> Self {
        Self {
            config,
            library,
            registry,
            resolver,
            prompt_builder: PromptBuilder::new(),
        }
    }

    /// Pipeline with the built-in provider families and an HTTP reachability probe.
    pub fn from_config(config: Arc<Config>, library: Arc<dyn MediaLibrary>) -> Self {
        let registry = Arc::new(ProviderRegistry::from_config(&config));
        let probe_timeout = Duration::from_millis(config.limits.probe_timeout_ms);
        let resolver = ImageSourceResolver::with_http_probe(probe_timeout);
        Self::new(config, library, registry, resolver)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Generate a suggestion for one attachment.
    ///
    /// `provider` overrides `general.default_provider` when non-empty.
    /// Nothing is persisted here; storing the result is up to the caller.
    #[instrument(skip(self), fields(image_mode = tracing::field::Empty))]
    pub async fn suggest(
        &self,
        subject_id: u64,
        provider: Option<&str>,
    ) -> SuggestResult<SuggestionResult> {
        let start = Instant::now();

        let context = self.load_context(subject_id).await?;

        let provider_name = provider
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.config.general.default_provider.as_str());
        let client = self.registry.driver(provider_name)?;

        let prompt = self.prompt_builder.build(&context, &self.config.prompt);
        let image = self.resolver.resolve(&context, &self.config.vision).await;
        let image_mode = image.mode();
        tracing::Span::current().record("image_mode", tracing::field::display(image_mode));

        let options = GenerateOptions {
            max_tokens: self.registry.max_tokens(provider_name),
            image,
        };
        let raw = client.generate_alt_text(&prompt, &options).await?;
        let suggestion = sanitize_suggestion(&raw, self.config.prompt.max_words);

        tracing::debug!(
            provider = client.name(),
            words = suggestion.split_whitespace().count(),
            "Suggestion generated in {:?}",
            start.elapsed()
        );

        Ok(SuggestionResult {
            suggestion,
            provider: client.name().to_string(),
            prompt,
            image_mode,
        })
    }

    /// Render the prompt a suggestion for `subject_id` would send, without
    /// calling any provider.
    pub async fn preview_prompt(&self, subject_id: u64) -> SuggestResult<String> {
        let context = self.load_context(subject_id).await?;
        Ok(self.prompt_builder.build(&context, &self.config.prompt))
    }

    async fn load_context(&self, subject_id: u64) -> SuggestResult<SubjectContext> {
        let attachment = match self.library.attachment(subject_id).await? {
            Some(a) if a.post_type == ATTACHMENT_POST_TYPE => a,
            Some(a) => {
                return Err(SuggestError::NotFound {
                    id: subject_id,
                    reason: format!("post type '{}' is not an attachment", a.post_type),
                })
            }
            None => {
                return Err(SuggestError::NotFound {
                    id: subject_id,
                    reason: "no such attachment".to_string(),
                })
            }
        };

        let parent = match attachment.parent {
            Some(parent_id) => self.library.summarize(parent_id).await?,
            None => None,
        };
        Ok(build_context(&attachment, parent))
    }
}
