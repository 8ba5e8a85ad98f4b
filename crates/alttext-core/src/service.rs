//! Inbound triggers: on-demand suggestion requests and upload priming.
//!
//! Both sit on top of [`SuggestionPipeline`] and are the only places that
//! write results back through [`MetadataStore`].

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SuggestError, SuggestResult};
use crate::library::MetadataStore;
use crate::pipeline::SuggestionPipeline;
use crate::types::SuggestionResult;

/// Error code returned when the caller lacks permission.
pub const FORBIDDEN_CODE: &str = "rest_forbidden";

/// Error code returned when a suggestion could not be produced.
pub const FAILURE_CODE: &str = "media_alt_suggestion_failed";

/// Permission a caller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May upload media and request suggestions
    UploadFiles,
    /// May change settings
    ManageOptions,
}

/// Who is making an on-demand request.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    capabilities: HashSet<Capability>,
}

impl Caller {
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// A caller holding every capability (local CLI use).
    pub fn trusted() -> Self {
        Self::new([Capability::UploadFiles, Capability::ManageOptions])
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// On-demand request for one attachment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub subject_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Failure reply of an on-demand request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub status: u16,
    /// Error kind (`configuration`, `not_found`, ...) when a suggestion failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorResponse {
    fn forbidden() -> Self {
        Self {
            code: FORBIDDEN_CODE.to_string(),
            message: "Sorry, you are not allowed to do that.".to_string(),
            status: 403,
            kind: None,
        }
    }

    fn failed(err: &SuggestError) -> Self {
        Self {
            code: FAILURE_CODE.to_string(),
            message: err.to_string(),
            status: 500,
            kind: Some(err.kind().to_string()),
        }
    }
}

/// Reply of an on-demand request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SuggestResponse {
    Ok(SuggestionResult),
    Err(ErrorResponse),
}

impl SuggestResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// HTTP-style status of the reply.
    pub fn status(&self) -> u16 {
        match self {
            Self::Ok(_) => 200,
            Self::Err(e) => e.status,
        }
    }
}

/// What priming did for one attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PrimeOutcome {
    /// `autosuggest_on_upload` is off
    Disabled,
    /// The attachment already has alt text
    HasAltText,
    /// The provider judged the image decorative; nothing stored
    Empty,
    /// Suggestion stored, and copied into the alt text when `auto_filled`
    Stored { suggestion: String, auto_filled: bool },
    /// Generation or storage failed; reported to the observer
    Failed { kind: String, message: String },
}

/// Receives failures that priming swallows.
pub trait GenerationObserver: Send + Sync {
    fn on_generation_failed(&self, subject_id: u64, error: &SuggestError);
}

/// Ignores failures.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {
    fn on_generation_failed(&self, _subject_id: u64, _error: &SuggestError) {}
}

/// Logs failures at warn level.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl GenerationObserver for TracingObserver {
    fn on_generation_failed(&self, subject_id: u64, error: &SuggestError) {
        tracing::warn!(subject_id, kind = error.kind(), "Alt text generation failed: {error}");
    }
}

/// Entry point for both inbound triggers.
pub struct AltTextService {
    pipeline: Arc<SuggestionPipeline>,
    store: Arc<dyn MetadataStore>,
    observer: Arc<dyn GenerationObserver>,
}

impl AltTextService {
    pub fn new(pipeline: Arc<SuggestionPipeline>, store: Arc<dyn MetadataStore>) -> Self {
        Self {
            pipeline,
            store,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn GenerationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn pipeline(&self) -> &SuggestionPipeline {
        &self.pipeline
    }

    /// Handle an on-demand request.
    ///
    /// Never fails: every error becomes an [`ErrorResponse`].
    pub async fn handle_suggest(
        &self,
        caller: &Caller,
        request: &SuggestRequest,
    ) -> SuggestResponse {
        if !caller.can(Capability::UploadFiles) {
            tracing::debug!(subject_id = request.subject_id, "Caller may not upload files");
            return SuggestResponse::Err(ErrorResponse::forbidden());
        }

        match self.suggest_and_store(request).await {
            Ok(result) => SuggestResponse::Ok(result),
            Err(e) => {
                tracing::debug!(subject_id = request.subject_id, "Suggestion failed: {e}");
                SuggestResponse::Err(ErrorResponse::failed(&e))
            }
        }
    }

    async fn suggest_and_store(&self, request: &SuggestRequest) -> SuggestResult<SuggestionResult> {
        let result = self
            .pipeline
            .suggest(request.subject_id, request.provider.as_deref())
            .await?;
        if !result.suggestion.is_empty() {
            self.store
                .set_suggestion(request.subject_id, &result.suggestion)
                .await?;
        }
        Ok(result)
    }

    /// Prime a newly uploaded attachment.
    ///
    /// Runs only when autosuggest is on and the attachment has no alt text.
    /// Failures go to the observer instead of the caller.
    pub async fn prime(&self, subject_id: u64) -> PrimeOutcome {
        let general = &self.pipeline.config().general;
        if !general.autosuggest_on_upload {
            return PrimeOutcome::Disabled;
        }

        match self.prime_inner(subject_id, general.auto_fill_empty_alt).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.observer.on_generation_failed(subject_id, &e);
                PrimeOutcome::Failed {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn prime_inner(&self, subject_id: u64, auto_fill: bool) -> SuggestResult<PrimeOutcome> {
        if self.store.alt_text(subject_id).await?.is_some() {
            return Ok(PrimeOutcome::HasAltText);
        }

        let result = self.pipeline.suggest(subject_id, None).await?;
        if result.suggestion.is_empty() {
            return Ok(PrimeOutcome::Empty);
        }

        self.store.set_suggestion(subject_id, &result.suggestion).await?;
        if auto_fill {
            self.store.set_alt_text(subject_id, &result.suggestion).await?;
        }
        tracing::info!(subject_id, auto_filled = auto_fill, "Primed alt text suggestion");

        Ok(PrimeOutcome::Stored {
            suggestion: result.suggestion,
            auto_filled: auto_fill,
        })
    }
}
