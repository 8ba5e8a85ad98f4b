//! Suggestion pipeline components.
//!
//! - **context**: Build the per-request subject context from an attachment
//! - **postprocess**: Normalize raw provider output
//! - **suggest**: Orchestrates context, prompt, image source, provider and cleanup

pub mod context;
pub mod postprocess;
pub mod suggest;

pub use context::build_context;
pub use postprocess::sanitize_suggestion;
pub use suggest::SuggestionPipeline;
