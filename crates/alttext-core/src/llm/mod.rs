//! LLM provider integration for alt text generation.
//!
//! Provides a client abstraction over provider families (chat-completions,
//! messages) and a registry that resolves configured provider names to
//! cached client instances.

pub(crate) mod anthropic;
pub(crate) mod openai;
pub(crate) mod provider;
pub(crate) mod registry;

pub use anthropic::MessagesClient;
pub use openai::ChatCompletionsClient;
pub use provider::{resolve_env_var, AltTextClient, ClientSettings, GenerateOptions};
pub use registry::{ClientFactory, ProviderRegistry, CHAT_COMPLETIONS_DRIVER, MESSAGES_DRIVER};
