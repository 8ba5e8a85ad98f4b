//! Provider registry: named descriptors to live, cached clients.
//!
//! Client families are looked up in a table keyed by driver identifier, so a
//! new wire protocol is one `register_family` call away and neither the
//! registry's lookup nor the pipeline changes.

use super::anthropic::MessagesClient;
use super::openai::ChatCompletionsClient;
use super::provider::{AltTextClient, ClientSettings};
use crate::config::{Config, ProviderDescriptor};
use crate::error::{SuggestError, SuggestResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Driver identifier of the chat-completions family.
pub const CHAT_COMPLETIONS_DRIVER: &str = "openai";

/// Driver identifier of the messages family.
pub const MESSAGES_DRIVER: &str = "anthropic";

/// Builds a client of one family from resolved settings.
pub type ClientFactory =
    Arc<dyn Fn(ClientSettings) -> SuggestResult<Arc<dyn AltTextClient>> + Send + Sync>;

/// Resolves provider names to clients, constructing each at most once.
pub struct ProviderRegistry {
    descriptors: BTreeMap<String, ProviderDescriptor>,
    families: HashMap<String, ClientFactory>,
    timeout: Duration,
    clients: Mutex<HashMap<String, Arc<dyn AltTextClient>>>,
}

impl ProviderRegistry {
    /// Create a registry with the built-in client families registered.
    pub fn new(descriptors: BTreeMap<String, ProviderDescriptor>, timeout: Duration) -> Self {
        let mut registry = Self {
            descriptors,
            families: HashMap::new(),
            timeout,
            clients: Mutex::new(HashMap::new()),
        };

        registry.register_family(
            CHAT_COMPLETIONS_DRIVER,
            Arc::new(
                |settings: ClientSettings| -> SuggestResult<Arc<dyn AltTextClient>> {
                    Ok(Arc::new(ChatCompletionsClient::new(settings)?))
                },
            ),
        );
        registry.register_family(
            MESSAGES_DRIVER,
            Arc::new(
                |settings: ClientSettings| -> SuggestResult<Arc<dyn AltTextClient>> {
                    Ok(Arc::new(MessagesClient::new(settings)?))
                },
            ),
        );

        registry
    }

    /// Create a registry from the `[providers]` section of the config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.providers.clone(),
            Duration::from_millis(config.limits.request_timeout_ms),
        )
    }

    /// Register (or replace) a client family under a driver identifier.
    pub fn register_family(&mut self, driver: &str, factory: ClientFactory) -> &mut Self {
        self.families.insert(driver.to_string(), factory);
        self
    }

    /// Get the client for a provider name.
    ///
    /// The first call constructs and caches the client; later calls return
    /// the same instance. Construction happens under the cache lock, so
    /// concurrent first access never builds two clients.
    pub fn driver(&self, name: &str) -> SuggestResult<Arc<dyn AltTextClient>> {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = clients.get(name) {
            return Ok(client.clone());
        }

        let descriptor = self.descriptors.get(name).ok_or_else(|| {
            SuggestError::Configuration(format!("Provider [{name}] is not configured."))
        })?;
        let driver = descriptor.driver_or(name);
        let factory = self.families.get(driver).ok_or_else(|| {
            SuggestError::Configuration(format!("Driver [{driver}] is not supported."))
        })?;

        let settings = ClientSettings::from_descriptor(name, descriptor, self.timeout);
        let client = factory(settings)?;
        tracing::debug!(provider = name, driver, "Constructed provider client");

        clients.insert(name.to_string(), client.clone());
        Ok(client)
    }

    /// Configured provider names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    /// Token budget configured for a provider.
    pub fn max_tokens(&self, name: &str) -> Option<u32> {
        self.descriptors.get(name).and_then(|d| d.max_tokens)
    }
}
