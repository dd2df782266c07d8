//! Provider registry with a per-context active selection

use super::traits::WebSearchProvider;
use crate::config::ActivationPolicy;
use crate::context::SearchContext;
use crate::error::{Result, WebSearchError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A resolved provider together with the name it is registered under
#[derive(Clone)]
pub struct ProviderHandle {
    pub name: String,
    pub provider: Arc<dyn WebSearchProvider>,
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of all available search providers
///
/// The registry owns the name → provider mapping. Which provider is active is
/// stored in each [`SearchContext`]; the registry only validates and resolves it.
pub struct ProviderRegistry {
    /// Providers by name
    providers: HashMap<String, Arc<dyn WebSearchProvider>>,
    /// Names in registration order
    order: Vec<String>,
    /// Provider new contexts start with
    default_provider: Option<String>,
    policy: ActivationPolicy,
}

impl ProviderRegistry {
    /// Create a new empty registry that never auto-selects
    pub fn new() -> Self {
        Self::with_policy(ActivationPolicy::Explicit)
    }

    pub fn with_policy(policy: ActivationPolicy) -> Self {
        Self {
            providers: HashMap::new(),
            order: Vec::new(),
            default_provider: None,
            policy,
        }
    }

    /// Register a provider, replacing any previous entry with the same name
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn WebSearchProvider>) {
        let name = name.into();

        if self.providers.insert(name.clone(), provider).is_some() {
            debug!("Replaced web search provider: {}", name);
        } else {
            self.order.push(name.clone());
            debug!("Registered web search provider: {}", name);
        }

        if self.policy == ActivationPolicy::FirstRegistered && self.default_provider.is_none() {
            info!("Auto-selecting first registered provider: {}", name);
            self.default_provider = Some(name);
        }
    }

    /// Set the provider new contexts start with
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(WebSearchError::provider_not_found(name));
        }
        self.default_provider = Some(name.to_string());
        Ok(())
    }

    pub fn default_provider(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    pub fn policy(&self) -> ActivationPolicy {
        self.policy
    }

    /// Get a provider by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn WebSearchProvider>> {
        self.providers.get(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve the provider selected for `context`
    pub fn resolve_active(&self, context: &SearchContext) -> Result<ProviderHandle> {
        let name = context
            .active_provider()
            .ok_or(WebSearchError::NoActiveProvider)?;

        let provider = self
            .providers
            .get(&name)
            .cloned()
            .ok_or_else(|| WebSearchError::provider_not_found(name.as_str()))?;

        Ok(ProviderHandle { name, provider })
    }

    /// Select `name` for `context`; unknown names leave the context untouched
    pub fn set_active(&self, name: &str, context: &SearchContext) -> Result<()> {
        if !self.contains(name) {
            return Err(WebSearchError::provider_not_found(name));
        }

        context.set_provider(name.to_string());
        debug!("Context {} now uses provider {}", context.id(), name);
        Ok(())
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.order)
            .field("default_provider", &self.default_provider)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
