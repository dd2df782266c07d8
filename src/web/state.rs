//! Application state shared across handlers

use crate::config::Settings;
use crate::context::{ContextStore, SearchContext};
use crate::search::WebSearchService;
use axum::http::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

/// Context id used when a request does not name one
pub const DEFAULT_CONTEXT_ID: &str = "default";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search facade over the provider registry
    pub service: Arc<WebSearchService>,
    /// Execution contexts keyed by the context header
    pub contexts: Arc<ContextStore>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings, service: WebSearchService) -> Self {
        let contexts = ContextStore::new(
            Duration::from_secs(settings.server.context_idle_timeout),
            settings.server.max_contexts,
        );

        Self {
            settings: Arc::new(settings),
            service: Arc::new(service),
            contexts: Arc::new(contexts),
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }

    /// Context id named by the request headers
    pub fn context_id(&self, headers: &HeaderMap) -> String {
        headers
            .get(self.settings.server.context_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTEXT_ID)
            .to_string()
    }

    fn initial_provider(&self) -> Option<String> {
        self.service
            .registry()
            .default_provider()
            .map(str::to_string)
    }

    /// The caller's stored context, or an unstored one seeded with the default provider
    pub async fn context(&self, headers: &HeaderMap) -> Arc<SearchContext> {
        let id = self.context_id(headers);
        match self.contexts.get(&id).await {
            Some(context) => context,
            None => Arc::new(SearchContext::with_id(id, self.initial_provider())),
        }
    }

    /// The caller's context, stored so a selection change persists
    pub async fn context_for_update(&self, headers: &HeaderMap) -> Arc<SearchContext> {
        let id = self.context_id(headers);
        self.contexts
            .get_or_create(&id, self.initial_provider())
            .await
    }
}
