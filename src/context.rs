//! Execution contexts carrying the per-agent provider selection

use moka::future::Cache;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// Per-agent/session state: which provider serves this context
///
/// The selection is only ever written through
/// [`ProviderRegistry::set_active`](crate::providers::ProviderRegistry::set_active),
/// which validates the name first.
#[derive(Debug)]
pub struct SearchContext {
    id: String,
    initial_provider: Option<String>,
    provider: RwLock<Option<String>>,
}

impl SearchContext {
    /// Create a context with a random id and the given initial provider
    pub fn new(initial_provider: Option<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), initial_provider)
    }

    /// Create a context with an explicit id
    pub fn with_id(id: impl Into<String>, initial_provider: Option<String>) -> Self {
        Self {
            id: id.into(),
            provider: RwLock::new(initial_provider.clone()),
            initial_provider,
        }
    }

    /// Create a child context that starts from this context's current selection
    pub fn child(&self) -> Self {
        let current = self.active_provider();
        debug!("Deriving child context from {} (provider: {:?})", self.id, current);
        Self::new(current)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Provider the context was created with
    pub fn initial_provider(&self) -> Option<&str> {
        self.initial_provider.as_deref()
    }

    /// Currently selected provider name
    pub fn active_provider(&self) -> Option<String> {
        self.provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_provider(&self, name: String) {
        *self.provider.write().unwrap_or_else(PoisonError::into_inner) = Some(name);
    }
}

/// Idle time after which a stored context is discarded
pub const DEFAULT_CONTEXT_IDLE_SECS: u64 = 1800;
/// Upper bound on stored contexts
pub const DEFAULT_MAX_CONTEXTS: u64 = 10_000;

/// Contexts keyed by id, stored on first write and expired when idle
pub struct ContextStore {
    contexts: Cache<String, Arc<SearchContext>>,
}

impl ContextStore {
    pub fn new(idle: Duration, max_capacity: u64) -> Self {
        let contexts = Cache::builder()
            .time_to_idle(idle)
            .max_capacity(max_capacity)
            .build();

        Self { contexts }
    }

    /// Get the context for `id`, initializing it with `initial_provider` if absent
    pub async fn get_or_create(
        &self,
        id: &str,
        initial_provider: Option<String>,
    ) -> Arc<SearchContext> {
        let key = id.to_string();
        self.contexts
            .get_with(key.clone(), async move {
                debug!("Initializing search context {}", key);
                Arc::new(SearchContext::with_id(key, initial_provider))
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Option<Arc<SearchContext>> {
        self.contexts.get(id).await
    }

    /// End a context, discarding its selection state
    pub async fn remove(&self, id: &str) -> bool {
        self.contexts.remove(id).await.is_some()
    }

    pub async fn len(&self) -> u64 {
        self.contexts.run_pending_tasks().await;
        self.contexts.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_CONTEXT_IDLE_SECS),
            DEFAULT_MAX_CONTEXTS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_with_initial_provider() {
        let context = SearchContext::new(Some("searxng".to_string()));
        assert_eq!(context.active_provider().as_deref(), Some("searxng"));
        assert_eq!(context.initial_provider(), Some("searxng"));
        assert!(!context.id().is_empty());

        let empty = SearchContext::new(None);
        assert_eq!(empty.active_provider(), None);
    }

    #[test]
    fn test_child_inherits_current_selection() {
        let parent = SearchContext::new(Some("a".to_string()));
        parent.set_provider("b".to_string());

        let child = parent.child();
        assert_eq!(child.active_provider().as_deref(), Some("b"));
        assert_ne!(child.id(), parent.id());

        child.set_provider("a".to_string());
        assert_eq!(parent.active_provider().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_store_reuses_and_removes_contexts() {
        let store = ContextStore::default();
        let first = store.get_or_create("agent-1", Some("a".to_string())).await;
        first.set_provider("b".to_string());

        let again = store.get_or_create("agent-1", Some("a".to_string())).await;
        assert_eq!(again.active_provider().as_deref(), Some("b"));
        assert_eq!(again.id(), "agent-1");
        assert_eq!(store.len().await, 1);

        assert!(store.remove("agent-1").await);
        assert!(!store.remove("agent-1").await);
        assert!(store.is_empty().await);

        let fresh = store.get_or_create("agent-1", Some("a".to_string())).await;
        assert_eq!(fresh.active_provider().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_idle_contexts_expire() {
        let store = ContextStore::new(Duration::from_millis(50), 100);
        store.get_or_create("agent-1", None).await;
        assert!(store.get("agent-1").await.is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.get("agent-1").await.is_none());
        assert!(store.is_empty().await);
    }
}
