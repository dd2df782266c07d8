//! Error types surfaced by the registry and the search orchestrator

use thiserror::Error;

/// Errors returned by [`WebSearchService`](crate::search::WebSearchService)
/// and [`ProviderRegistry`](crate::providers::ProviderRegistry)
#[derive(Error, Debug)]
pub enum WebSearchError {
    /// The requested or selected provider is not registered
    #[error("Web search provider not found: {name}")]
    ProviderNotFound { name: String },

    /// No provider has been selected for the execution context
    #[error("No active web search provider")]
    NoActiveProvider,

    /// The execution context was created without an initial provider
    #[error("No initial web search provider configured")]
    NoInitialProvider,

    /// Failure raised by the provider itself, passed through untouched
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl WebSearchError {
    pub fn provider_not_found(name: impl Into<String>) -> Self {
        Self::ProviderNotFound { name: name.into() }
    }

    /// Whether the error comes from provider selection rather than a provider call
    pub fn is_selection_error(&self) -> bool {
        !matches!(self, Self::Provider(_))
    }
}

pub type Result<T> = std::result::Result<T, WebSearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_is_transparent() {
        let err: WebSearchError = anyhow::anyhow!("connection reset").into();
        assert_eq!(err.to_string(), "connection reset");
        assert!(!err.is_selection_error());
    }

    #[test]
    fn test_selection_errors() {
        let err = WebSearchError::provider_not_found("serper");
        assert_eq!(err.to_string(), "Web search provider not found: serper");
        assert!(err.is_selection_error());
        assert!(WebSearchError::NoActiveProvider.is_selection_error());
    }
}
