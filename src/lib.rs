//! websearch-rs: backend-agnostic web search with a deep search orchestrator
//!
//! Providers implement [`WebSearchProvider`] and are registered by name in a
//! [`ProviderRegistry`](providers::ProviderRegistry). Each [`SearchContext`]
//! carries its own active provider; [`WebSearchService`] resolves it and
//! forwards web, news and page calls, or runs a deep search that combines
//! all three.

pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod network;
pub mod providers;
pub mod search;
pub mod web;

pub use config::Settings;
pub use context::SearchContext;
pub use error::WebSearchError;
pub use providers::WebSearchProvider;
pub use search::{DeepSearchOptions, DeepSearchResult, WebSearchService};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
