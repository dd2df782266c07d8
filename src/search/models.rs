//! Deep search options, results and the rerank hook

use crate::providers::{NewsItem, OrganicResult, PageResult, SearchOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Organic results requested when `search_count` is not set
pub const DEFAULT_SEARCH_COUNT: usize = 10;
/// News items requested when `news_count` is not set
pub const DEFAULT_NEWS_COUNT: usize = 0;
/// Pages fetched when `fetch_count` is not set
pub const DEFAULT_FETCH_COUNT: usize = 5;

/// Caller-supplied reordering/filtering of organic results
///
/// Runs after retrieval and before the fetch prefix is taken. Any async
/// closure `Fn(Vec<OrganicResult>) -> impl Future<Output = anyhow::Result<Vec<OrganicResult>>>`
/// implements it.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, results: Vec<OrganicResult>) -> anyhow::Result<Vec<OrganicResult>>;
}

#[async_trait]
impl<F, Fut> Reranker for F
where
    F: Fn(Vec<OrganicResult>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<OrganicResult>>> + Send + 'static,
{
    async fn rerank(&self, results: Vec<OrganicResult>) -> anyhow::Result<Vec<OrganicResult>> {
        (self)(results).await
    }
}

/// Options for [`WebSearchService::deep_search`](super::WebSearchService::deep_search)
#[derive(Clone, Default)]
pub struct DeepSearchOptions {
    /// Country, language, location and timeout passed to every search call
    pub search: SearchOptions,
    /// Organic results to retrieve; 0 skips the web search
    pub search_count: Option<usize>,
    /// News items to retrieve; 0 skips the news search
    pub news_count: Option<usize>,
    /// Leading results whose pages are fetched
    pub fetch_count: Option<usize>,
    pub rerank: Option<Arc<dyn Reranker>>,
}

impl DeepSearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    pub fn with_search_count(mut self, count: usize) -> Self {
        self.search_count = Some(count);
        self
    }

    pub fn with_news_count(mut self, count: usize) -> Self {
        self.news_count = Some(count);
        self
    }

    pub fn with_fetch_count(mut self, count: usize) -> Self {
        self.fetch_count = Some(count);
        self
    }

    pub fn with_rerank(mut self, reranker: impl Reranker + 'static) -> Self {
        self.rerank = Some(Arc::new(reranker));
        self
    }

    pub fn effective_search_count(&self) -> usize {
        self.search_count.unwrap_or(DEFAULT_SEARCH_COUNT)
    }

    pub fn effective_news_count(&self) -> usize {
        self.news_count.unwrap_or(DEFAULT_NEWS_COUNT)
    }

    pub fn effective_fetch_count(&self) -> usize {
        self.fetch_count.unwrap_or(DEFAULT_FETCH_COUNT)
    }
}

impl std::fmt::Debug for DeepSearchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSearchOptions")
            .field("search", &self.search)
            .field("search_count", &self.search_count)
            .field("news_count", &self.news_count)
            .field("fetch_count", &self.fetch_count)
            .field("rerank", &self.rerank.is_some())
            .finish()
    }
}

/// A page fetched during a deep search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL the page was fetched from
    pub url: String,
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, page: PageResult) -> Self {
        Self {
            url: url.into(),
            markdown: page.markdown,
            metadata: page.metadata,
        }
    }
}

/// Combined outcome of a deep search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeepSearchResult {
    /// Organic results after reranking
    pub results: Vec<OrganicResult>,
    pub news: Vec<NewsItem>,
    /// Successfully fetched pages in result order
    pub pages: Vec<FetchedPage>,
}
