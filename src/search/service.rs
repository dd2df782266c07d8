//! Search orchestration over the active provider

use super::models::{DeepSearchOptions, DeepSearchResult, FetchedPage};
use crate::context::SearchContext;
use crate::error::{Result, WebSearchError};
use crate::metrics::{self, Metrics};
use crate::providers::{
    NewsItem, NewsSearchResult, OrganicResult, PageOptions, PageResult, ProviderHandle,
    ProviderRegistry, SearchOptions, WebSearchResult,
};
use futures::future::{join_all, try_join};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one Phase 3 fetch before fan-in
enum FetchOutcome {
    /// The selected result had neither `url` nor `link`
    NoUrl,
    Fetched(FetchedPage),
    Failed { url: String, error: anyhow::Error },
}

/// Unified search facade that forwards to the provider active for a context
pub struct WebSearchService {
    registry: Arc<ProviderRegistry>,
    metrics: Arc<Metrics>,
}

impl WebSearchService {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Share an existing metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Create a context that starts with the registry's default provider
    pub fn new_context(&self) -> SearchContext {
        SearchContext::new(self.registry.default_provider().map(str::to_string))
    }

    /// Create a context that starts with `initial`, validated against the registry
    pub fn new_context_with(&self, initial: &str) -> Result<SearchContext> {
        if !self.registry.contains(initial) {
            return Err(WebSearchError::provider_not_found(initial));
        }
        Ok(SearchContext::new(Some(initial.to_string())))
    }

    /// Registered provider names in registration order
    pub fn list_providers(&self) -> Vec<String> {
        self.registry.names().into_iter().map(str::to_string).collect()
    }

    pub fn get_active_provider(&self, context: &SearchContext) -> Option<String> {
        context.active_provider()
    }

    pub fn set_active_provider(&self, name: &str, context: &SearchContext) -> Result<()> {
        self.registry.set_active(name, context)?;
        info!("Active web search provider for {} set to {}", context.id(), name);
        Ok(())
    }

    /// Restore the provider the context was created with
    pub fn reset_active_provider(&self, context: &SearchContext) -> Result<String> {
        let initial = context
            .initial_provider()
            .ok_or(WebSearchError::NoInitialProvider)?
            .to_string();
        self.set_active_provider(&initial, context)?;
        Ok(initial)
    }

    /// Activate the only registered provider, if there is exactly one
    ///
    /// Returns `None` when the registry is empty or the caller has to choose.
    pub fn select_only_provider(&self, context: &SearchContext) -> Result<Option<String>> {
        match self.registry.names().as_slice() {
            [only] => {
                let only = only.to_string();
                self.set_active_provider(&only, context)?;
                Ok(Some(only))
            }
            _ => Ok(None),
        }
    }

    pub async fn search_web(
        &self,
        query: &str,
        options: &SearchOptions,
        context: &SearchContext,
    ) -> Result<WebSearchResult> {
        let handle = self.registry.resolve_active(context)?;
        debug!("Searching web with {}: {}", handle.name, query);
        self.timed(&handle, handle.provider.search_web(query, options))
            .await
    }

    pub async fn search_news(
        &self,
        query: &str,
        options: &SearchOptions,
        context: &SearchContext,
    ) -> Result<NewsSearchResult> {
        let handle = self.registry.resolve_active(context)?;
        debug!("Searching news with {}: {}", handle.name, query);
        self.timed(&handle, handle.provider.search_news(query, options))
            .await
    }

    pub async fn fetch_page(
        &self,
        url: &str,
        options: &PageOptions,
        context: &SearchContext,
    ) -> Result<PageResult> {
        let handle = self.registry.resolve_active(context)?;
        debug!("Fetching page with {}: {}", handle.name, url);
        self.timed(&handle, handle.provider.fetch_page(url, options))
            .await
    }

    /// Search, optionally rerank, then fetch the leading result pages
    ///
    /// The provider is resolved once, so switching the context's selection
    /// mid-call does not affect this call. Search and news failures abort the
    /// call; page fetch failures only drop the affected page.
    pub async fn deep_search(
        &self,
        query: &str,
        options: &DeepSearchOptions,
        context: &SearchContext,
    ) -> Result<DeepSearchResult> {
        let handle = self.registry.resolve_active(context)?;
        self.metrics.inc_deep_search();

        let search_count = options.effective_search_count();
        let news_count = options.effective_news_count();
        let fetch_count = options.effective_fetch_count();

        info!(
            "Deep search '{}' with {} (search: {}, news: {}, fetch: {})",
            query, handle.name, search_count, news_count, fetch_count
        );

        // Phase 1: web and news retrieval run concurrently, either failure is fatal
        let (results, news) = try_join(
            self.retrieve_organic(&handle, query, &options.search, search_count),
            self.retrieve_news(&handle, query, &options.search, news_count),
        )
        .await?;

        // Phase 2
        let results = match options.rerank {
            Some(ref reranker) => {
                let before = results.len();
                let reranked = reranker.rerank(results).await?;
                debug!("Reranked {} results into {}", before, reranked.len());
                reranked
            }
            None => results,
        };

        // Phase 3: bounded fan-out over the leading results
        let page_options = PageOptions {
            country_code: options.search.country_code.clone(),
            ..Default::default()
        };
        let fetches = results
            .iter()
            .take(fetch_count)
            .map(|result| self.fetch_outcome(&handle, result, &page_options));
        let outcomes = join_all(fetches).await;
        let pages = self.collect_pages(outcomes);

        info!(
            "Deep search '{}' finished: {} results, {} news, {} pages",
            query,
            results.len(),
            news.len(),
            pages.len()
        );

        Ok(DeepSearchResult {
            results,
            news,
            pages,
        })
    }

    async fn retrieve_organic(
        &self,
        handle: &ProviderHandle,
        query: &str,
        options: &SearchOptions,
        count: usize,
    ) -> Result<Vec<OrganicResult>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let options = options.clone().with_num(count);
        let result = self
            .timed(handle, handle.provider.search_web(query, &options))
            .await?;
        Ok(result.organic)
    }

    async fn retrieve_news(
        &self,
        handle: &ProviderHandle,
        query: &str,
        options: &SearchOptions,
        count: usize,
    ) -> Result<Vec<NewsItem>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let options = options.clone().with_num(count);
        let result = self
            .timed(handle, handle.provider.search_news(query, &options))
            .await?;
        Ok(result.news)
    }

    async fn fetch_outcome(
        &self,
        handle: &ProviderHandle,
        result: &OrganicResult,
        options: &PageOptions,
    ) -> FetchOutcome {
        let Some(url) = result.resolved_url() else {
            return FetchOutcome::NoUrl;
        };

        match self.timed(handle, handle.provider.fetch_page(url, options)).await {
            Ok(page) => FetchOutcome::Fetched(FetchedPage::new(url, page)),
            Err(error) => FetchOutcome::Failed {
                url: url.to_string(),
                error: error.into(),
            },
        }
    }

    /// Fan-in: keep fetched pages in selection order, drop the rest
    fn collect_pages(&self, outcomes: Vec<FetchOutcome>) -> Vec<FetchedPage> {
        let mut pages = Vec::with_capacity(outcomes.len());
        let mut failed = 0u64;

        for outcome in outcomes {
            match outcome {
                FetchOutcome::Fetched(page) => pages.push(page),
                FetchOutcome::NoUrl => debug!("Skipping result without a URL"),
                FetchOutcome::Failed { url, error } => {
                    warn!("Failed to fetch {}: {:#}", url, error);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            self.metrics.add_dropped_pages(failed);
        }
        pages
    }

    /// Run a provider call, recording its latency and outcome
    async fn timed<T>(
        &self,
        handle: &ProviderHandle,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T> {
        let start = Instant::now();
        let result = call.await;
        self.metrics.record_call(
            &handle.name,
            metrics::millis(start.elapsed()),
            result.is_ok(),
        );
        result.map_err(WebSearchError::Provider)
    }
}
