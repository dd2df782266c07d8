//! Scripted provider used by unit tests

use super::traits::*;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Provider returning canned results and recording every call
#[derive(Default)]
pub struct MockProvider {
    organic: Vec<OrganicResult>,
    news: Vec<NewsItem>,
    search_error: Option<String>,
    news_error: Option<String>,
    pages: HashMap<String, std::result::Result<String, String>>,
    delays: HashMap<String, Duration>,
    search_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    pub search_calls: AtomicUsize,
    pub news_calls: AtomicUsize,
    pub search_options: Mutex<Vec<SearchOptions>>,
    pub fetched: Mutex<Vec<String>>,
    pub page_options: Mutex<Vec<PageOptions>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Organic results with the given links, positions 1..
    pub fn with_links(mut self, links: &[&str]) -> Self {
        self.organic = links
            .iter()
            .enumerate()
            .map(|(i, link)| OrganicResult {
                link: Some(link.to_string()),
                position: i as u32 + 1,
                ..Default::default()
            })
            .collect();
        self
    }

    pub fn with_organic(mut self, organic: Vec<OrganicResult>) -> Self {
        self.organic = organic;
        self
    }

    pub fn with_news(mut self, titles: &[&str]) -> Self {
        self.news = titles
            .iter()
            .map(|title| NewsItem {
                title: title.to_string(),
                link: format!("https://news.example/{}", title),
                ..Default::default()
            })
            .collect();
        self
    }

    pub fn failing_search(mut self, message: &str) -> Self {
        self.search_error = Some(message.to_string());
        self
    }

    pub fn failing_news(mut self, message: &str) -> Self {
        self.news_error = Some(message.to_string());
        self
    }

    pub fn with_page(mut self, url: &str, markdown: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(markdown.to_string()));
        self
    }

    pub fn with_failing_page(mut self, url: &str, message: &str) -> Self {
        self.pages.insert(url.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Make `search_web` signal `started` and then wait for `release`
    pub fn gated(mut self, started: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.search_gate = Some((started, release));
        self
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn total_search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst) + self.news_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearchProvider for MockProvider {
    async fn search_web(
        &self,
        _query: &str,
        options: &SearchOptions,
    ) -> anyhow::Result<WebSearchResult> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search_options.lock().unwrap().push(options.clone());

        if let Some((started, release)) = &self.search_gate {
            started.notify_one();
            release.notified().await;
        }

        if let Some(ref message) = self.search_error {
            return Err(anyhow!("{}", message));
        }
        Ok(WebSearchResult::with_organic(self.organic.clone()))
    }

    async fn search_news(
        &self,
        _query: &str,
        options: &SearchOptions,
    ) -> anyhow::Result<NewsSearchResult> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        self.search_options.lock().unwrap().push(options.clone());

        if let Some(ref message) = self.news_error {
            return Err(anyhow!("{}", message));
        }
        let mut news = self.news.clone();
        news.truncate(options.num.unwrap_or(news.len()));
        Ok(NewsSearchResult { news })
    }

    async fn fetch_page(&self, url: &str, options: &PageOptions) -> anyhow::Result<PageResult> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.page_options.lock().unwrap().push(options.clone());

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        match self.pages.get(url) {
            Some(Ok(markdown)) => Ok(PageResult::new(markdown.clone())),
            Some(Err(message)) => Err(anyhow!("{}", message)),
            None => Err(anyhow!("no page scripted for {}", url)),
        }
    }
}
