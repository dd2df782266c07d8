//! Provider traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Options shared by web and news searches
///
/// Every field is optional; `None` leaves the choice to the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Country code (ISO 3166-1 alpha-2)
    pub country_code: Option<String>,
    /// Language code (ISO 639-1)
    pub language: Option<String>,
    /// Free-text location for geo-targeted results
    pub location: Option<String>,
    /// Number of results
    pub num: Option<usize>,
    /// Page number (1-indexed)
    pub page: Option<u32>,
    /// Per-call timeout in seconds
    pub timeout: Option<f64>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_num(mut self, num: usize) -> Self {
        self.num = Some(num);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page.max(1));
        self
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }
}

/// Options for fetching a single page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Execute JavaScript before extracting content
    pub render: Option<bool>,
    /// Country code to fetch from
    pub country_code: Option<String>,
    /// Per-call timeout in seconds
    pub timeout: Option<f64>,
}

impl PageOptions {
    pub fn wants_render(&self) -> bool {
        self.render.unwrap_or(false)
    }
}

/// A sitelink attached to an organic result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sitelink {
    pub title: String,
    pub link: String,
}

/// A ranked organic search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganicResult {
    pub title: String,
    pub link: Option<String>,
    /// Some providers report the target as `url` instead of `link`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub snippet: String,
    /// Rank, starting at 1
    pub position: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sitelinks: Vec<Sitelink>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl OrganicResult {
    pub fn new(title: impl Into<String>, link: impl Into<String>, position: u32) -> Self {
        Self {
            title: title.into(),
            link: Some(link.into()),
            position,
            ..Default::default()
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// URL to fetch for this result: `url` first, then `link`
    pub fn resolved_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.link.as_deref().filter(|l| !l.is_empty()))
    }
}

/// Knowledge panel shown alongside web results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeGraph {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
    pub attributes: HashMap<String, String>,
}

/// A "people also ask" entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeopleAlsoAsk {
    pub question: String,
    pub snippet: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
}

/// A related search suggestion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedSearch {
    pub query: String,
}

/// Result of a web search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchResult {
    pub organic: Vec<OrganicResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<KnowledgeGraph>,
    pub people_also_ask: Vec<PeopleAlsoAsk>,
    pub related_searches: Vec<RelatedSearch>,
}

impl WebSearchResult {
    pub fn with_organic(organic: Vec<OrganicResult>) -> Self {
        Self {
            organic,
            ..Default::default()
        }
    }
}

/// A news article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub date: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// Result of a news search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSearchResult {
    pub news: Vec<NewsItem>,
}

/// Content of a fetched page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page content converted to markdown
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl PageResult {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            metadata: None,
        }
    }
}

/// Capability every search backend must implement
///
/// Each operation fails independently with a provider-specific error.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// General web search
    async fn search_web(&self, query: &str, options: &SearchOptions)
        -> anyhow::Result<WebSearchResult>;

    /// News search
    async fn search_news(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> anyhow::Result<NewsSearchResult>;

    /// Fetch a page and return its content as markdown
    async fn fetch_page(&self, url: &str, options: &PageOptions) -> anyhow::Result<PageResult>;
}
