//! SearXNG provider: searches through a SearXNG instance's JSON API and
//! fetches pages directly over HTTP

use super::markdown::html_to_markdown;
use super::traits::*;
use crate::config::ProviderConfig;
use crate::network::{HttpClient, HttpRequest};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Raw SearXNG JSON response
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearxResponse {
    results: Vec<SearxResult>,
    infoboxes: Vec<SearxInfobox>,
    suggestions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearxResult {
    url: String,
    title: String,
    content: Option<String>,
    engine: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearxInfobox {
    infobox: String,
    content: Option<String>,
    img_src: Option<String>,
    urls: Vec<SearxLink>,
    attributes: Vec<SearxAttribute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearxLink {
    title: String,
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearxAttribute {
    label: String,
    value: serde_json::Value,
}

/// 1-based rank for the result at `index`, saturating at `u32::MAX`
fn rank(index: usize) -> u32 {
    u32::try_from(index)
        .ok()
        .and_then(|i| i.checked_add(1))
        .unwrap_or(u32::MAX)
}

/// Provider backed by a SearXNG instance
pub struct SearxngProvider {
    client: HttpClient,
    search_url: String,
    web_categories: String,
    news_categories: String,
    engines: Option<String>,
    /// Default timeout when a call does not request one
    timeout: Option<f64>,
}

impl SearxngProvider {
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self> {
        let mut base =
            Url::parse(base_url).with_context(|| format!("invalid base_url {}", base_url))?;
        // Keep a path prefix such as `/searx` when joining
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let search_url = base.join("search")?.to_string();

        Ok(Self {
            client,
            search_url,
            web_categories: "general".to_string(),
            news_categories: "news".to_string(),
            engines: None,
            timeout: None,
        })
    }

    /// Build from a provider config; `base_url` is required
    pub fn from_config(client: HttpClient, config: &ProviderConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow!("provider {} requires base_url", config.name))?;

        let mut provider = Self::new(client, base_url)?;
        if let Some(categories) = config.extra_str("web_categories") {
            provider.web_categories = categories.to_string();
        }
        if let Some(categories) = config.extra_str("news_categories") {
            provider.news_categories = categories.to_string();
        }
        provider.engines = config.extra_str("engines").map(str::to_string);
        provider.timeout = config.timeout;
        Ok(provider)
    }

    /// SearXNG language tag, e.g. `en-US` from language `en` and country `us`
    fn language_tag(options: &SearchOptions) -> Option<String> {
        match (options.language.as_deref(), options.country_code.as_deref()) {
            (Some(lang), Some(country)) => Some(format!(
                "{}-{}",
                lang.to_lowercase(),
                country.to_uppercase()
            )),
            (Some(lang), None) => Some(lang.to_lowercase()),
            (None, _) => None,
        }
    }

    async fn query(
        &self,
        query: &str,
        categories: &str,
        options: &SearchOptions,
    ) -> Result<SearxResponse> {
        if options.location.is_some() {
            debug!("SearXNG ignores the location option");
        }

        let request = HttpRequest::get(&self.search_url)
            .param("q", query)
            .param("format", "json")
            .param("categories", categories)
            .param_opt("engines", self.engines.as_deref())
            .param_opt("pageno", options.page)
            .param_opt("language", Self::language_tag(options))
            .timeout(options.timeout.or(self.timeout))
            .accept_json();

        let response = self.client.execute(request).await?.error_for_status()?;
        response
            .json::<SearxResponse>()
            .context("malformed SearXNG response")
    }

    fn knowledge_graph(infobox: SearxInfobox) -> KnowledgeGraph {
        let attributes = infobox
            .attributes
            .into_iter()
            .map(|a| {
                let value = match a.value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (a.label, value)
            })
            .collect();

        KnowledgeGraph {
            title: infobox.infobox,
            kind: None,
            description: infobox.content,
            website: infobox.urls.first().map(|u| u.url.clone()),
            image_url: infobox.img_src,
            attributes,
        }
    }
}

#[async_trait]
impl WebSearchProvider for SearxngProvider {
    async fn search_web(&self, query: &str, options: &SearchOptions) -> Result<WebSearchResult> {
        let response = self.query(query, &self.web_categories, options).await?;

        let mut organic: Vec<OrganicResult> = response
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .enumerate()
            .map(|(i, r)| {
                let mut attributes = HashMap::new();
                if let Some(engine) = r.engine {
                    attributes.insert("engine".to_string(), engine);
                }
                OrganicResult {
                    title: r.title,
                    link: Some(r.url),
                    snippet: r.content.unwrap_or_default(),
                    position: rank(i),
                    date: r.published_date,
                    attributes,
                    ..Default::default()
                }
            })
            .collect();
        if let Some(num) = options.num {
            organic.truncate(num);
        }

        Ok(WebSearchResult {
            organic,
            knowledge_graph: response.infoboxes.into_iter().next().map(Self::knowledge_graph),
            people_also_ask: Vec::new(),
            related_searches: response
                .suggestions
                .into_iter()
                .map(|query| RelatedSearch { query })
                .collect(),
        })
    }

    async fn search_news(&self, query: &str, options: &SearchOptions) -> Result<NewsSearchResult> {
        let response = self.query(query, &self.news_categories, options).await?;

        let mut news: Vec<NewsItem> = response
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .enumerate()
            .map(|(i, r)| {
                let source = Url::parse(&r.url)
                    .ok()
                    .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
                    .or(r.engine)
                    .unwrap_or_default();
                NewsItem {
                    title: r.title,
                    link: r.url,
                    date: r.published_date.unwrap_or_default(),
                    source,
                    snippet: r.content,
                    position: Some(rank(i)),
                }
            })
            .collect();
        if let Some(num) = options.num {
            news.truncate(num);
        }

        Ok(NewsSearchResult { news })
    }

    async fn fetch_page(&self, url: &str, options: &PageOptions) -> Result<PageResult> {
        let target = Url::parse(url).with_context(|| format!("invalid URL {}", url))?;
        if options.wants_render() {
            debug!("JavaScript rendering unavailable, fetching static HTML for {}", url);
        }

        let request = HttpRequest::get(target.as_str())
            .timeout(options.timeout.or(self.timeout))
            .accept_html();
        let response = self.client.execute(request).await?.error_for_status()?;

        let final_url = Url::parse(&response.url).unwrap_or(target);
        let content_type = response.content_type().unwrap_or("text/html").to_string();

        let mut metadata = HashMap::new();
        metadata.insert("url".to_string(), final_url.to_string().into());
        metadata.insert("status".to_string(), response.status.into());
        metadata.insert("content_type".to_string(), content_type.clone().into());
        metadata.insert(
            "fetched_at".to_string(),
            chrono::Utc::now().to_rfc3339().into(),
        );

        let markdown = if content_type.contains("html") {
            let page = html_to_markdown(&response.text, Some(&final_url));
            if let Some(title) = page.title {
                metadata.insert("title".to_string(), title.into());
            }
            if let Some(description) = page.description {
                metadata.insert("description".to_string(), description.into());
            }
            page.markdown
        } else {
            response.text
        };

        Ok(PageResult {
            markdown,
            metadata: Some(metadata),
        })
    }
}
