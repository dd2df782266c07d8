//! HTTP request handlers

use super::state::AppState;
use crate::error::WebSearchError;
use crate::providers::{NewsSearchResult, PageOptions, PageResult, SearchOptions, WebSearchResult};
use crate::search::{DeepSearchOptions, DeepSearchResult};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Missing or empty request parameter
    BadRequest(String),
    Search(WebSearchError),
}

impl From<WebSearchError> for ApiError {
    fn from(err: WebSearchError) -> Self {
        Self::Search(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Search(WebSearchError::ProviderNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Search(WebSearchError::NoActiveProvider)
            | Self::Search(WebSearchError::NoInitialProvider) => StatusCode::CONFLICT,
            Self::Search(WebSearchError::Provider(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message) => message,
            Self::Search(err) => {
                if status == StatusCode::BAD_GATEWAY {
                    tracing::error!("Provider error: {:#}", err);
                }
                err.to_string()
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn required(value: Option<String>, name: &str) -> std::result::Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ApiError::BadRequest(format!("missing parameter: {}", name))),
    }
}

/// Query parameters for web and news search
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub location: Option<String>,
    /// Number of results
    pub num: Option<usize>,
    /// Page number
    pub page: Option<u32>,
    /// Timeout in seconds
    pub timeout: Option<f64>,
}

impl SearchParams {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            country_code: self.country.clone(),
            language: self.language.clone(),
            location: self.location.clone(),
            num: self.num,
            page: self.page.map(|p| p.max(1)),
            timeout: self.timeout,
        }
    }
}

/// Query parameters for page fetches
#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub url: Option<String>,
    /// Request JavaScript rendering
    pub render: Option<bool>,
    pub country: Option<String>,
    pub timeout: Option<f64>,
}

/// Query parameters for deep search
#[derive(Debug, Deserialize)]
pub struct DeepParams {
    pub q: Option<String>,
    /// Organic results to retrieve
    pub search: Option<usize>,
    /// News items to retrieve
    pub news: Option<usize>,
    /// Pages to fetch
    pub fetch: Option<usize>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub location: Option<String>,
    pub page: Option<u32>,
    pub timeout: Option<f64>,
}

/// Provider selection for the caller's context
#[derive(Debug, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub context: String,
    pub active: Option<String>,
    pub default: Option<String>,
    pub available: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveResponse {
    pub active: Option<String>,
}

/// Web search handler
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> ApiResult<WebSearchResult> {
    let query = required(params.q.clone(), "q")?;
    let context = state.context(&headers).await;
    let result = state
        .service
        .search_web(&query, &params.options(), &context)
        .await?;
    Ok(Json(result))
}

/// News search handler
pub async fn news(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> ApiResult<NewsSearchResult> {
    let query = required(params.q.clone(), "q")?;
    let context = state.context(&headers).await;
    let result = state
        .service
        .search_news(&query, &params.options(), &context)
        .await?;
    Ok(Json(result))
}

/// Page fetch handler
pub async fn fetch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FetchParams>,
) -> ApiResult<PageResult> {
    let url = required(params.url, "url")?;
    let options = PageOptions {
        render: params.render,
        country_code: params.country,
        timeout: params.timeout,
    };
    let context = state.context(&headers).await;
    let page = state.service.fetch_page(&url, &options, &context).await?;
    Ok(Json(page))
}

/// Deep search handler
pub async fn deep_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DeepParams>,
) -> ApiResult<DeepSearchResult> {
    let query = required(params.q, "q")?;

    let search = SearchOptions {
        country_code: params.country,
        language: params.language,
        location: params.location,
        num: None,
        page: params.page.map(|p| p.max(1)),
        timeout: params.timeout,
    };
    let mut options = DeepSearchOptions::new().with_search(search);
    if let Some(count) = params.search {
        options = options.with_search_count(count);
    }
    if let Some(count) = params.news {
        options = options.with_news_count(count);
    }
    if let Some(count) = params.fetch {
        options = options.with_fetch_count(count);
    }

    let context = state.context(&headers).await;
    let result = state.service.deep_search(&query, &options, &context).await?;
    Ok(Json(result))
}

/// Provider listing handler
pub async fn providers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ProvidersResponse> {
    let context = state.context(&headers).await;
    Json(ProvidersResponse {
        context: context.id().to_string(),
        active: state.service.get_active_provider(&context),
        default: state
            .service
            .registry()
            .default_provider()
            .map(str::to_string),
        available: state.service.list_providers(),
    })
}

/// Select the active provider for the caller's context
pub async fn set_active(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SetActiveBody>,
) -> ApiResult<ActiveResponse> {
    // Unknown names are rejected before a context is stored
    if !state.service.registry().contains(&body.name) {
        return Err(WebSearchError::provider_not_found(body.name).into());
    }
    let context = state.context_for_update(&headers).await;
    state.service.set_active_provider(&body.name, &context)?;
    Ok(Json(ActiveResponse {
        active: Some(body.name),
    }))
}

/// Restore the context's initial provider
pub async fn reset_active(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ActiveResponse> {
    let context = state.context(&headers).await;
    let name = state.service.reset_active_provider(&context)?;
    Ok(Json(ActiveResponse { active: Some(name) }))
}

/// Activate the only registered provider
pub async fn select_only(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<ActiveResponse> {
    let context = state.context_for_update(&headers).await;
    let selected = state.service.select_only_provider(&context)?;
    Ok(Json(ActiveResponse {
        active: selected.or_else(|| context.active_provider()),
    }))
}

/// Discard the caller's context
pub async fn end_context(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let id = state.context_id(&headers);
    let removed = state.contexts.remove(&id).await;
    Json(serde_json::json!({ "context": id, "removed": removed }))
}

/// Metrics handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "instance_name": state.instance_name(),
        "contexts": state.contexts.len().await,
        "metrics": state.service.metrics().snapshot(),
    }))
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
