//! HTTP client for making requests to search backends

use crate::config::OutgoingSettings;
use anyhow::{bail, Result};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// Accept header for HTML page fetches
const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept header for JSON APIs
const ACCEPT_JSON: &str = "application/json,text/javascript,*/*;q=0.01";

/// A GET request to be executed by [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub params: Vec<(String, String)>,
    /// Per-call timeout in seconds
    pub timeout: Option<f64>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            params: Vec::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter only when a value is present
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.param(key, v.to_string()),
            None => self,
        }
    }

    pub fn timeout(mut self, seconds: Option<f64>) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn accept_json(self) -> Self {
        self.header("Accept", ACCEPT_JSON)
    }

    pub fn accept_html(self) -> Self {
        self.header("Accept", ACCEPT_HTML)
    }
}

/// HTTP response with the body read to text
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub text: String,
    /// Final URL after redirects
    pub url: String,
}

impl HttpResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// Fail unless the status is 2xx
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_rate_limited() {
            bail!("rate limited by {} (HTTP 429)", self.url);
        }
        if !self.is_success() {
            bail!("request to {} failed with HTTP {}", self.url, self.status);
        }
        Ok(self)
    }
}

/// HTTP client wrapper configured from [`OutgoingSettings`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    max_timeout: Option<Duration>,
    user_agent: String,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let default_timeout = Self::config_timeout("request_timeout", settings.request_timeout)?;
        let max_timeout = settings
            .max_request_timeout
            .map(|t| Self::config_timeout("max_request_timeout", t))
            .transpose()?;

        let mut builder = Client::builder()
            .timeout(default_timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            default_timeout,
            max_timeout,
            user_agent: settings.user_agent.clone(),
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// A configured timeout must be a positive, representable number of seconds
    fn config_timeout(name: &str, seconds: f64) -> Result<Duration> {
        match Duration::try_from_secs_f64(seconds) {
            Ok(timeout) if !timeout.is_zero() => Ok(timeout),
            _ => bail!("outgoing.{} must be a positive number of seconds, got {}", name, seconds),
        }
    }

    /// Timeout for a call: the requested one capped at the maximum, or the default
    ///
    /// Non-positive or NaN requests fall back to the default; values too large
    /// for a `Duration` saturate before the cap is applied.
    pub fn effective_timeout(&self, requested: Option<f64>) -> Duration {
        let timeout = match requested {
            Some(t) if t > 0.0 => Duration::try_from_secs_f64(t).unwrap_or(Duration::MAX),
            _ => self.default_timeout,
        };
        match self.max_timeout {
            Some(max) => timeout.min(max),
            None => timeout,
        }
    }

    /// Execute a request
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut req_builder = self
            .client
            .get(&request.url)
            .timeout(self.effective_timeout(request.timeout))
            .header("User-Agent", &self.user_agent);

        for (key, value) in self.extra_headers.iter().chain(request.headers.iter()) {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        let response = req_builder.send().await?;
        Self::parse_response(response).await
    }

    /// Simple GET request
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.execute(HttpRequest::get(url)).await
    }

    async fn parse_response(response: Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            text,
            url,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_effective_timeout_is_capped() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.effective_timeout(None), Duration::from_secs(10));
        assert_eq!(client.effective_timeout(Some(2.5)), Duration::from_millis(2500));
        assert_eq!(client.effective_timeout(Some(120.0)), Duration::from_secs(30));
        assert_eq!(client.effective_timeout(Some(0.0)), Duration::from_secs(10));
    }

    #[test]
    fn test_effective_timeout_handles_unrepresentable_values() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.effective_timeout(Some(f64::INFINITY)), Duration::from_secs(30));
        assert_eq!(client.effective_timeout(Some(1e30)), Duration::from_secs(30));
        assert_eq!(client.effective_timeout(Some(f64::NAN)), Duration::from_secs(10));
        assert_eq!(client.effective_timeout(Some(-5.0)), Duration::from_secs(10));

        let uncapped = HttpClient::with_settings(&OutgoingSettings {
            max_request_timeout: None,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(uncapped.effective_timeout(Some(f64::INFINITY)), Duration::MAX);
    }

    #[test]
    fn test_invalid_configured_timeouts_are_errors() {
        for bad in [-1.0, 0.0, 1e30, f64::INFINITY, f64::NAN] {
            let settings = OutgoingSettings {
                request_timeout: bad,
                ..Default::default()
            };
            let result = HttpClient::with_settings(&settings);
            let err = tokio_test::assert_err!(result);
            assert!(err.to_string().contains("request_timeout"));
        }

        let settings = OutgoingSettings {
            max_request_timeout: Some(-3.0),
            ..Default::default()
        };
        assert!(HttpClient::with_settings(&settings).is_err());
    }

    #[tokio::test]
    async fn test_execute_sends_params_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust lang"))
            .and(header("User-Agent", format!("websearch-rs/{}", crate::VERSION).as_str()))
            .and(header_exists("Accept"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let request = HttpRequest::get(format!("{}/search", server.uri()))
            .param("q", "rust lang")
            .param_opt("pageno", None::<u32>)
            .accept_json();
        let response = client.execute(request).await.unwrap();

        assert!(response.is_success());
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_error_for_status() {
        let server = MockServer::start().await;
        Mock::given(path("/limited"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client
            .get(&format!("{}/limited", server.uri()))
            .await
            .unwrap();
        assert!(response.is_rate_limited());

        let err = response.error_for_status().unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
