//! Settings structures for websearch-rs configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure loaded from settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub websearch: WebSearchSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Merge with environment variables (WEBSEARCH_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("WEBSEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("WEBSEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("WEBSEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("WEBSEARCH_DEFAULT_PROVIDER") {
            self.websearch.default_provider = Some(val).filter(|v| !v.is_empty());
        }
    }

    /// Get provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.websearch.providers.iter().find(|p| p.name == name)
    }

    /// Get all enabled providers, in configuration order
    pub fn enabled_providers(&self) -> Vec<&ProviderConfig> {
        self.websearch
            .providers
            .iter()
            .filter(|p| !p.disabled)
            .collect()
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by the API
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "websearch-rs".to_string(),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub bind_address: String,
    /// Header carrying the execution context id
    pub context_header: String,
    /// Seconds a stored context may stay unused before it is discarded
    pub context_idle_timeout: u64,
    /// Maximum number of stored contexts
    pub max_contexts: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8899,
            bind_address: "127.0.0.1".to_string(),
            context_header: "x-websearch-context".to_string(),
            context_idle_timeout: crate::context::DEFAULT_CONTEXT_IDLE_SECS,
            max_contexts: crate::context::DEFAULT_MAX_CONTEXTS,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Upper bound for per-call timeouts
    pub max_request_timeout: Option<f64>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            max_request_timeout: Some(30.0),
            user_agent: format!("websearch-rs/{}", crate::VERSION),
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Whether registering a provider may select it implicitly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Only `default_provider` or an explicit selection activates a provider
    #[default]
    Explicit,
    /// The first registered provider becomes the default when none is configured
    FirstRegistered,
}

/// The `websearch` section: provider selection and provider configs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchSettings {
    /// Provider new execution contexts start with
    pub default_provider: Option<String>,
    pub activation: ActivationPolicy,
    /// Provider configurations in registration order
    pub providers: Vec<ProviderConfig>,
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name (unique identifier)
    pub name: String,
    /// Provider implementation to use
    pub provider: String,
    /// Base URL of the backend
    pub base_url: Option<String>,
    /// API key if required
    pub api_key: Option<String>,
    /// Default timeout for this provider in seconds
    pub timeout: Option<f64>,
    /// Whether the provider is disabled
    pub disabled: bool,
    /// Additional provider-specific settings
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            provider: String::new(),
            base_url: None,
            api_key: None,
            timeout: None,
            disabled: false,
            extra: HashMap::new(),
        }
    }
}

impl ProviderConfig {
    /// Read a string from the provider-specific settings
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}
