//! Provider loader for building the registry from configuration

use super::registry::ProviderRegistry;
use super::searxng::SearxngProvider;
use super::traits::WebSearchProvider;
use crate::config::{ProviderConfig, Settings};
use crate::network::HttpClient;
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Loader for initializing providers from configuration
pub struct ProviderLoader;

impl ProviderLoader {
    /// Build a registry from the `websearch` settings section
    ///
    /// Providers that fail to initialize are skipped with a warning; a
    /// `default_provider` that did not register is an error.
    pub fn load(settings: &Settings, client: &HttpClient) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::with_policy(settings.websearch.activation);

        for config in &settings.websearch.providers {
            if config.disabled {
                info!("Skipping disabled provider: {}", config.name);
                continue;
            }

            match Self::create_provider(config, client) {
                Ok(provider) => {
                    info!("Loaded provider: {} ({})", config.name, config.provider);
                    registry.register(config.name.clone(), provider);
                }
                Err(e) => {
                    warn!("Failed to load provider {}: {:#}", config.name, e);
                }
            }
        }

        if let Some(ref name) = settings.websearch.default_provider {
            registry
                .set_default(name)
                .with_context(|| format!("default_provider {} is not available", name))?;
        }

        info!("Loaded {} providers", registry.len());
        Ok(registry)
    }

    /// Create a provider instance for one config entry
    fn create_provider(
        config: &ProviderConfig,
        client: &HttpClient,
    ) -> Result<Arc<dyn WebSearchProvider>> {
        if config.name.is_empty() {
            return Err(anyhow!("provider entry has no name"));
        }

        let provider: Arc<dyn WebSearchProvider> = match config.provider.as_str() {
            "searxng" => Arc::new(SearxngProvider::from_config(client.clone(), config)?),
            other => return Err(anyhow!("Unknown provider type: {}", other)),
        };
        Ok(provider)
    }

    /// Get list of available provider types
    pub fn available_providers() -> Vec<&'static str> {
        vec!["searxng"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActivationPolicy;

    fn settings(yaml: &str) -> Settings {
        Settings::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_load_skips_disabled_and_unknown() {
        let settings = settings(
            r#"
websearch:
  default_provider: local
  providers:
    - name: local
      provider: searxng
      base_url: http://localhost:8888
    - name: off
      provider: searxng
      base_url: http://localhost:9999
      disabled: true
    - name: mystery
      provider: unknown_backend
    - name: no_url
      provider: searxng
"#,
        );

        let registry = ProviderLoader::load(&settings, &HttpClient::new().unwrap()).unwrap();
        assert_eq!(registry.names(), vec!["local"]);
        assert_eq!(registry.default_provider(), Some("local"));
        assert_eq!(registry.policy(), ActivationPolicy::Explicit);
    }

    #[test]
    fn test_unknown_default_is_an_error() {
        let settings = settings(
            r#"
websearch:
  default_provider: missing
  providers:
    - name: local
      provider: searxng
      base_url: http://localhost:8888
"#,
        );

        let err = ProviderLoader::load(&settings, &HttpClient::new().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("missing"));
    }

    #[test]
    fn test_first_registered_policy() {
        let settings = settings(
            r#"
websearch:
  activation: first_registered
  providers:
    - name: primary
      provider: searxng
      base_url: http://localhost:8888
    - name: secondary
      provider: searxng
      base_url: http://localhost:8889
"#,
        );

        let registry = ProviderLoader::load(&settings, &HttpClient::new().unwrap()).unwrap();
        assert_eq!(registry.default_provider(), Some("primary"));
    }

    #[test]
    fn test_empty_settings_load_empty_registry() {
        let registry =
            ProviderLoader::load(&Settings::default(), &HttpClient::new().unwrap()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.default_provider(), None);
        assert!(ProviderLoader::available_providers().contains(&"searxng"));
    }
}
