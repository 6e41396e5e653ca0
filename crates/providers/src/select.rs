//! Provider selection from configuration.
//!
//! Exactly one backend answers questions for the lifetime of the process:
//! `default_provider`, resolved against its `[providers.<name>]` section and
//! the table of well-known endpoints.

use crate::openai_compat::OpenAiCompatProvider;
use sitesage_config::AppConfig;
use sitesage_core::{Provider, ProviderError};
use std::sync::Arc;
use tracing::debug;

/// Everything needed to talk to the configured backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "[REDACTED]" })
            .field("model", &self.model)
            .finish()
    }
}

impl Selection {
    /// Resolve the default provider. Section values win over globals.
    ///
    /// A provider outside the well-known table must set `api_url`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let name = config.default_provider.clone();
        let section = config.providers.get(&name);

        let base_url = match section.and_then(|p| p.api_url.clone()) {
            Some(url) => url,
            None => well_known_endpoint(&name)
                .ok_or_else(|| {
                    ProviderError::NotConfigured(format!(
                        "unknown provider '{name}'; set providers.{name}.api_url"
                    ))
                })?
                .to_string(),
        };
        let api_key = section
            .and_then(|p| p.api_key.clone())
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();

        Ok(Self {
            model: model_for(config),
            name,
            base_url,
            api_key,
        })
    }

    pub fn into_provider(self) -> Arc<dyn Provider> {
        debug!(provider = %self.name, base_url = %self.base_url, model = %self.model, "Selected provider");
        Arc::new(OpenAiCompatProvider::new(self.name, self.base_url, self.api_key))
    }
}

/// Build the provider named by `default_provider`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    Ok(Selection::from_config(config)?.into_provider())
}

/// The model to request: the provider section's override, else `default_model`.
pub fn model_for(config: &AppConfig) -> String {
    config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone())
}

/// Chat-completions base URL for providers that need no `api_url`.
fn well_known_endpoint(provider: &str) -> Option<&'static str> {
    let url = match provider {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesage_config::ProviderConfig;

    #[test]
    fn defaults_select_openai() {
        let config = AppConfig {
            api_key: Some("sk-global".into()),
            ..AppConfig::default()
        };
        let selection = Selection::from_config(&config).unwrap();
        assert_eq!(selection.name, "openai");
        assert_eq!(selection.base_url, "https://api.openai.com/v1");
        assert_eq!(selection.api_key, "sk-global");
        assert_eq!(selection.model, "gpt-4o-mini");
        assert_eq!(build_from_config(&config).unwrap().name(), "openai");
    }

    #[test]
    fn section_overrides_globals() {
        let mut config = AppConfig {
            api_key: Some("sk-global".into()),
            default_provider: "local".into(),
            ..AppConfig::default()
        };
        config.providers.insert(
            "local".into(),
            ProviderConfig {
                api_key: Some("sk-local".into()),
                api_url: Some("http://127.0.0.1:9000/v1".into()),
                default_model: Some("llama3".into()),
            },
        );

        let selection = Selection::from_config(&config).unwrap();
        assert_eq!(selection.base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(selection.api_key, "sk-local");
        assert_eq!(selection.model, "llama3");
        assert_eq!(build_from_config(&config).unwrap().name(), "local");
    }

    #[test]
    fn well_known_provider_needs_no_url() {
        let config = AppConfig {
            default_provider: "ollama".into(),
            ..AppConfig::default()
        };
        let selection = Selection::from_config(&config).unwrap();
        assert_eq!(selection.base_url, "http://localhost:11434/v1");
        assert!(selection.api_key.is_empty());
    }

    #[test]
    fn unknown_provider_without_url_is_rejected() {
        let config = AppConfig {
            default_provider: "acme".into(),
            api_key: Some("sk-global".into()),
            ..AppConfig::default()
        };
        let err = Selection::from_config(&config).unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("providers.acme.api_url"));
        assert!(build_from_config(&config).is_err());
    }

    #[test]
    fn unknown_provider_with_url_is_accepted() {
        let mut config = AppConfig {
            default_provider: "acme".into(),
            ..AppConfig::default()
        };
        config.providers.insert(
            "acme".into(),
            ProviderConfig {
                api_key: None,
                api_url: Some("https://llm.acme.test/v1".into()),
                default_model: None,
            },
        );
        let selection = Selection::from_config(&config).unwrap();
        assert_eq!(selection.base_url, "https://llm.acme.test/v1");
        assert_eq!(selection.model, "gpt-4o-mini");
    }

    #[test]
    fn debug_hides_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{:?}", Selection::from_config(&config).unwrap());
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
