//! Building the narration backend from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use worktrail_config::{Backend, ConfigError, LlmConfig, resolve_api_key};
use worktrail_llm::{OpenAiBackend, OpenAiConfig, SharedBackend};

/// Map the `[llm]` section to a ready-to-use backend and model name.
pub fn build_backend(config: &LlmConfig) -> Result<(SharedBackend, String)> {
    let backend = config.effective_backend();

    let Some(model) = config.effective_model() else {
        return Err(ConfigError::MissingField {
            field: "model".to_string(),
            context: format!("[llm] section for the {} backend", backend),
        }
        .into());
    };

    let api_key = resolve_api_key(&backend, config.api_key.as_deref());
    if let Some(ref secret) = api_key {
        tracing::debug!(backend = %backend, source = %secret.source, "Resolved API key");
    }
    let api_key = api_key.map(|secret| secret.value);

    let mut openai = match (backend, api_key) {
        (Backend::Ollama, _) => OpenAiConfig::ollama(),
        (Backend::Openai, Some(key)) => OpenAiConfig::openai(key),
        (Backend::Groq, Some(key)) => OpenAiConfig::groq(key),
        (Backend::Custom, key) => {
            let Some(ref base_url) = config.base_url else {
                return Err(ConfigError::MissingField {
                    field: "base_url".to_string(),
                    context: "[llm] section for the custom backend".to_string(),
                }
                .into());
            };
            OpenAiConfig::ollama()
                .with_base_url(base_url.clone())
                .with_api_key(key)
                .with_name("custom")
        }
        (backend, None) => {
            return Err(ConfigError::ApiKeyNotFound {
                backend: backend.to_string(),
                env_var: backend.env_var().to_string(),
            }
            .into());
        }
    };

    if let Some(ref base_url) = config.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    if config.retry_max.is_some() || config.retry_backoff_ms.is_some() {
        let retries = config.retry_max.unwrap_or(openai.max_retries);
        let backoff = config
            .retry_backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(openai.retry_backoff);
        openai = openai.with_retries(retries, backoff);
    }
    openai = openai.with_model(model.clone());

    tracing::info!(backend = %backend, model = %model, "Using narration backend");
    let backend: SharedBackend = Arc::new(OpenAiBackend::new(openai)?);
    Ok((backend, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_needs_no_key() {
        let config = LlmConfig {
            backend: Some(Backend::Ollama),
            ..Default::default()
        };
        let (backend, model) = build_backend(&config).unwrap();
        assert_eq!(backend.name(), "ollama");
        assert_eq!(model, "llama3.2");
    }

    #[test]
    fn test_plaintext_key_accepted() {
        let config = LlmConfig {
            backend: Some(Backend::Groq),
            api_key: Some("gsk_test".to_string()),
            model: Some("llama-3.3-70b-versatile".to_string()),
            ..Default::default()
        };
        let (backend, model) = build_backend(&config).unwrap();
        assert_eq!(backend.name(), "groq");
        assert_eq!(model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_custom_requires_base_url_and_model() {
        let no_model = LlmConfig {
            backend: Some(Backend::Custom),
            base_url: Some("http://localhost:8000/v1".to_string()),
            ..Default::default()
        };
        assert!(build_backend(&no_model).err().unwrap().to_string().contains("model"));

        let no_url = LlmConfig {
            backend: Some(Backend::Custom),
            model: Some("m".to_string()),
            ..Default::default()
        };
        assert!(build_backend(&no_url).err().unwrap().to_string().contains("base_url"));

        let complete = LlmConfig {
            backend: Some(Backend::Custom),
            model: Some("m".to_string()),
            base_url: Some("http://localhost:8000/v1".to_string()),
            ..Default::default()
        };
        let (backend, _) = build_backend(&complete).unwrap();
        assert_eq!(backend.name(), "custom");
    }
}
