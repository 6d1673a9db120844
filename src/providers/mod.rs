//! ChangelogProvider trait and LLM backends.
//!
//! Each backend talks to its provider's HTTP API directly so it can use
//! the provider's native structured-output mechanism and read the exact
//! token usage the provider reports.

pub mod gemini;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::models::ProviderName;
use crate::schema::SchemaDefinition;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// Errors from a provider backend.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Http {
        provider: ProviderName,
        message: String,
    },

    #[error("{provider} API returned {status}: {body}")]
    Status {
        provider: ProviderName,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an empty response{detail}")]
    EmptyResponse {
        provider: ProviderName,
        /// Extra context such as a refusal or block reason, prefixed with ": ".
        detail: String,
    },

    #[error("failed to read {provider} response: {message}")]
    MalformedEnvelope {
        provider: ProviderName,
        message: String,
    },

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Token counts as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Raw structured text returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub raw_text: String,
    pub usage: TokenUsage,
}

/// A model backend that can generate output constrained to a schema.
#[async_trait]
pub trait ChangelogProvider: Send + Sync {
    /// Send `prompt` to `model`, constraining the reply to `schema`.
    async fn generate(
        &self,
        prompt: &str,
        schema: &SchemaDefinition,
        model: &str,
    ) -> Result<Generation, ProviderError>;
}

/// Construct the backend selected by `config.name`.
pub fn build_provider(config: &ProviderConfig) -> Result<Box<dyn ChangelogProvider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(format!(
            "no API key found for provider '{}'. Set --api-key, {} or {}.",
            config.name,
            crate::constants::ENV_API_KEY,
            config.name.api_key_env_var()
        ))
    })?;

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().map_err(|e| {
        ProviderError::NotConfigured(format!("failed to create HTTP client: {e}"))
    })?;

    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| config.name.default_base_url().to_string());

    Ok(match config.name {
        ProviderName::OpenAI => Box::new(OpenAiProvider::new(client, api_key, base_url)),
        ProviderName::Gemini => Box::new(GeminiProvider::new(client, api_key, base_url)),
    })
}

/// Send a prepared request and return the body of a successful reply.
async fn send(
    provider: ProviderName,
    request: reqwest::RequestBuilder,
) -> Result<String, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    if body.trim().is_empty() {
        return Err(ProviderError::EmptyResponse {
            provider,
            detail: String::new(),
        });
    }
    Ok(body)
}

fn transport_error(provider: ProviderName, err: reqwest::Error) -> ProviderError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    ProviderError::Http { provider, message }
}

/// Join a base URL and a path without doubling slashes.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: ProviderName, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name,
            model: None,
            api_key: api_key.map(String::from),
            base_url: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn missing_api_key_is_not_configured() {
        let err = build_provider(&config(ProviderName::Gemini, None))
            .err()
            .expect("expected missing key error");
        let msg = err.to_string();
        assert!(msg.contains("no API key"), "got: {msg}");
        assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn builds_every_provider_with_a_key() {
        for name in [ProviderName::OpenAI, ProviderName::Gemini] {
            assert!(build_provider(&config(name, Some("k"))).is_ok(), "{name}");
        }
    }

    #[test]
    fn endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn error_messages_name_the_provider() {
        let err = ProviderError::Status {
            provider: ProviderName::OpenAI,
            status: 401,
            body: "invalid key".into(),
        };
        assert_eq!(err.to_string(), "openai API returned 401: invalid key");
    }
}
