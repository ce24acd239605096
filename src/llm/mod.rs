//! LLM integration for the concierge.
//!
//! Supports:
//! - **Anthropic**: Direct API access via rig-core
//! - **OpenAI**: Direct API access via rig-core
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::error::{ConfigError, LlmError};

/// Default model when `CONCIERGE_MODEL` is not set.
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
    OpenAi,
}

impl LlmBackend {
    pub fn name(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }

    fn key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "gpt" => Ok(Self::OpenAi),
            other => Err(ConfigError::InvalidValue {
                key: "CONCIERGE_LLM_BACKEND".to_string(),
                message: format!("unknown backend '{other}' (expected anthropic or openai)"),
            }),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
}

impl LlmConfig {
    /// Build config from environment variables.
    ///
    /// `CONCIERGE_LLM_BACKEND` picks the backend (anthropic by default), the
    /// key comes from `ANTHROPIC_API_KEY` or `OPENAI_API_KEY`, and
    /// `CONCIERGE_MODEL` overrides the model.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend: LlmBackend = match std::env::var("CONCIERGE_LLM_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => LlmBackend::Anthropic,
        };

        let api_key = std::env::var(backend.key_var())
            .map_err(|_| ConfigError::MissingEnvVar(backend.key_var().to_string()))?;

        let model = std::env::var("CONCIERGE_MODEL")
            .unwrap_or_else(|_| backend.default_model().to_string());

        Ok(Self {
            backend,
            api_key: secrecy::SecretString::from(api_key),
            model,
        })
    }
}

/// Build the chat backend named by `config`.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = match config.backend {
        LlmBackend::Anthropic => anthropic_chat_backend(config)?,
        LlmBackend::OpenAi => openai_chat_backend(config)?,
    };
    tracing::info!(
        backend = config.backend.name(),
        model = %config.model,
        "Chat backend ready"
    );
    Ok(provider)
}

/// Client construction only fails on a malformed key or HTTP setup; auth is
/// checked on the first request.
fn client_error(backend: LlmBackend, e: impl std::fmt::Display) -> LlmError {
    LlmError::RequestFailed {
        provider: backend.name().to_string(),
        reason: format!("could not build {} client: {e}", backend.name()),
    }
}

fn anthropic_chat_backend(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(config.api_key.expose_secret())
            .map_err(|e| client_error(LlmBackend::Anthropic, e))?;
    let model = client.completion_model(&config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model)))
}

fn openai_chat_backend(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(config.api_key.expose_secret())
            .map_err(|e| client_error(LlmBackend::OpenAi, e))?;
    let model = client.completion_model(&config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(backend: LlmBackend) -> LlmConfig {
        LlmConfig {
            backend,
            api_key: secrecy::SecretString::from("chave-de-teste"),
            model: backend.default_model().to_string(),
        }
    }

    #[test]
    fn each_backend_builds_with_its_default_model() {
        for backend in [LlmBackend::Anthropic, LlmBackend::OpenAi] {
            let provider = create_provider(&config_for(backend)).unwrap();
            assert_eq!(provider.model_name(), backend.default_model());
        }
    }

    #[test]
    fn model_override_is_reported_by_the_adapter() {
        let config = LlmConfig {
            model: "claude-3-5-haiku-latest".to_string(),
            ..config_for(LlmBackend::Anthropic)
        };
        assert_eq!(
            create_provider(&config).unwrap().model_name(),
            "claude-3-5-haiku-latest"
        );
    }

    #[test]
    fn client_errors_name_the_backend() {
        let err = client_error(LlmBackend::OpenAi, "bad header");
        assert_eq!(
            err.to_string(),
            "Provider openai request failed: could not build openai client: bad header"
        );
    }

    #[test]
    fn backend_parses_aliases() {
        assert_eq!("Anthropic".parse::<LlmBackend>().unwrap(), LlmBackend::Anthropic);
        assert_eq!(" openai ".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert!(matches!(
            "gemini".parse::<LlmBackend>(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
