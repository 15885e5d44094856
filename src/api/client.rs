//! Chat-completion client over the two supported backends.
//!
//! Both providers sit behind the [`ChatBackend`] trait so the workflow (and
//! its tests) never touch provider SDKs directly. The string-level entry
//! point, [`call_model`], is total: every failure mode is caught here and
//! returned as a sentinel-prefixed string.

use async_trait::async_trait;
use llm::{
    builder::{LLMBackend, LLMBuilder},
    chat::ChatMessage,
};

use super::error::ClientError;
use crate::core::config::{BackendConfig, BackendKind};

/// Token budget for the stage-1 (meta) call.
pub const META_MAX_TOKENS: u32 = 500;
/// Token budget for the stage-2 (execution) call.
pub const EXECUTION_MAX_TOKENS: u32 = 700;
/// Near-deterministic sampling for both stages.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy)]
pub struct CallParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CallParams {
    /// Parameters for the optimization (meta-prompt) call.
    pub fn meta() -> Self {
        CallParams {
            max_tokens: Some(META_MAX_TOKENS),
            temperature: Some(DEFAULT_TEMPERATURE),
        }
    }

    /// Parameters for the execution call.
    pub fn execution() -> Self {
        CallParams {
            max_tokens: Some(EXECUTION_MAX_TOKENS),
            temperature: Some(DEFAULT_TEMPERATURE),
        }
    }
}

impl Default for CallParams {
    fn default() -> Self {
        CallParams {
            max_tokens: None,
            temperature: Some(DEFAULT_TEMPERATURE),
        }
    }
}

/// Caller-supplied generation settings, applied on top of a stage's defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOverrides {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl CallParams {
    /// Apply overrides, keeping the stage defaults where none are given.
    pub fn apply(mut self, overrides: &CallOverrides) -> Self {
        if let Some(max_tokens) = overrides.max_tokens {
            self.max_tokens = Some(max_tokens);
        }
        if let Some(temperature) = overrides.temperature {
            self.temperature = Some(temperature);
        }
        self
    }
}

/// A single chat-completion capability.
///
/// One implementor per provider; adding a provider means adding an
/// implementor, never branching inside the workflow.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user-role prompt and return the model's text reply.
    async fn generate(&self, prompt: &str, params: &CallParams) -> Result<String, ClientError>;
}

/// Production [`ChatBackend`] backed by the `llm` crate.
pub struct ProviderBackend {
    config: BackendConfig,
}

impl ProviderBackend {
    pub fn new(config: BackendConfig) -> Self {
        ProviderBackend { config }
    }

    /// Resolve a backend from the environment for one call.
    pub fn from_env(kind: BackendKind, model: Option<&str>) -> Self {
        ProviderBackend::new(BackendConfig::from_env(kind, model))
    }
}

#[async_trait]
impl ChatBackend for ProviderBackend {
    async fn generate(&self, prompt: &str, params: &CallParams) -> Result<String, ClientError> {
        if prompt.trim().is_empty() {
            return Err(ClientError::Configuration(
                "Prompt must not be empty.".to_string(),
            ));
        }

        let mut builder = LLMBuilder::new().model(&self.config.model);

        match self.config.kind {
            BackendKind::Hosted => {
                // Validated before any network I/O.
                let api_key = self.config.api_key.as_deref().ok_or_else(|| {
                    ClientError::Configuration(format!(
                        "{} is not set; the hosted backend requires it.",
                        crate::core::config::HOSTED_API_KEY_VAR
                    ))
                })?;
                builder = builder.backend(LLMBackend::Groq).api_key(api_key);
            }
            BackendKind::Local => {
                builder = builder.backend(LLMBackend::Ollama);
                if let Some(base_url) = &self.config.base_url {
                    builder = builder.base_url(base_url);
                }
            }
        }

        if let Some(max_tokens) = params.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = params.temperature {
            builder = builder.temperature(temperature);
        }

        let llm = builder.build()?;

        let messages = vec![ChatMessage::user().content(prompt).build()];
        let response = llm.chat(&messages).await?;
        let text = response.text().unwrap_or_default();
        let text = text.trim();

        if text.is_empty() {
            return Err(ClientError::Provider(
                "The model returned an empty response.".to_string(),
            ));
        }
        Ok(text.to_string())
    }
}

/// Run one chat-completion call and always come back with a string.
///
/// Unknown backend identifiers, missing credentials, transport failures and
/// malformed responses all surface as a `⚠️ Error:`-prefixed message; the
/// caller can detect failure by prefix but never has to handle an error type.
pub async fn call_model(
    prompt: &str,
    backend_id: &str,
    model: Option<&str>,
    params: &CallParams,
) -> String {
    let kind: BackendKind = match backend_id.parse() {
        Ok(kind) => kind,
        Err(e) => return e.to_sentinel_string(),
    };
    let backend = ProviderBackend::from_env(kind, model);
    generate_string(&backend, prompt, params).await
}

/// Collapse a [`ChatBackend`] call into the total string contract.
pub async fn generate_string(
    backend: &dyn ChatBackend,
    prompt: &str,
    params: &CallParams,
) -> String {
    match backend.generate(prompt, params).await {
        Ok(text) => text,
        Err(e) => e.to_sentinel_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::is_error_sentinel;

    fn hosted_config_without_key() -> BackendConfig {
        BackendConfig {
            kind: BackendKind::Hosted,
            model: "test-model".to_string(),
            api_key: None,
            base_url: None,
        }
    }

    #[tokio::test]
    async fn hosted_without_credential_fails_before_any_network_call() {
        let backend = ProviderBackend::new(hosted_config_without_key());
        let err = backend
            .generate("hello", &CallParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_without_dispatch() {
        let backend = ProviderBackend::new(hosted_config_without_key());
        let err = backend
            .generate("   ", &CallParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[tokio::test]
    async fn unknown_backend_id_yields_a_sentinel_not_a_panic() {
        let out = call_model("hello", "openai", None, &CallParams::default()).await;
        assert!(is_error_sentinel(&out));
        assert!(out.contains("Unsupported backend"));
    }

    #[test]
    fn stage_params_use_the_recovered_budgets() {
        assert_eq!(CallParams::meta().max_tokens, Some(META_MAX_TOKENS));
        assert_eq!(CallParams::execution().max_tokens, Some(EXECUTION_MAX_TOKENS));
    }

    #[test]
    fn overrides_replace_only_what_they_set() {
        let tuned = CallParams::meta().apply(&CallOverrides {
            max_tokens: Some(1200),
            temperature: None,
        });
        assert_eq!(tuned.max_tokens, Some(1200));
        assert_eq!(tuned.temperature, Some(DEFAULT_TEMPERATURE));

        let untouched = CallParams::execution().apply(&CallOverrides::default());
        assert_eq!(untouched.max_tokens, Some(EXECUTION_MAX_TOKENS));
        assert_eq!(untouched.temperature, Some(DEFAULT_TEMPERATURE));
    }
}
