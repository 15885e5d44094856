//! Backend configuration, resolved from the process environment.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::api::error::ClientError;

/// Default model served by the hosted high-speed provider.
pub const DEFAULT_HOSTED_MODEL: &str = "moonshotai/kimi-k2-instruct-0905";
/// Default model expected on the local inference server.
pub const DEFAULT_LOCAL_MODEL: &str = "llama3.1";
/// Default address of the local inference server.
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434";

/// Environment variable holding the hosted provider credential.
pub const HOSTED_API_KEY_VAR: &str = "GROQ_API_KEY";
/// Environment variable overriding the local server address.
pub const LOCAL_BASE_URL_VAR: &str = "OLLAMA_BASE_URL";

/// The two interchangeable inference providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote high-speed API (Groq), authenticated via `GROQ_API_KEY`.
    Hosted,
    /// Locally running inference server (Ollama), no credential.
    Local,
}

impl BackendKind {
    /// Default model name for this backend.
    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::Hosted => DEFAULT_HOSTED_MODEL,
            BackendKind::Local => DEFAULT_LOCAL_MODEL,
        }
    }
}

impl FromStr for BackendKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" | "groq" => Ok(BackendKind::Hosted),
            "local" | "ollama" => Ok(BackendKind::Local),
            other => Err(ClientError::Configuration(format!(
                "Unsupported backend '{}'. Use 'hosted' or 'local'.",
                other
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Hosted => write!(f, "hosted"),
            BackendKind::Local => write!(f, "local"),
        }
    }
}

/// Everything one chat-completion call needs, resolved up front.
///
/// Constructed from the environment once per call via [`BackendConfig::from_env`],
/// or built directly in tests. The core never mutates environment state and
/// never caches a resolved config across calls.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model: String,
    /// Credential for the hosted provider. `None` for the local server.
    pub api_key: Option<String>,
    /// Base URL override for the local server.
    pub base_url: Option<String>,
}

impl BackendConfig {
    /// Resolve a configuration from the process environment.
    ///
    /// Absence of the hosted credential is not an error here: validation
    /// happens at call time in the client so the failure surfaces as a
    /// sentinel string rather than a construction panic.
    pub fn from_env(kind: BackendKind, model: Option<&str>) -> Self {
        let model = model
            .map(str::to_string)
            .unwrap_or_else(|| kind.default_model().to_string());

        match kind {
            BackendKind::Hosted => BackendConfig {
                kind,
                model,
                api_key: env::var(HOSTED_API_KEY_VAR).ok().filter(|k| !k.is_empty()),
                base_url: None,
            },
            BackendKind::Local => BackendConfig {
                kind,
                model,
                api_key: None,
                base_url: Some(
                    env::var(LOCAL_BASE_URL_VAR)
                        .unwrap_or_else(|_| DEFAULT_LOCAL_BASE_URL.to_string()),
                ),
            },
        }
    }

    /// True when the hosted provider can be used (credential present).
    pub fn high_speed_available() -> bool {
        env::var(HOSTED_API_KEY_VAR).map_or(false, |k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parses_aliases() {
        assert_eq!("hosted".parse::<BackendKind>().unwrap(), BackendKind::Hosted);
        assert_eq!("GROQ".parse::<BackendKind>().unwrap(), BackendKind::Hosted);
        assert_eq!("local".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("ollama".parse::<BackendKind>().unwrap(), BackendKind::Local);
    }

    #[test]
    fn unknown_backend_is_a_configuration_error() {
        let err = "openai".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn default_models_follow_the_backend() {
        assert_eq!(BackendKind::Hosted.default_model(), DEFAULT_HOSTED_MODEL);
        assert_eq!(BackendKind::Local.default_model(), DEFAULT_LOCAL_MODEL);
    }
}
