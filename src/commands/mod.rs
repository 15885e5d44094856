use std::str::FromStr;

use crate::api::CallOverrides;
use crate::cli::Cmd;
use crate::core::config::{BackendConfig, BackendKind};

pub mod interactive;
pub mod run;
pub mod status;

/// Dispatches the parsed command to the appropriate handler.
pub async fn dispatch(command: Cmd) -> Result<(), String> {
    match command {
        Cmd::Run {
            task,
            backend,
            model,
            max_tokens,
            temperature,
            json,
        } => {
            let overrides = CallOverrides {
                max_tokens,
                temperature,
            };
            run::run(
                task.as_deref(),
                backend.as_deref(),
                model.as_deref(),
                overrides,
                json,
            )
            .await
        }
        Cmd::Status => status::run(),
        Cmd::Interactive { backend, model } => {
            interactive::run(backend.as_deref(), model.as_deref()).await
        }
    }
}

/// Pick the backend for a command: an explicit choice wins, otherwise the
/// hosted provider when its credential is configured, else the local server.
pub fn resolve_backend(backend: Option<&str>) -> Result<BackendKind, String> {
    match backend {
        Some(id) => BackendKind::from_str(id).map_err(|e| e.to_string()),
        None => {
            if BackendConfig::high_speed_available() {
                Ok(BackendKind::Hosted)
            } else {
                Ok(BackendKind::Local)
            }
        }
    }
}
