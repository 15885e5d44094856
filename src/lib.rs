pub mod api;
pub mod cli;
pub mod commands;
pub mod core;

pub use api::{
    call_model, is_error_sentinel, run_apo, run_apo_with, run_apo_with_params, ApoReport,
    CallOverrides, CallParams, ChatBackend, ClientError, OutputKind, ProviderBackend,
    ERROR_SENTINEL,
};
pub use crate::core::config::{BackendConfig, BackendKind};
