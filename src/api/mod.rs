//! Public API for the two-stage prompt-optimization workflow.

pub mod client;
pub mod error;
pub mod workflow;

pub use client::{call_model, CallOverrides, CallParams, ChatBackend, ProviderBackend};
pub use error::{is_error_sentinel, ClientError, ERROR_SENTINEL};
pub use workflow::{run_apo, run_apo_with, run_apo_with_params, ApoReport, OutputKind};
