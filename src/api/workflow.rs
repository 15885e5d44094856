//! The two-stage APO (automatic prompt optimization) workflow.
//!
//! Stage 1 rewrites the user's task into a guardrailed prompt; stage 2
//! executes that prompt. Stage 2 never starts before stage 1 has fully
//! completed, and neither stage can abort the run: stage-1 failure falls
//! back to the raw task, stage-2 failure becomes the (sentinel-prefixed)
//! final answer.

use std::time::Instant;

use regex::Regex;
use serde::Serialize;

use super::client::{generate_string, CallOverrides, CallParams, ChatBackend, ProviderBackend};
use super::error::is_error_sentinel;
use crate::core::config::BackendKind;
use crate::core::prompt::build_meta_instruction;

/// Shape of the final output, for rendering purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// The model answered with a fenced code block; the fence body is the output.
    Code,
    /// Plain prose.
    Text,
}

/// Result of one full optimization cycle.
///
/// `optimized_prompt` and `final_output` are always non-empty strings,
/// whatever happened underneath.
#[derive(Debug, Clone, Serialize)]
pub struct ApoReport {
    /// The task exactly as the user submitted it.
    pub user_task: String,
    /// Role the optimization agent chose, when its prompt declared one.
    pub role: Option<String>,
    /// The guardrailed prompt shown to the user (role line stripped).
    pub optimized_prompt: String,
    /// The execution stage's answer, or its sentinel-prefixed error.
    pub final_output: String,
    pub output_kind: OutputKind,
    /// True when stage 1 failed and the raw task was executed instead.
    pub prompt_fallback: bool,
    pub execution_time_seconds: f64,
}

/// Run the workflow against an explicit backend with stage defaults.
///
/// This is the seam tests use: any [`ChatBackend`] works, and the function
/// never returns an error or panics.
pub async fn run_apo_with(backend: &dyn ChatBackend, user_input: &str) -> ApoReport {
    run_apo_with_params(backend, user_input, CallOverrides::default()).await
}

/// Run the workflow against an explicit backend, with caller-supplied
/// generation settings layered over both stages' defaults.
pub async fn run_apo_with_params(
    backend: &dyn ChatBackend,
    user_input: &str,
    overrides: CallOverrides,
) -> ApoReport {
    let started = Instant::now();

    // Stage 1: optimization. A failed or empty rewrite degrades to the raw
    // task; it must never stop the run.
    let meta_prompt = build_meta_instruction(user_input);
    let meta_params = CallParams::meta().apply(&overrides);
    let stage1 = generate_string(backend, &meta_prompt, &meta_params).await;
    let (optimized, prompt_fallback) = if is_error_sentinel(&stage1) || stage1.trim().is_empty() {
        (user_input.to_string(), true)
    } else {
        (stage1, false)
    };

    let (role, display_prompt) = extract_role(&optimized);

    // Stage 2: execution of the full stage-1 text (role line included).
    let execution_params = CallParams::execution().apply(&overrides);
    let stage2 = generate_string(backend, &optimized, &execution_params).await;

    let (final_output, output_kind) = if is_error_sentinel(&stage2) {
        (stage2, OutputKind::Text)
    } else {
        match extract_code_block(&stage2) {
            Some(code) => (code, OutputKind::Code),
            None => (stage2.trim().to_string(), OutputKind::Text),
        }
    };

    ApoReport {
        user_task: user_input.to_string(),
        role,
        optimized_prompt: display_prompt,
        final_output,
        output_kind,
        prompt_fallback,
        execution_time_seconds: started.elapsed().as_secs_f64(),
    }
}

/// Run the workflow, resolving the backend from the environment.
///
/// Configuration problems (unknown credential state included) flow through
/// the same sentinel path as any other failure; this function always
/// returns a report.
pub async fn run_apo(
    user_input: &str,
    kind: BackendKind,
    model: Option<&str>,
    overrides: CallOverrides,
) -> ApoReport {
    let backend = ProviderBackend::from_env(kind, model);
    run_apo_with_params(&backend, user_input, overrides).await
}

/// Pull a `ROLE: ...` declaration out of an optimized prompt.
///
/// Returns the role (if declared and non-empty) and a display copy of the
/// prompt with the role line removed. The display copy is never empty: if
/// stripping would erase everything, the prompt is returned untouched.
fn extract_role(optimized: &str) -> (Option<String>, String) {
    let capture = Regex::new(r"ROLE:? ?([A-Za-z0-9 ,\-]*)").unwrap();
    let role = capture
        .captures(optimized)
        .map(|c| c[1].trim().to_string())
        .filter(|r| !r.is_empty());

    let strip = Regex::new(r"ROLE:? ?[A-Za-z0-9 ,\-]*\n?").unwrap();
    let cleaned = strip.replace_all(optimized, "").trim().to_string();
    if cleaned.is_empty() {
        (role, optimized.to_string())
    } else {
        (role, cleaned)
    }
}

/// Extract the body of the first fenced code block, if any.
fn extract_code_block(output: &str) -> Option<String> {
    let fence = Regex::new(r"(?s)```[^\n]*\n(.*?)```").unwrap();
    fence
        .captures(output)
        .map(|c| c[1].trim().to_string())
        .filter(|body| !body.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{is_error_sentinel, ClientError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that pops one scripted reply per call and records every
    /// prompt it was given.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, ClientError>>>,
        seen: Mutex<Vec<String>>,
        params_seen: Mutex<Vec<CallParams>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, ClientError>>) -> Self {
            ScriptedBackend {
                replies: Mutex::new(replies.into_iter().collect()),
                seen: Mutex::new(Vec::new()),
                params_seen: Mutex::new(Vec::new()),
            }
        }

        fn prompts_seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }

        fn params_seen(&self) -> Vec<CallParams> {
            self.params_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn generate(
            &self,
            prompt: &str,
            params: &CallParams,
        ) -> Result<String, ClientError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.params_seen.lock().unwrap().push(*params);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("unscripted reply".to_string()))
        }
    }

    fn connectivity_failure() -> Result<String, ClientError> {
        Err(ClientError::Connectivity("connection refused".to_string()))
    }

    #[tokio::test]
    async fn both_report_strings_are_always_non_empty() {
        let backend = ScriptedBackend::new(vec![
            Ok("Explain recursion plainly.".to_string()),
            Ok("Recursion is when a function calls itself.".to_string()),
        ]);
        let report = run_apo_with(&backend, "explain recursion").await;
        assert!(!report.optimized_prompt.is_empty());
        assert!(!report.final_output.is_empty());
        assert!(!report.prompt_fallback);
    }

    #[tokio::test]
    async fn stage1_failure_falls_back_to_the_raw_task() {
        let backend = ScriptedBackend::new(vec![
            connectivity_failure(),
            Ok("an answer".to_string()),
        ]);
        let report = run_apo_with(&backend, "write a haiku about rust").await;

        assert!(report.prompt_fallback);
        assert_eq!(report.optimized_prompt, "write a haiku about rust");
        // Stage 2 must still run, with the fallback as its input.
        let seen = backend.prompts_seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], "write a haiku about rust");
        assert_eq!(report.final_output, "an answer");
    }

    #[tokio::test]
    async fn stage2_failure_is_the_final_answer() {
        let backend = ScriptedBackend::new(vec![
            Ok("A precise prompt.".to_string()),
            connectivity_failure(),
        ]);
        let report = run_apo_with(&backend, "do something").await;

        assert!(is_error_sentinel(&report.final_output));
        assert!(report.final_output.contains("Connectivity error"));
        assert_eq!(report.output_kind, OutputKind::Text);
        assert!(!report.prompt_fallback);
    }

    #[tokio::test]
    async fn add_two_numbers_scenario_passes_verbatim() {
        let optimized = "Write a Python function `add(a: int, b: int) -> int` \
                         with a docstring and type hints that returns the sum of two integers.";
        let answer = "def add(a: int, b: int) -> int:\n    \
                      \"\"\"Return the sum of a and b.\"\"\"\n    return a + b";
        let backend = ScriptedBackend::new(vec![
            Ok(optimized.to_string()),
            Ok(answer.to_string()),
        ]);

        let report = run_apo_with(&backend, "write a function to add two numbers").await;
        assert_eq!(report.optimized_prompt, optimized);
        assert_eq!(report.final_output, answer);
        assert_eq!(report.output_kind, OutputKind::Text);
    }

    #[tokio::test]
    async fn deterministic_backend_gives_identical_runs() {
        let script = || {
            ScriptedBackend::new(vec![
                Ok("Optimized.".to_string()),
                Ok("Final.".to_string()),
            ])
        };
        let first = run_apo_with(&script(), "same input").await;
        let second = run_apo_with(&script(), "same input").await;
        assert_eq!(first.optimized_prompt, second.optimized_prompt);
        assert_eq!(first.final_output, second.final_output);
    }

    #[tokio::test]
    async fn stage_defaults_hold_when_no_overrides_are_given() {
        let backend = ScriptedBackend::new(vec![
            Ok("Optimized.".to_string()),
            Ok("Final.".to_string()),
        ]);
        run_apo_with(&backend, "a task").await;

        let params = backend.params_seen();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].max_tokens, CallParams::meta().max_tokens);
        assert_eq!(params[1].max_tokens, CallParams::execution().max_tokens);
    }

    #[tokio::test]
    async fn caller_overrides_reach_both_stages() {
        let backend = ScriptedBackend::new(vec![
            Ok("Optimized.".to_string()),
            Ok("Final.".to_string()),
        ]);
        let overrides = CallOverrides {
            max_tokens: Some(1234),
            temperature: Some(0.7),
        };
        run_apo_with_params(&backend, "a task", overrides).await;

        let params = backend.params_seen();
        assert_eq!(params.len(), 2);
        for stage in &params {
            assert_eq!(stage.max_tokens, Some(1234));
            assert_eq!(stage.temperature, Some(0.7));
        }
    }

    #[tokio::test]
    async fn role_line_is_extracted_and_stripped_for_display() {
        let backend = ScriptedBackend::new(vec![
            Ok("ROLE: Senior Python Developer\nWrite well-documented code.".to_string()),
            Ok("fine".to_string()),
        ]);
        let report = run_apo_with(&backend, "help me").await;

        assert_eq!(report.role.as_deref(), Some("Senior Python Developer"));
        assert_eq!(report.optimized_prompt, "Write well-documented code.");
        // The execution stage still receives the full prompt.
        assert!(backend.prompts_seen()[1].starts_with("ROLE:"));
    }

    #[tokio::test]
    async fn fenced_code_is_unwrapped_and_classified() {
        let backend = ScriptedBackend::new(vec![
            Ok("A prompt.".to_string()),
            Ok("Here you go:\n```python\nprint(\"hi\")\n```".to_string()),
        ]);
        let report = run_apo_with(&backend, "print hi").await;
        assert_eq!(report.output_kind, OutputKind::Code);
        assert_eq!(report.final_output, "print(\"hi\")");
    }

    #[test]
    fn role_extraction_handles_missing_declarations() {
        let (role, cleaned) = extract_role("Just a prompt without a role.");
        assert!(role.is_none());
        assert_eq!(cleaned, "Just a prompt without a role.");
    }

    #[test]
    fn stripping_a_role_only_prompt_keeps_the_original_text() {
        let (role, cleaned) = extract_role("ROLE: Archivist");
        assert_eq!(role.as_deref(), Some("Archivist"));
        assert_eq!(cleaned, "ROLE: Archivist");
    }
}
