use std::io::Read;

use console::style;
use spinners::{Spinner, Spinners};

use crate::api::{is_error_sentinel, run_apo, ApoReport, CallOverrides, OutputKind};
use crate::commands::resolve_backend;

/// Run the full two-stage workflow for one task and print the results.
pub async fn run(
    task: Option<&str>,
    backend: Option<&str>,
    model: Option<&str>,
    overrides: CallOverrides,
    json: bool,
) -> Result<(), String> {
    let task = match task {
        Some(t) => t.trim().to_string(),
        None => read_task_from_stdin()?,
    };
    if task.is_empty() {
        return Err("No task entered.".to_string());
    }

    let kind = resolve_backend(backend)?;

    let mut sp = Spinner::new(
        Spinners::Dots9,
        "Running the two-stage optimization workflow...".into(),
    );
    let report = run_apo(&task, kind, model, overrides).await;
    sp.stop_with_message("✔ Workflow complete.".into());

    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", rendered);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

/// Read a multiline task from standard input until EOF.
fn read_task_from_stdin() -> Result<String, String> {
    println!("Enter a vague or general task (finish with Ctrl+D):");
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("Failed to read task from stdin: {}", e))?;
    Ok(buf.trim().to_string())
}

pub(crate) fn print_report(report: &ApoReport) {
    println!();
    println!(
        "{} {:.2}s   {} {}   {} {}",
        style("Cycle time:").cyan(),
        report.execution_time_seconds,
        style("Role:").cyan(),
        report.role.as_deref().unwrap_or("n/a"),
        style("Output:").cyan(),
        match report.output_kind {
            OutputKind::Code => "code",
            OutputKind::Text => "text",
        }
    );

    if report.prompt_fallback {
        println!(
            "{}",
            style("Warning: prompt optimization failed; the raw task was executed instead.")
                .yellow()
        );
    }

    println!();
    println!("{}", style("1. Optimized Prompt").green().bold());
    println!("{}", report.optimized_prompt);
    println!();
    println!("{}", style("2. Final Output").green().bold());
    if is_error_sentinel(&report.final_output) {
        println!("{}", style(&report.final_output).red());
        println!(
            "{}",
            style("Check your configuration (GROQ_API_KEY, or 'ollama serve' running).").yellow()
        );
    } else {
        println!("{}", report.final_output);
    }
}
