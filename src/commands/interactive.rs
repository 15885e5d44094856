use console::style;
use dialoguer::Input;

use crate::api::{run_apo, CallOverrides};
use crate::commands::{resolve_backend, run::print_report};

/// Run the workflow in interactive REPL mode, one task per line.
pub async fn run(backend: Option<&str>, model: Option<&str>) -> Result<(), String> {
    let kind = resolve_backend(backend)?;
    println!(
        "Entering interactive mode on the {} backend. Type 'exit' or 'quit' to leave.",
        style(kind.to_string()).yellow()
    );

    loop {
        let input: String = Input::new()
            .with_prompt(format!("{}", style("apo >").blue().bold()))
            .interact_text()
            .map_err(|e| format!("Input error: {}", e))?;

        let input = input.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        let report = run_apo(input, kind, model, CallOverrides::default()).await;
        print_report(&report);
    }
    Ok(())
}
