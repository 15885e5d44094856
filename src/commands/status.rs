use console::style;

use crate::core::config::{
    BackendConfig, BackendKind, DEFAULT_LOCAL_BASE_URL, HOSTED_API_KEY_VAR, LOCAL_BASE_URL_VAR,
};

/// Display which backend mode is active and the resolved defaults.
pub fn run() -> Result<(), String> {
    println!("{}", style("Backend status").bold().underlined());

    if BackendConfig::high_speed_available() {
        println!(
            "{} High-Speed Mode (Groq) is ACTIVE",
            style("✔").green().bold()
        );
    } else {
        println!(
            "{} Slow Mode (Ollama) is active. Set {} for speed.",
            style("!").yellow().bold(),
            HOSTED_API_KEY_VAR
        );
    }

    let local_base_url = std::env::var(LOCAL_BASE_URL_VAR)
        .unwrap_or_else(|_| DEFAULT_LOCAL_BASE_URL.to_string());

    println!(
        "{}: {}",
        style("Hosted default model").cyan(),
        BackendKind::Hosted.default_model()
    );
    println!(
        "{}: {}",
        style("Local default model").cyan(),
        BackendKind::Local.default_model()
    );
    println!("{}: {}", style("Local server").cyan(), local_base_url);

    Ok(())
}
