//! Defines the command-line interface structure using clap.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "prompt-optimizer", version, about = "Two-stage prompt refinement workflow")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Optimize a vague task into a guardrailed prompt, then execute it
    Run {
        /// The task to refine and execute; read from stdin when omitted
        task: Option<String>,
        /// Backend to use: 'hosted' (Groq) or 'local' (Ollama).
        /// Defaults to hosted when a credential is configured, local otherwise.
        #[arg(long)]
        backend: Option<String>,
        /// Model name (defaults to the backend's standard model)
        #[arg(long)]
        model: Option<String>,
        /// Token budget for both stages (defaults: 500 meta, 700 execution)
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Sampling temperature for both stages (default: 0.1)
        #[arg(long)]
        temperature: Option<f32>,
        /// Print the full report as JSON instead of styled output
        #[arg(long)]
        json: bool,
    },
    /// Show which backend mode is active and the resolved defaults
    Status,
    /// Start an interactive session (REPL), one task per line
    Interactive {
        /// Backend to use for every task in the session
        #[arg(long)]
        backend: Option<String>,
        /// Model name (defaults to the backend's standard model)
        #[arg(long)]
        model: Option<String>,
    },
}
