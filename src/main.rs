use clap::Parser;
use prompt_optimizer::cli::Cli;
use prompt_optimizer::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = commands::dispatch(cli.command).await {
        eprintln!("• {}", e);
        std::process::exit(1);
    }
}
