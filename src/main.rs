//! Telar CLI — Rust-native Kubernetes manifest generation.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "telar",
    version,
    about = "Rust-native Kubernetes manifest generation — composable modules, dependency injection, deterministic output"
)]
struct Cli {
    #[command(subcommand)]
    command: telar::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = telar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
