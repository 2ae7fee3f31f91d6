use clap::Parser;
use veil_cli::commands::{Cmd, Command};

/// Veil CLI
///
/// Veil is a semantics-preserving C source obfuscator: it builds control-flow
/// graphs of a program, mutates the program with goto rewrites, opaque
/// clauses and variable shuffles, and validates every step against a
/// compile-and-test oracle.
#[derive(Parser)]
#[command(name = "veil")]
#[command(about = "Veil: semantics-preserving C source obfuscator")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the Veil CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    cli.command.execute().await
}
