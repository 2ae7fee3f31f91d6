use async_trait::async_trait;
use clap::Subcommand;
use std::error::Error;

pub mod cfg;
pub mod distance;
pub mod obfuscate;

use thiserror::Error;

/// Errors that can occur while running a subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core operation failed.
    #[error("core error: {0}")]
    Core(#[from] veil_core::Error),
    /// Mutation or search failure.
    #[error("transform error: {0}")]
    Transform(#[from] veil_transform::Error),
    /// File read/write error.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// Unknown acceptance strategy name.
    #[error("invalid strategy: {0} (expected greedy, metropolis or annealing)")]
    InvalidStrategy(String),
    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// CLI subcommands for Veil.
#[derive(Subcommand)]
pub enum Cmd {
    /// Write the sample program's CFG as Graphviz dot to stdout or a file.
    Cfg(cfg::CfgArgs),
    /// Obfuscate the sample program and print the mutated C source.
    Obfuscate(obfuscate::ObfuscateArgs),
    /// Mutate for N steps and report the simplified-CFG edit distance.
    Distance(distance::DistanceArgs),
}

/// Trait for executing CLI subcommands.
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Cfg(args) => args.execute().await,
            Cmd::Obfuscate(args) => args.execute().await,
            Cmd::Distance(args) => args.execute().await,
        }
    }
}
