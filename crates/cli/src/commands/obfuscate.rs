//! Runs the full search pipeline on the sample program and prints the
//! mutated C source, optionally with the JSON run report.

use super::CliError;
use crate::sample::quicksort_program;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use veil_core::{FixedOracle, GccOracle, NamePool, Oracle, Seed};
use veil_transform::search::{
    run_search, Fitness, SearchConfig, Strategy, ValidationCadence,
};

/// Arguments for the `obfuscate` subcommand.
#[derive(Args)]
pub struct ObfuscateArgs {
    /// Harness object file for the compile-and-test oracle. Without one the
    /// run is a dry run that accepts every candidate.
    #[arg(long)]
    harness: Option<PathBuf>,
    /// Number of search iterations.
    #[arg(long, default_value_t = 250)]
    iterations: usize,
    /// 256-bit seed as hex (random when omitted).
    #[arg(long)]
    seed: Option<String>,
    /// Acceptance strategy: greedy, metropolis or annealing.
    #[arg(long, default_value = "metropolis")]
    strategy: String,
    /// Initial temperature (annealing only).
    #[arg(long, default_value_t = 1.0)]
    temperature: f64,
    /// Geometric cooling factor (annealing only).
    #[arg(long, default_value_t = 0.95)]
    cooling: f64,
    /// Validate every accepted candidate instead of adaptive batches.
    #[arg(long)]
    every_candidate: bool,
    /// Output file for the mutated source (default: stdout)
    #[arg(short, long)]
    output: Option<String>,
    /// Print the JSON run report to stderr.
    #[arg(long)]
    report: bool,
}

impl ObfuscateArgs {
    fn strategy(&self) -> Result<Strategy, CliError> {
        match self.strategy.as_str() {
            "greedy" => Ok(Strategy::Greedy),
            "metropolis" => Ok(Strategy::Metropolis),
            "annealing" => Ok(Strategy::Annealing {
                initial_temperature: self.temperature,
                cooling: self.cooling,
            }),
            other => Err(CliError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Executes the `obfuscate` subcommand.
#[async_trait]
impl super::Command for ObfuscateArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let seed = match &self.seed {
            Some(hex) => Seed::from_hex(hex).map_err(CliError::Core)?,
            None => Seed::generate(),
        };
        info!(seed = %seed.to_hex(), "using seed");
        let mut rng = seed.create_deterministic_rng();
        let mut names = NamePool::synthetic(4096);

        let oracle: Box<dyn Oracle> = match &self.harness {
            Some(harness) => Box::new(GccOracle::new(harness.clone())),
            None => Box::new(FixedOracle(true)),
        };

        let config = SearchConfig {
            iterations: self.iterations,
            strategy: self.strategy()?,
            fitness: Fitness::EditDistance,
            cadence: if self.every_candidate {
                ValidationCadence::EveryCandidate
            } else {
                ValidationCadence::Adaptive
            },
        };

        let outcome = run_search(
            quicksort_program(),
            oracle.as_ref(),
            &config,
            &mut rng,
            &mut names,
        )
        .await
        .map_err(CliError::Transform)?;

        if self.report {
            let json = serde_json::to_string_pretty(&outcome.report).map_err(CliError::Serialize)?;
            eprintln!("{json}");
        }

        let source = outcome.program.to_string();
        if let Some(out_path) = self.output {
            fs::write(out_path, &source).map_err(CliError::File)?;
        } else {
            println!("{source}");
        }
        Ok(())
    }
}
