//! Edit-distance characterization: mutate the sample program for N steps
//! without an oracle and print the simplified-CFG distance from the
//! reference after each step.

use super::CliError;
use crate::sample::quicksort_program;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use veil_analysis::edit_distance;
use veil_core::{build_program, simplify, NamePool, Seed};
use veil_transform::catalog::apply_random;
use veil_transform::unroll::unroll_loops;
use veil_transform::uniquify::uniquify_variables;
use veil_transform::MutationCtx;

/// Arguments for the `distance` subcommand.
#[derive(Args)]
pub struct DistanceArgs {
    /// Number of mutation steps.
    #[arg(long, default_value_t = 25)]
    steps: usize,
    /// 256-bit seed as hex (random when omitted).
    #[arg(long)]
    seed: Option<String>,
}

/// Executes the `distance` subcommand.
#[async_trait]
impl super::Command for DistanceArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let seed = match &self.seed {
            Some(hex) => Seed::from_hex(hex).map_err(CliError::Core)?,
            None => Seed::generate(),
        };
        let mut rng = seed.create_deterministic_rng();
        let mut names = NamePool::synthetic(4096);

        let mut program = quicksort_program();
        uniquify_variables(&mut program);
        {
            let mut ctx = MutationCtx {
                rng: &mut rng,
                names: &mut names,
            };
            unroll_loops(&mut program, &mut ctx).map_err(CliError::Transform)?;
        }
        let reference = simplify(build_program(&program));

        println!("seed: {}", seed.to_hex());
        for step in 1..=self.steps {
            let (operator, changed) = {
                let mut ctx = MutationCtx {
                    rng: &mut rng,
                    names: &mut names,
                };
                apply_random(&mut program, &mut ctx).map_err(CliError::Transform)?
            };
            let cfg = simplify(build_program(&program));
            let distance = edit_distance(&reference, &cfg);
            println!(
                "step {step:3}: {operator:<28} changed={changed:<5} distance={distance}"
            );
        }
        Ok(())
    }
}
