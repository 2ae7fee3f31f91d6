//! Mutation operators over C-like ASTs, the weighted operator catalog, the
//! pre-passes that put a program into mutable form, and the search driver
//! that strings them together against a validation oracle.

pub mod catalog;
pub mod globals;
pub mod gotos;
pub mod opaque;
pub mod search;
pub mod sites;
pub mod unroll;
pub mod uniquify;
pub mod variables;

use rand::rngs::StdRng;
use thiserror::Error;
use veil_core::{NamePool, Program};

/// Transform error type encompassing all mutation module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Core operation failed.
    #[error("core operation failed: {0}")]
    Core(#[from] veil_core::Error),

    /// An operator found its own output malformed.
    #[error("{operator} violated its contract: {reason}")]
    InvariantViolation {
        /// Operator name as reported by [`Mutation::name`].
        operator: &'static str,
        /// What went wrong.
        reason: String,
    },
}

/// Transform result type
pub type Result<T> = std::result::Result<T, Error>;

/// Shared resources every operator application gets: the run's RNG and the
/// fresh-identifier pool. Operators draw all randomness from here so a run is
/// reproducible from its seed.
pub struct MutationCtx<'a> {
    pub rng: &'a mut StdRng,
    pub names: &'a mut NamePool,
}

/// Trait for semantics-preserving source mutations.
///
/// Operators are total over well-formed programs: when no applicable site
/// exists they return `Ok(false)` and leave the program untouched.
pub trait Mutation: Send + Sync {
    /// Returns the operator's name for logging and identification.
    fn name(&self) -> &'static str;
    /// Applies the operator to the program, returning whether changes were made.
    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool>;
}
