//! Weighted operator selection.
//!
//! A roll in `0..100` picks the operator band. Opaque-clause work dominates
//! the distribution; structural rewrites and variable shuffling fill the
//! rest. Paired operators (conditionalize/inverse, insert/remove) split
//! their band evenly so the walk can back out of its own rewrites.

use crate::globals::{DummyAssignment, GlobalizeLocal};
use crate::gotos::{ConditionalizeGoto, GotoIfRewrite, InverseConditionalizeGoto};
use crate::opaque::{OpaqueInsert, OpaqueRemove};
use crate::variables::MutateQualifiers;
use crate::{Mutation, MutationCtx, Result};
use rand::rngs::StdRng;
use rand::Rng;
use veil_core::Program;

/// Draws an operator according to the catalog weights.
pub fn random_operator(rng: &mut StdRng) -> &'static dyn Mutation {
    let roll = rng.random_range(0..100u32);
    if roll < 10 {
        &GlobalizeLocal
    } else if roll < 15 {
        &MutateQualifiers
    } else if roll < 20 {
        &DummyAssignment
    } else if roll < 30 {
        if rng.random::<f64>() > 0.5 {
            &ConditionalizeGoto
        } else {
            &InverseConditionalizeGoto
        }
    } else if roll < 90 {
        if rng.random::<f64>() > 0.5 {
            &OpaqueInsert
        } else {
            &OpaqueRemove
        }
    } else {
        &GotoIfRewrite
    }
}

/// Draws and applies one operator; returns its name and whether it changed
/// the program.
pub fn apply_random(program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<(&'static str, bool)> {
    let operator = random_operator(ctx.rng);
    let changed = operator.apply(program, ctx)?;
    Ok((operator.name(), changed))
}
