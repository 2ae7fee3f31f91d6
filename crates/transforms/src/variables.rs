//! Type-level variable mutations.

use crate::sites::random_function_index;
use crate::{Mutation, MutationCtx, Result};
use rand::Rng;
use veil_core::{Item, Program, Stmt, TypeSpec};

const QUALIFIERS: [&str; 4] = ["volatile", "extern", "unsigned", "long"];
const BASE_TYPES: [&str; 4] = ["int", "char", "float", "double"];

/// Rewrites the declaration tokens of a random variable, picked from the
/// globals or the top-level locals of one random function. Three weighted
/// outcomes: add a qualifier, swap the base type, or drop qualifiers.
/// Pointer and array declarations are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutateQualifiers;

impl Mutation for MutateQualifiers {
    fn name(&self) -> &'static str {
        "mutate_qualifiers"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        enum Target {
            Global(usize),
            Local(usize, usize),
        }

        let mut targets: Vec<Target> = program
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| matches!(item, Item::Global(_)).then_some(Target::Global(i)))
            .collect();
        if let Some(func_idx) = random_function_index(program, ctx.rng) {
            if let Item::Func(func) = &program.items[func_idx] {
                targets.extend(func.body.iter().enumerate().filter_map(|(i, stmt)| {
                    matches!(stmt, Stmt::Decl(_)).then_some(Target::Local(func_idx, i))
                }));
            }
        }
        if targets.is_empty() {
            return Ok(false);
        }

        let target = &targets[ctx.rng.random_range(0..targets.len())];
        let decl = match target {
            Target::Global(i) => match &mut program.items[*i] {
                Item::Global(decl) => decl,
                Item::Func(_) => return Ok(false),
            },
            Target::Local(f, s) => match &mut program.items[*f] {
                Item::Func(func) => match &mut func.body[*s] {
                    Stmt::Decl(decl) => decl,
                    _ => return Ok(false),
                },
                Item::Global(_) => return Ok(false),
            },
        };
        let TypeSpec::Named { tokens } = &mut decl.ty else {
            return Ok(false);
        };

        let roll: f64 = ctx.rng.random();
        if roll < 0.3 {
            let qualifier = QUALIFIERS[ctx.rng.random_range(0..QUALIFIERS.len())];
            if tokens.iter().any(|t| t == qualifier) {
                return Ok(false);
            }
            tokens.insert(0, qualifier.to_string());
        } else if roll < 0.6 {
            let mut changed = false;
            for token in tokens.iter_mut() {
                if BASE_TYPES.contains(&token.as_str()) {
                    let swap = BASE_TYPES[ctx.rng.random_range(0..BASE_TYPES.len())];
                    changed |= swap != token;
                    *token = swap.to_string();
                }
            }
            if !changed {
                return Ok(false);
            }
        } else {
            let before = tokens.len();
            let mut kept = Vec::with_capacity(before);
            for token in tokens.drain(..) {
                if BASE_TYPES.contains(&token.as_str()) || ctx.rng.random::<f64>() > 0.5 {
                    kept.push(token);
                }
            }
            *tokens = kept;
            if tokens.len() == before {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
