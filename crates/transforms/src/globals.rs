//! Operators over file-scope variables.

use crate::sites::{global_names, random_function_index, rename_everywhere};
use crate::{Mutation, MutationCtx, Result};
use rand::Rng;
use tracing::debug;
use veil_core::{Decl, Expr, Item, Program, Stmt};

/// Hoists a random block-scope declaration to file scope, leaving an
/// assignment of the original initializer in its place. Uninitialized locals
/// get an explicit `= 0`, matching the zero-initialization globals receive.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalizeLocal;

impl Mutation for GlobalizeLocal {
    fn name(&self) -> &'static str {
        "globalize_local"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let Some(func_idx) = random_function_index(program, ctx.rng) else {
            return Ok(false);
        };
        let Item::Func(func) = &mut program.items[func_idx] else {
            return Ok(false);
        };

        let decl_indices: Vec<usize> = func
            .body
            .iter()
            .enumerate()
            .filter_map(|(i, stmt)| matches!(stmt, Stmt::Decl(_)).then_some(i))
            .collect();
        if decl_indices.is_empty() {
            return Ok(false);
        }
        let stmt_idx = decl_indices[ctx.rng.random_range(0..decl_indices.len())];

        let Stmt::Decl(decl) = func.body[stmt_idx].clone() else {
            return Ok(false);
        };
        let init = decl.init.unwrap_or_else(|| Expr::int(0));
        func.body[stmt_idx] = Stmt::assign(Expr::Ident(decl.name.clone()), init);

        debug!(variable = %decl.name, "globalized local");
        program.items.insert(
            0,
            Item::Global(Decl {
                name: decl.name,
                ty: decl.ty,
                init: None,
            }),
        );
        Ok(true)
    }
}

/// Deletes a random global and redirects every use of it to another global
/// of the same type. A no-op unless at least two same-typed globals exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeGlobals;

impl Mutation for MergeGlobals {
    fn name(&self) -> &'static str {
        "merge_globals"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let globals: Vec<(usize, Decl)> = program
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                Item::Global(decl) => Some((i, decl.clone())),
                Item::Func(_) => None,
            })
            .collect();
        if globals.len() < 2 {
            return Ok(false);
        }

        let (candidate_idx, candidate) = &globals[ctx.rng.random_range(0..globals.len())];
        let same_type: Vec<&(usize, Decl)> = globals
            .iter()
            .filter(|(i, decl)| i != candidate_idx && decl.ty == candidate.ty)
            .collect();
        if same_type.is_empty() {
            return Ok(false);
        }
        let (_, replacement) = same_type[ctx.rng.random_range(0..same_type.len())];

        let from = candidate.name.clone();
        let to = replacement.name.clone();
        program.items.remove(*candidate_idx);
        rename_everywhere(program, &from, &to);
        debug!(removed = %from, kept = %to, "merged globals");
        Ok(true)
    }
}

/// Inserts a spurious `g = 42;` into a random position of a random function,
/// targeting a random global. Dead by construction as long as the harness
/// only observes function return values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyAssignment;

impl Mutation for DummyAssignment {
    fn name(&self) -> &'static str {
        "dummy_assignment"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let globals = global_names(program);
        if globals.is_empty() {
            return Ok(false);
        }
        let Some(func_idx) = random_function_index(program, ctx.rng) else {
            return Ok(false);
        };
        let target = globals[ctx.rng.random_range(0..globals.len())].clone();

        let Item::Func(func) = &mut program.items[func_idx] else {
            return Ok(false);
        };
        let insert_at = ctx.rng.random_range(0..=func.body.len());
        func.body
            .insert(insert_at, Stmt::assign(Expr::Ident(target), Expr::int(42)));
        Ok(true)
    }
}
