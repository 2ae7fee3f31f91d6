//! Loop-unrolling pre-pass.
//!
//! Rewrites every `while` and `for` at the top level of a function body into
//! label/goto form so the goto-level operators get traction. The condition
//! is checked before the body, preserving zero-iteration loops:
//!
//! ```c
//! entry: ;
//! if (cond) {} else { goto end; }
//! <body>
//! <step>;        /* for loops only */
//! goto entry;
//! end: ;
//! ```
//!
//! A rewrite splices the loop body to the top level, so loops nested inside
//! loop bodies surface and are rewritten on a later scan. Loops nested in
//! branches are left alone.

use crate::sites::flatten;
use crate::{MutationCtx, Result};
use tracing::debug;
use veil_core::{Expr, Item, Program, Stmt};

/// Rewrites all top-level loops in every function. Draws two fresh labels
/// per loop from the name pool.
pub fn unroll_loops(program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<()> {
    let mut rewritten = 0usize;
    for item in &mut program.items {
        let Item::Func(func) = item else {
            continue;
        };
        while let Some(idx) = func
            .body
            .iter()
            .position(|stmt| matches!(stmt, Stmt::While { .. } | Stmt::For { .. }))
        {
            let entry_label = ctx.names.take(ctx.rng)?;
            let end_label = ctx.names.take(ctx.rng)?;
            let replacement = match func.body.remove(idx) {
                Stmt::While { cond, body } => {
                    rewrite_loop(entry_label, end_label, None, Some(cond), None, *body)
                }
                Stmt::For {
                    init,
                    cond,
                    step,
                    body,
                } => rewrite_loop(entry_label, end_label, init.map(|i| *i), cond, step, *body),
                _ => unreachable!("position only matches loops"),
            };
            func.body.splice(idx..idx, replacement);
            rewritten += 1;
        }
    }
    debug!(rewritten, "unrolled loops");
    Ok(())
}

fn rewrite_loop(
    entry_label: String,
    end_label: String,
    init: Option<Stmt>,
    cond: Option<Expr>,
    step: Option<Expr>,
    body: Stmt,
) -> Vec<Stmt> {
    let mut seq = Vec::new();
    if let Some(init) = init {
        seq.push(init);
    }
    seq.push(Stmt::Label {
        name: entry_label.clone(),
        inner: None,
    });
    if let Some(cond) = cond {
        seq.push(Stmt::If {
            cond,
            then_branch: Box::new(Stmt::Block(vec![])),
            else_branch: Some(Box::new(Stmt::Block(vec![Stmt::Goto(end_label.clone())]))),
        });
    }
    seq.extend(flatten(body));
    if let Some(step) = step {
        seq.push(Stmt::Other(step.to_string()));
    }
    seq.push(Stmt::Goto(entry_label));
    seq.push(Stmt::Label {
        name: end_label,
        inner: None,
    });
    seq
}
