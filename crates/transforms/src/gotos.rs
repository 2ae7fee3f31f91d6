//! Branch/goto rewrites. `GotoIfRewrite` lowers a structured `if` into
//! goto-and-label form; the conditionalize pair wraps and unwraps gotos in
//! constant-true ifs. All three leave the simplified CFG unchanged.

use crate::sites::flatten;
use crate::{Mutation, MutationCtx, Result};
use rand::Rng;
use tracing::debug;
use veil_core::{Expr, FuncDef, Item, Program, Stmt};

fn random_function<'a>(
    program: &'a mut Program,
    ctx: &mut MutationCtx<'_>,
) -> Option<&'a mut FuncDef> {
    let funcs: Vec<usize> = program
        .items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| matches!(item, Item::Func(_)).then_some(i))
        .collect();
    if funcs.is_empty() {
        return None;
    }
    let idx = funcs[ctx.rng.random_range(0..funcs.len())];
    match &mut program.items[idx] {
        Item::Func(func) => Some(func),
        Item::Global(_) => None,
    }
}

/// Rewrites a random top-level `if` into explicit control flow:
///
/// ```c
/// if (c) goto t; else goto f;
/// t: <then body> goto e;
/// f: <else body>
/// e: ;
/// ```
///
/// Draws three fresh labels from the name pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct GotoIfRewrite;

impl Mutation for GotoIfRewrite {
    fn name(&self) -> &'static str {
        "goto_if_rewrite"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let Some(func) = random_function(program, ctx) else {
            return Ok(false);
        };
        let if_indices: Vec<usize> = func
            .body
            .iter()
            .enumerate()
            .filter_map(|(i, stmt)| matches!(stmt, Stmt::If { .. }).then_some(i))
            .collect();
        if if_indices.is_empty() {
            return Ok(false);
        }
        let idx = if_indices[ctx.rng.random_range(0..if_indices.len())];

        let true_label = ctx.names.take(ctx.rng)?;
        let false_label = ctx.names.take(ctx.rng)?;
        let end_label = ctx.names.take(ctx.rng)?;

        let Stmt::If {
            cond,
            then_branch,
            else_branch,
        } = func.body.remove(idx)
        else {
            // idx came from a scan over if statements; losing the removed
            // statement here would corrupt the program.
            return Err(crate::Error::InvariantViolation {
                operator: self.name(),
                reason: "selected statement is not an if".to_string(),
            });
        };

        let dispatch = Stmt::If {
            cond,
            then_branch: Box::new(Stmt::Block(vec![Stmt::Goto(true_label.clone())])),
            else_branch: Some(Box::new(Stmt::Block(vec![Stmt::Goto(false_label.clone())]))),
        };

        let mut replacement = vec![dispatch];
        replacement.push(Stmt::Label {
            name: true_label,
            inner: None,
        });
        replacement.extend(flatten(*then_branch));
        replacement.push(Stmt::Goto(end_label.clone()));
        replacement.push(Stmt::Label {
            name: false_label,
            inner: None,
        });
        if let Some(else_branch) = else_branch {
            replacement.extend(flatten(*else_branch));
        }
        replacement.push(Stmt::Label {
            name: end_label,
            inner: None,
        });

        let count = replacement.len();
        func.body.splice(idx..idx, replacement);
        debug!(statements = count, "lowered if to goto form");
        Ok(true)
    }
}

/// Wraps a random top-level `goto` in a constant-true `if`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalizeGoto;

impl Mutation for ConditionalizeGoto {
    fn name(&self) -> &'static str {
        "conditionalize_goto"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let Some(func) = random_function(program, ctx) else {
            return Ok(false);
        };
        let goto_indices: Vec<usize> = func
            .body
            .iter()
            .enumerate()
            .filter_map(|(i, stmt)| matches!(stmt, Stmt::Goto(_)).then_some(i))
            .collect();
        if goto_indices.is_empty() {
            return Ok(false);
        }
        let idx = goto_indices[ctx.rng.random_range(0..goto_indices.len())];

        let goto = func.body[idx].clone();
        func.body[idx] = Stmt::If {
            cond: Expr::int(1),
            then_branch: Box::new(Stmt::Block(vec![goto])),
            else_branch: None,
        };
        Ok(true)
    }
}

/// Exact inverse of [`ConditionalizeGoto`]: unwraps a top-level
/// `if (1) { ... }` with no else branch, splicing its body in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseConditionalizeGoto;

impl Mutation for InverseConditionalizeGoto {
    fn name(&self) -> &'static str {
        "inverse_conditionalize_goto"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let Some(func) = random_function(program, ctx) else {
            return Ok(false);
        };
        let candidates: Vec<usize> = func
            .body
            .iter()
            .enumerate()
            .filter_map(|(i, stmt)| match stmt {
                Stmt::If {
                    cond: Expr::Constant { ty, value },
                    then_branch,
                    else_branch: None,
                } if ty == "int" && value == "1" && matches!(**then_branch, Stmt::Block(_)) => {
                    Some(i)
                }
                _ => None,
            })
            .collect();
        if candidates.is_empty() {
            return Ok(false);
        }
        let idx = candidates[ctx.rng.random_range(0..candidates.len())];

        let Stmt::If { then_branch, .. } = func.body.remove(idx) else {
            return Err(crate::Error::InvariantViolation {
                operator: self.name(),
                reason: "selected statement is not an if".to_string(),
            });
        };
        func.body.splice(idx..idx, flatten(*then_branch));
        Ok(true)
    }
}
