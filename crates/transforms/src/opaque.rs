//! Opaque-clause insertion and removal.
//!
//! The inserted clause is a product of consecutive terms reduced modulo the
//! term count: `(v*v * (v+1) * ... * (v+n-1)) % n`. The product contains `n`
//! consecutive integers, so the remainder is always zero whatever `v` holds;
//! attaching it with `+` in value position or `||` in a condition never
//! changes program behavior. The detector recognizes exactly this family
//! (plus the literal-zero degenerate case) and nothing broader, so removal
//! can only strip clauses insertion produced.

use crate::sites::{global_names, visit_sites_mut, SiteKind};
use crate::{Mutation, MutationCtx, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;
use veil_core::{Expr, Item, Program, Stmt};

/// Builds an always-zero clause over a random name from `names`. With no
/// names in scope the clause degenerates to a literal `0`.
pub fn build_opaque_expr(names: &[String], n: usize, rng: &mut rand::rngs::StdRng) -> Expr {
    if names.is_empty() {
        return Expr::int(0);
    }
    let var = names[rng.random_range(0..names.len())].clone();
    let first = Expr::Ident(var.clone());

    let mut product = Expr::binary("*", first.clone(), first.clone());
    for i in 1..n {
        product = Expr::binary(
            "*",
            product,
            Expr::binary("+", first.clone(), Expr::int(i as i64)),
        );
    }
    Expr::binary("%", product, Expr::int(n as i64))
}

/// Walks a product chain; returns its variable and the number of consecutive
/// factors when the chain has the inserter's exact shape.
fn chain_depth(expr: &Expr) -> Option<(&str, usize)> {
    let Expr::Binary { op, left, right } = expr else {
        return None;
    };
    if op != "*" {
        return None;
    }
    match (&**left, &**right) {
        (Expr::Ident(a), Expr::Ident(b)) if a == b => Some((a, 1)),
        (
            _,
            Expr::Binary {
                op: add,
                left: var,
                right: offset,
            },
        ) if add == "+" => {
            let Expr::Ident(var) = &**var else {
                return None;
            };
            let Expr::Constant { value, .. } = &**offset else {
                return None;
            };
            let i: usize = value.parse().ok()?;
            let (base_var, depth) = chain_depth(left)?;
            (base_var == var && i == depth).then_some((base_var, depth + 1))
        }
        _ => None,
    }
}

/// True when `expr` is a clause [`build_opaque_expr`] could have produced.
pub fn is_opaque(expr: &Expr) -> bool {
    match expr {
        Expr::Constant { value, .. } => value == "0",
        Expr::Binary { op, left, right } if op == "%" => {
            let Expr::Constant { value, .. } = &**right else {
                return false;
            };
            let Ok(modulus) = value.parse::<usize>() else {
                return false;
            };
            matches!(chain_depth(left), Some((_, depth)) if depth == modulus)
        }
        _ => false,
    }
}

/// Attaches an opaque clause to a random mutation site: `+ clause` on
/// initializers and assignment right-hand sides, `|| clause` on conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueInsert;

impl Mutation for OpaqueInsert {
    fn name(&self) -> &'static str {
        "opaque_insert"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let mut func_indices: Vec<usize> = program
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| matches!(item, Item::Func(_)).then_some(i))
            .collect();
        func_indices.shuffle(&mut *ctx.rng);

        for func_idx in func_indices {
            let Item::Func(func) = &mut program.items[func_idx] else {
                continue;
            };
            let mut site_count = 0usize;
            visit_sites_mut(&mut func.body, &mut |_, _| site_count += 1);
            if site_count == 0 {
                continue;
            }
            let chosen = ctx.rng.random_range(0..site_count);

            // Variables visible at file scope plus the function's own
            // top-level locals.
            let mut names: Vec<String> = func
                .body
                .iter()
                .filter_map(|stmt| match stmt {
                    Stmt::Decl(decl) => Some(decl.name.clone()),
                    _ => None,
                })
                .collect();
            let func_name = func.name.clone();
            names.extend(global_names(program));

            let n = ctx.rng.random_range(2..=5);
            let clause = build_opaque_expr(&names, n, ctx.rng);

            let Item::Func(func) = &mut program.items[func_idx] else {
                continue;
            };
            let mut index = 0usize;
            visit_sites_mut(&mut func.body, &mut |kind, expr| {
                if index == chosen {
                    let glue = match kind {
                        SiteKind::Cond => "||",
                        SiteKind::DeclInit | SiteKind::AssignRvalue => "+",
                    };
                    let old = std::mem::replace(expr, Expr::int(0));
                    *expr = Expr::binary(glue, old, clause.clone());
                }
                index += 1;
            });
            debug!(function = %func_name, terms = n, "inserted opaque clause");
            return Ok(true);
        }
        Ok(false)
    }
}

/// Strips every opaque clause from one random function.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueRemove;

impl Mutation for OpaqueRemove {
    fn name(&self) -> &'static str {
        "opaque_remove"
    }

    fn apply(&self, program: &mut Program, ctx: &mut MutationCtx<'_>) -> Result<bool> {
        let Some(func_idx) = crate::sites::random_function_index(program, ctx.rng) else {
            return Ok(false);
        };
        let Item::Func(func) = &mut program.items[func_idx] else {
            return Ok(false);
        };

        let mut stripped = 0usize;
        visit_sites_mut(&mut func.body, &mut |_, expr| {
            let strip = match expr {
                Expr::Binary { op, right, .. } if op == "+" || op == "||" => is_opaque(right),
                _ => false,
            };
            if strip {
                if let Expr::Binary { left, .. } = expr {
                    let inner = std::mem::replace(&mut **left, Expr::int(0));
                    *expr = inner;
                    stripped += 1;
                }
            }
        });
        if stripped > 0 {
            debug!(function = %func.name, stripped, "removed opaque clauses");
        }
        Ok(stripped > 0)
    }
}
