//! Shared traversal helpers for the mutation operators: mutation-site
//! enumeration, whole-program expression walks, and identifier rewriting
//! inside raw expression text.

use rand::rngs::StdRng;
use rand::Rng;
use veil_core::{Expr, Item, Program, Stmt};

/// Where inside a statement an expression site sits. The site kind decides
/// how an opaque clause is attached (`+` in value position, `||` in a
/// condition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    /// A declaration initializer.
    DeclInit,
    /// An if/while/for condition.
    Cond,
    /// The right-hand side of an assignment.
    AssignRvalue,
}

/// Visits every mutation site under `stmts`, including sites nested in
/// branches, loops and labels. Order is deterministic (source order), so a
/// counting pass followed by an editing pass lands on the same site.
pub fn visit_sites_mut<F>(stmts: &mut [Stmt], f: &mut F)
where
    F: FnMut(SiteKind, &mut Expr),
{
    for stmt in stmts {
        visit_stmt_sites(stmt, f);
    }
}

fn visit_stmt_sites<F>(stmt: &mut Stmt, f: &mut F)
where
    F: FnMut(SiteKind, &mut Expr),
{
    match stmt {
        Stmt::Block(items) => visit_sites_mut(items, f),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            f(SiteKind::Cond, cond);
            visit_stmt_sites(then_branch, f);
            if let Some(else_branch) = else_branch {
                visit_stmt_sites(else_branch, f);
            }
        }
        Stmt::While { cond, body } => {
            f(SiteKind::Cond, cond);
            visit_stmt_sites(body, f);
        }
        Stmt::For {
            init, cond, body, ..
        } => {
            if let Some(init) = init {
                visit_stmt_sites(init, f);
            }
            if let Some(cond) = cond {
                f(SiteKind::Cond, cond);
            }
            visit_stmt_sites(body, f);
        }
        Stmt::Label {
            inner: Some(inner), ..
        } => visit_stmt_sites(inner, f),
        Stmt::Decl(decl) => {
            if let Some(init) = &mut decl.init {
                f(SiteKind::DeclInit, init);
            }
        }
        Stmt::Assign { rvalue, .. } => f(SiteKind::AssignRvalue, rvalue),
        Stmt::Goto(_) | Stmt::Label { inner: None, .. } | Stmt::Return(_) | Stmt::Other(_) => {}
    }
}

/// Visits every expression node in the program, leaves included.
pub fn visit_exprs_mut<F>(program: &mut Program, f: &mut F)
where
    F: FnMut(&mut Expr),
{
    for item in &mut program.items {
        match item {
            Item::Global(decl) => {
                if let Some(init) = &mut decl.init {
                    visit_expr(init, f);
                }
            }
            Item::Func(func) => {
                for stmt in &mut func.body {
                    visit_stmt_exprs(stmt, f);
                }
            }
        }
    }
}

fn visit_stmt_exprs<F>(stmt: &mut Stmt, f: &mut F)
where
    F: FnMut(&mut Expr),
{
    match stmt {
        Stmt::Block(items) => {
            for item in items {
                visit_stmt_exprs(item, f);
            }
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            visit_expr(cond, f);
            visit_stmt_exprs(then_branch, f);
            if let Some(else_branch) = else_branch {
                visit_stmt_exprs(else_branch, f);
            }
        }
        Stmt::While { cond, body } => {
            visit_expr(cond, f);
            visit_stmt_exprs(body, f);
        }
        Stmt::For {
            init,
            cond,
            step,
            body,
        } => {
            if let Some(init) = init {
                visit_stmt_exprs(init, f);
            }
            if let Some(cond) = cond {
                visit_expr(cond, f);
            }
            if let Some(step) = step {
                visit_expr(step, f);
            }
            visit_stmt_exprs(body, f);
        }
        Stmt::Label {
            inner: Some(inner), ..
        } => visit_stmt_exprs(inner, f),
        Stmt::Return(Some(expr)) => visit_expr(expr, f),
        Stmt::Decl(decl) => {
            if let Some(init) = &mut decl.init {
                visit_expr(init, f);
            }
        }
        Stmt::Assign { lvalue, rvalue, .. } => {
            visit_expr(lvalue, f);
            visit_expr(rvalue, f);
        }
        Stmt::Goto(_) | Stmt::Label { inner: None, .. } | Stmt::Return(None) | Stmt::Other(_) => {}
    }
}

fn visit_expr<F>(expr: &mut Expr, f: &mut F)
where
    F: FnMut(&mut Expr),
{
    f(expr);
    match expr {
        Expr::Binary { left, right, .. } => {
            visit_expr(left, f);
            visit_expr(right, f);
        }
        Expr::Unary { operand, .. } => visit_expr(operand, f),
        Expr::Ident(_) | Expr::Constant { .. } | Expr::Raw(_) => {}
    }
}

/// Rewrites identifier tokens in raw expression text. Tokens are maximal
/// `[A-Za-z_][A-Za-z0-9_]*` runs; anything `lookup` declines passes through
/// unchanged.
pub fn rewrite_idents<F>(text: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &text[start..i];
            match lookup(word) {
                Some(replacement) => out.push_str(&replacement),
                None => out.push_str(word),
            }
        } else {
            out.push(c as char);
            i += 1;
        }
    }
    out
}

/// Replaces every use of `from` with `to` across the whole program,
/// including inside raw expression text.
pub fn rename_everywhere(program: &mut Program, from: &str, to: &str) {
    visit_exprs_mut(program, &mut |expr| match expr {
        Expr::Ident(name) if name == from => *name = to.to_string(),
        Expr::Raw(text) => {
            *text = rewrite_idents(text, |word| (word == from).then(|| to.to_string()));
        }
        _ => {}
    });
}

/// One-level compound flattening: a block contributes its statements, any
/// other statement contributes itself.
pub fn flatten(stmt: Stmt) -> Vec<Stmt> {
    match stmt {
        Stmt::Block(items) => items,
        other => vec![other],
    }
}

/// Index into `program.items` of a uniformly-chosen function definition.
pub fn random_function_index(program: &Program, rng: &mut StdRng) -> Option<usize> {
    let funcs: Vec<usize> = program
        .items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| matches!(item, Item::Func(_)).then_some(i))
        .collect();
    if funcs.is_empty() {
        None
    } else {
        Some(funcs[rng.random_range(0..funcs.len())])
    }
}

/// Names of all file-scope variables.
pub fn global_names(program: &Program) -> Vec<String> {
    program.globals().map(|d| d.name.clone()).collect()
}
