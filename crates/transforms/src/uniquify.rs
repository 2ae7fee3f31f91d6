//! Variable-uniquification pre-pass.
//!
//! Renames every variable in the program to a fresh `var_N`, resolving uses
//! through a scope stack so shadowed names in nested blocks stay distinct.
//! Operators that move declarations across scopes (globalizing a local,
//! splicing goto blocks) rely on names being program-unique afterwards.
//! Function names and labels are left alone.

use crate::sites::rewrite_idents;
use std::collections::HashMap;
use tracing::debug;
use veil_core::{Expr, Item, Program, Stmt};

/// Renames all variables to `var_1`, `var_2`, ... in declaration order.
pub fn uniquify_variables(program: &mut Program) {
    let mut renamer = Renamer::default();
    renamer.scopes.push(HashMap::new());

    // File-scope declarations first, in source order.
    for item in &mut program.items {
        if let Item::Global(decl) = item {
            decl.name = renamer.declare(&decl.name);
            if let Some(init) = &mut decl.init {
                renamer.rewrite_expr(init);
            }
        }
    }

    for item in &mut program.items {
        if let Item::Func(func) = item {
            renamer.scopes.push(HashMap::new());
            for param in &mut func.params {
                param.name = renamer.declare(&param.name);
            }
            renamer.process_stmts(&mut func.body);
            renamer.scopes.pop();
        }
    }
    debug!(renamed = renamer.counter - 1, "uniquified variables");
}

#[derive(Default)]
struct Renamer {
    counter: usize,
    scopes: Vec<HashMap<String, String>>,
}

impl Renamer {
    fn declare(&mut self, name: &str) -> String {
        self.counter += 1;
        let fresh = format!("var_{}", self.counter);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), fresh.clone());
        }
        fresh
    }

    fn resolve(&self, name: &str) -> Option<String> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).cloned())
    }

    fn rewrite_expr(&self, expr: &mut Expr) {
        match expr {
            Expr::Ident(name) => {
                if let Some(fresh) = self.resolve(name) {
                    *name = fresh;
                }
            }
            Expr::Raw(text) => {
                *text = rewrite_idents(text, |word| self.resolve(word));
            }
            Expr::Binary { left, right, .. } => {
                self.rewrite_expr(left);
                self.rewrite_expr(right);
            }
            Expr::Unary { operand, .. } => self.rewrite_expr(operand),
            Expr::Constant { .. } => {}
        }
    }

    fn process_stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.process_stmt(stmt);
        }
    }

    fn process_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Block(items) => {
                self.scopes.push(HashMap::new());
                self.process_stmts(items);
                self.scopes.pop();
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.rewrite_expr(cond);
                self.process_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.process_stmt(else_branch);
                }
            }
            Stmt::While { cond, body } => {
                self.rewrite_expr(cond);
                self.process_stmt(body);
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                // A for-init declaration scopes to the loop.
                self.scopes.push(HashMap::new());
                if let Some(init) = init {
                    self.process_stmt(init);
                }
                if let Some(cond) = cond {
                    self.rewrite_expr(cond);
                }
                if let Some(step) = step {
                    self.rewrite_expr(step);
                }
                self.process_stmt(body);
                self.scopes.pop();
            }
            Stmt::Label {
                inner: Some(inner), ..
            } => self.process_stmt(inner),
            Stmt::Return(Some(expr)) => self.rewrite_expr(expr),
            Stmt::Decl(decl) => {
                decl.name = self.declare(&decl.name);
                if let Some(init) = &mut decl.init {
                    self.rewrite_expr(init);
                }
            }
            Stmt::Assign { lvalue, rvalue, .. } => {
                self.rewrite_expr(lvalue);
                self.rewrite_expr(rvalue);
            }
            Stmt::Other(text) => {
                *text = rewrite_idents(text, |word| self.resolve(word));
            }
            Stmt::Goto(_) | Stmt::Label { inner: None, .. } | Stmt::Return(None) => {}
        }
    }
}
