//! C-like AST model and source rendering.
//!
//! Programs enter the obfuscator as ASTs produced by an external frontend; this
//! module owns the statement/expression shapes the mutation operators rewrite
//! and the `Display` impls that render them back to compilable C text. The
//! rendered text of a statement doubles as its CFG node label, so rendering is
//! deterministic by construction.

use std::fmt;

/// A translation unit: file-scope declarations and function definitions in
/// source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Global(Decl),
    Func(FuncDef),
}

/// A function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub ret: TypeSpec,
    pub params: Vec<Decl>,
    pub body: Vec<Stmt>,
}

/// A variable declaration (file scope, block scope, or parameter).
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub ty: TypeSpec,
    pub init: Option<Expr>,
}

/// Type of a declaration. Qualifiers and base-type keywords are kept as plain
/// tokens so operators can shuffle them without a type checker.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// Token list such as `["unsigned", "int"]` or `["volatile", "char"]`.
    Named { tokens: Vec<String> },
    Pointer(Box<TypeSpec>),
    Array {
        elem: Box<TypeSpec>,
        /// Size expression text; `None` renders `[]`.
        size: Option<String>,
    },
}

impl TypeSpec {
    pub fn named(tokens: &[&str]) -> Self {
        TypeSpec::Named {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn int() -> Self {
        TypeSpec::named(&["int"])
    }

    /// Renders the C declarator for `name`, composing inside-out so pointer
    /// and array types attach to the name correctly.
    pub fn render_with_name(&self, name: &str) -> String {
        match self {
            TypeSpec::Named { tokens } => {
                if name.is_empty() {
                    tokens.join(" ")
                } else {
                    format!("{} {}", tokens.join(" "), name)
                }
            }
            TypeSpec::Pointer(inner) => inner.render_with_name(&format!("*{name}")),
            TypeSpec::Array { elem, size } => {
                let sz = size.as_deref().unwrap_or("");
                elem.render_with_name(&format!("{name}[{sz}]"))
            }
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A braced compound statement.
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Goto(String),
    /// A label, optionally attached to the statement it prefixes.
    Label {
        name: String,
        inner: Option<Box<Stmt>>,
    },
    Return(Option<Expr>),
    Decl(Decl),
    Assign {
        lvalue: Expr,
        op: String,
        rvalue: Expr,
    },
    /// Any statement the model does not decompose (calls, expression
    /// statements). Stored without the trailing semicolon.
    Other(String),
}

impl Stmt {
    /// Assignment with the plain `=` operator.
    pub fn assign(lvalue: Expr, rvalue: Expr) -> Self {
        Stmt::Assign {
            lvalue,
            op: "=".into(),
            rvalue,
        }
    }

    /// Counts this statement and everything nested under it.
    pub fn node_count(&self) -> usize {
        let children = match self {
            Stmt::Block(stmts) => stmts.iter().map(Stmt::node_count).sum(),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                cond.node_count()
                    + then_branch.node_count()
                    + else_branch.as_ref().map_or(0, |e| e.node_count())
            }
            Stmt::While { cond, body } => cond.node_count() + body.node_count(),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                init.as_ref().map_or(0, |i| i.node_count())
                    + cond.as_ref().map_or(0, Expr::node_count)
                    + step.as_ref().map_or(0, Expr::node_count)
                    + body.node_count()
            }
            Stmt::Label { inner, .. } => inner.as_ref().map_or(0, |i| i.node_count()),
            Stmt::Return(expr) => expr.as_ref().map_or(0, Expr::node_count),
            Stmt::Decl(decl) => decl.init.as_ref().map_or(0, Expr::node_count),
            Stmt::Assign { lvalue, rvalue, .. } => lvalue.node_count() + rvalue.node_count(),
            Stmt::Goto(_) | Stmt::Other(_) => 0,
        };
        1 + children
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    /// A literal with its C type keyword, e.g. `("int", "42")`.
    Constant { ty: String, value: String },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    /// Expression text the model does not decompose (calls, indexing,
    /// dereferences).
    Raw(String),
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident(name.to_string())
    }

    pub fn int(value: i64) -> Self {
        Expr::Constant {
            ty: "int".into(),
            value: value.to_string(),
        }
    }

    pub fn binary(op: &str, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn node_count(&self) -> usize {
        let children = match self {
            Expr::Binary { left, right, .. } => left.node_count() + right.node_count(),
            Expr::Unary { operand, .. } => operand.node_count(),
            Expr::Ident(_) | Expr::Constant { .. } | Expr::Raw(_) => 0,
        };
        1 + children
    }
}

impl Program {
    /// Total AST node count, every statement and expression included.
    pub fn node_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Item::Global(decl) => 1 + decl.init.as_ref().map_or(0, Expr::node_count),
                Item::Func(func) => {
                    1 + func.params.len() + func.body.iter().map(Stmt::node_count).sum::<usize>()
                }
            })
            .sum()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FuncDef> {
        self.items.iter().filter_map(|item| match item {
            Item::Func(f) => Some(f),
            Item::Global(_) => None,
        })
    }

    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut FuncDef> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Func(f) => Some(f),
            Item::Global(_) => None,
        })
    }

    pub fn globals(&self) -> impl Iterator<Item = &Decl> {
        self.items.iter().filter_map(|item| match item {
            Item::Global(d) => Some(d),
            Item::Func(_) => None,
        })
    }
}

/// Removes every whitespace character so two renderings can be compared
/// modulo formatting.
pub fn normalize_source(source: &str) -> String {
    source.chars().filter(|c| !c.is_whitespace()).collect()
}

// --- rendering ---------------------------------------------------------

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::Constant { value, .. } => write!(f, "{value}"),
            Expr::Binary { op, left, right } => {
                write_operand(f, left)?;
                write!(f, " {op} ")?;
                write_operand(f, right)
            }
            Expr::Unary { op, operand } => {
                write!(f, "{op}")?;
                write_operand(f, operand)
            }
            Expr::Raw(text) => write!(f, "{text}"),
        }
    }
}

/// Nested binary operands get parentheses so rendering never changes
/// precedence.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::Binary { .. } => write!(f, "({expr})"),
        _ => write!(f, "{expr}"),
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty.render_with_name(&self.name))?;
        if let Some(init) = &self.init {
            write!(f, " = {init}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn indent(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    for _ in 0..level {
        write!(f, "  ")?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, level: usize) -> fmt::Result {
    match stmt {
        Stmt::Block(stmts) => {
            indent(f, level)?;
            writeln!(f, "{{")?;
            for s in stmts {
                write_stmt(f, s, level + 1)?;
            }
            indent(f, level)?;
            writeln!(f, "}}")
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            indent(f, level)?;
            writeln!(f, "if ({cond})")?;
            write_branch(f, then_branch, level)?;
            if let Some(else_branch) = else_branch {
                indent(f, level)?;
                writeln!(f, "else")?;
                write_branch(f, else_branch, level)?;
            }
            Ok(())
        }
        Stmt::While { cond, body } => {
            indent(f, level)?;
            writeln!(f, "while ({cond})")?;
            write_branch(f, body, level)
        }
        Stmt::For {
            init,
            cond,
            step,
            body,
        } => {
            indent(f, level)?;
            write!(f, "for (")?;
            if let Some(init) = init {
                write!(f, "{}", inline_stmt(init))?;
            }
            write!(f, ";")?;
            if let Some(cond) = cond {
                write!(f, " {cond}")?;
            }
            write!(f, ";")?;
            if let Some(step) = step {
                write!(f, " {step}")?;
            }
            writeln!(f, ")")?;
            write_branch(f, body, level)
        }
        Stmt::Goto(target) => {
            indent(f, level)?;
            writeln!(f, "goto {target};")
        }
        Stmt::Label { name, inner } => {
            indent(f, level)?;
            match inner {
                Some(inner) => {
                    writeln!(f, "{name}:")?;
                    write_stmt(f, inner, level)
                }
                None => writeln!(f, "{name}: ;"),
            }
        }
        Stmt::Return(expr) => {
            indent(f, level)?;
            match expr {
                Some(expr) => writeln!(f, "return {expr};"),
                None => writeln!(f, "return;"),
            }
        }
        Stmt::Decl(decl) => {
            indent(f, level)?;
            writeln!(f, "{decl};")
        }
        Stmt::Assign { lvalue, op, rvalue } => {
            indent(f, level)?;
            writeln!(f, "{lvalue} {op} {rvalue};")
        }
        Stmt::Other(text) => {
            indent(f, level)?;
            writeln!(f, "{text};")
        }
    }
}

/// If/while/for bodies: blocks print as-is, single statements get one extra
/// indent level.
fn write_branch(f: &mut fmt::Formatter<'_>, stmt: &Stmt, level: usize) -> fmt::Result {
    match stmt {
        Stmt::Block(_) => write_stmt(f, stmt, level),
        _ => write_stmt(f, stmt, level + 1),
    }
}

/// Renders a for-initializer without indentation or trailing semicolon.
fn inline_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Decl(decl) => decl.to_string(),
        Stmt::Assign { lvalue, op, rvalue } => format!("{lvalue} {op} {rvalue}"),
        Stmt::Other(text) => text.clone(),
        other => {
            // Fall back to the block renderer with newlines squashed.
            other.to_string().split_whitespace().collect::<Vec<_>>().join(" ")
        }
    }
}

impl fmt::Display for FuncDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = if self.params.is_empty() {
            "void".to_string()
        } else {
            self.params
                .iter()
                .map(|p| p.ty.render_with_name(&p.name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "{}({params})", self.ret.render_with_name(&self.name))?;
        writeln!(f, "{{")?;
        for stmt in &self.body {
            write_stmt(f, stmt, 1)?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            match item {
                Item::Global(decl) => writeln!(f, "{decl};")?,
                Item::Func(func) => write!(f, "{func}")?,
            }
        }
        Ok(())
    }
}
