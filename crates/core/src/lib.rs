//! Core of the veil source obfuscator: the C-like AST model, CFG
//! construction and simplification, deterministic seeding, the
//! fresh-identifier pool, and the compile-and-test oracle.

pub mod ast;
pub mod cfg;
pub mod names;
pub mod oracle;
pub mod result;
pub mod seed;
pub mod simplify;

pub use ast::{normalize_source, Decl, Expr, FuncDef, Item, Program, Stmt, TypeSpec};
pub use cfg::{build_function, build_program, Cfg, CfgNode, NodeKind};
pub use names::NamePool;
pub use oracle::{FixedOracle, GccOracle, Oracle};
pub use result::{Error, Result};
pub use seed::Seed;
pub use simplify::simplify;
