//! Control-flow graph construction.
//!
//! Builds a [`StableDiGraph`] over the statements of a program. Every node
//! carries an explicit [`NodeKind`] alongside its display label, so downstream
//! passes dispatch on structure rather than on label text. The builder is
//! total: any program the AST can express produces a graph, and a `goto` to a
//! label that never appears falls through to the function's end node instead
//! of failing.

use crate::ast::{FuncDef, Program, Stmt};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Structural role of a CFG node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Synthetic entry node of a function; reachability roots.
    FunctionEntry,
    /// Synthetic end node of a function; returns and fall-off wire here.
    FunctionEnd,
    /// A source label.
    Label,
    /// A `goto`; its only edge is the jump.
    Goto,
    /// A branch decision; two outgoing edges.
    If,
    /// Synthetic merge point after a branch.
    Join,
    /// Loop decision node; body back-edge and exit edge meet here.
    LoopHeader,
    /// Synthetic node control reaches when a loop condition fails.
    LoopExit,
    /// A `return`; wired to the function end only.
    Return,
    /// A straight-line statement.
    Statement,
    /// An empty statement (e.g. an empty compound).
    Empty,
}

/// A CFG node: structural kind plus the rendered source text used for display
/// and graph comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CfgNode {
    pub kind: NodeKind,
    pub label: String,
}

impl CfgNode {
    fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// A program's control-flow graph. One connected component per function,
/// anchored at its [`NodeKind::FunctionEntry`] node.
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    pub graph: StableDiGraph<CfgNode, ()>,
}

impl Cfg {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Display labels of all nodes, in arbitrary order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|n| n.label.as_str())
    }

    /// Entry nodes of every function in the graph.
    pub fn function_entries(&self) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&n| self.graph[n].kind == NodeKind::FunctionEntry)
            .collect()
    }
}

/// Builds the CFG of a whole program, one component per function.
pub fn build_program(program: &Program) -> Cfg {
    let mut builder = CfgBuilder::default();
    for func in program.functions() {
        builder.build_function(func);
    }
    debug!(
        nodes = builder.graph.node_count(),
        edges = builder.graph.edge_count(),
        "built program cfg"
    );
    Cfg {
        graph: builder.graph,
    }
}

/// Builds the CFG of a single function; returns the graph and the entry node.
pub fn build_function(func: &FuncDef) -> (Cfg, NodeIndex) {
    let mut builder = CfgBuilder::default();
    let entry = builder.build_function(func);
    (
        Cfg {
            graph: builder.graph,
        },
        entry,
    )
}

/// Incremental CFG builder. Label resolution state is per-function: the maps
/// are cleared before each function so labels never leak across function
/// boundaries.
#[derive(Default)]
struct CfgBuilder {
    graph: StableDiGraph<CfgNode, ()>,
    /// Resolved label name → label node, current function only.
    labels: HashMap<String, NodeIndex>,
    /// Goto nodes waiting for a label that has not been seen yet.
    pending: HashMap<String, Vec<NodeIndex>>,
    /// Return nodes of the current function.
    returns: Vec<NodeIndex>,
}

impl CfgBuilder {
    fn add(&mut self, kind: NodeKind, label: impl Into<String>) -> NodeIndex {
        self.graph.add_node(CfgNode::new(kind, label))
    }

    fn edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    fn build_function(&mut self, func: &FuncDef) -> NodeIndex {
        self.labels.clear();
        self.pending.clear();
        self.returns.clear();

        let entry = self.add(NodeKind::FunctionEntry, func.name.clone());
        let end = self.add(NodeKind::FunctionEnd, format!("{}.end", func.name));

        let (body_entry, body_exits) = self.process_block(&func.body);
        self.edge(entry, body_entry);
        for exit in body_exits {
            self.edge(exit, end);
        }
        for ret in std::mem::take(&mut self.returns) {
            self.edge(ret, end);
        }

        // Gotos whose label never appeared fall through to the function end.
        for (target, gotos) in std::mem::take(&mut self.pending) {
            warn!(function = %func.name, label = %target, "goto to missing label, wiring to end");
            for goto in gotos {
                self.edge(goto, end);
            }
        }

        debug!(function = %func.name, "built function cfg");
        entry
    }

    /// Processes a statement sequence; returns its entry node and the set of
    /// nodes control can fall out of.
    fn process_block(&mut self, stmts: &[Stmt]) -> (NodeIndex, Vec<NodeIndex>) {
        let Some((first, rest)) = stmts.split_first() else {
            let node = self.add(NodeKind::Empty, ";");
            return (node, vec![node]);
        };
        let (entry, mut exits) = self.process_stmt(first);
        for stmt in rest {
            let (stmt_entry, stmt_exits) = self.process_stmt(stmt);
            for exit in exits {
                self.edge(exit, stmt_entry);
            }
            exits = stmt_exits;
        }
        (entry, exits)
    }

    /// Processes one statement; returns its entry node and fall-through exits.
    /// Statements that transfer control unconditionally (`goto`, `return`)
    /// have no exits.
    fn process_stmt(&mut self, stmt: &Stmt) -> (NodeIndex, Vec<NodeIndex>) {
        match stmt {
            Stmt::Block(stmts) => self.process_block(stmts),

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let decision = self.add(NodeKind::If, format!("if ({cond})"));
                let join = self.add(NodeKind::Join, "join");

                let (then_entry, then_exits) = self.process_stmt(then_branch);
                self.edge(decision, then_entry);
                for exit in then_exits {
                    self.edge(exit, join);
                }

                match else_branch {
                    Some(else_branch) => {
                        let (else_entry, else_exits) = self.process_stmt(else_branch);
                        self.edge(decision, else_entry);
                        for exit in else_exits {
                            self.edge(exit, join);
                        }
                    }
                    None => self.edge(decision, join),
                }
                (decision, vec![join])
            }

            Stmt::While { cond, body } => {
                let header = self.add(NodeKind::LoopHeader, format!("while ({cond})"));
                let exit = self.add(NodeKind::LoopExit, "endwhile");
                let (body_entry, body_exits) = self.process_stmt(body);
                self.edge(header, body_entry);
                for body_exit in body_exits {
                    self.edge(body_exit, header);
                }
                self.edge(header, exit);
                (header, vec![exit])
            }

            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                // The header label carries the whole for-triple so renderings
                // read like the source; the graph still models the init and
                // step as their own statement nodes.
                let mut label = String::from("for (");
                if let Some(init) = init {
                    label.push_str(single_line(init).trim_end_matches(';'));
                }
                label.push(';');
                if let Some(cond) = cond {
                    label.push(' ');
                    label.push_str(&cond.to_string());
                }
                label.push(';');
                if let Some(step) = step {
                    label.push(' ');
                    label.push_str(&step.to_string());
                }
                label.push(')');
                let header = self.add(NodeKind::LoopHeader, label);
                let exit = self.add(NodeKind::LoopExit, "endfor");

                let entry = match init {
                    Some(init) => {
                        let (init_entry, init_exits) = self.process_stmt(init);
                        for init_exit in init_exits {
                            self.edge(init_exit, header);
                        }
                        init_entry
                    }
                    None => header,
                };

                let (body_entry, body_exits) = self.process_stmt(body);
                self.edge(header, body_entry);

                let back_target = match step {
                    Some(step) => {
                        let step_node = self.add(NodeKind::Statement, step.to_string());
                        self.edge(step_node, header);
                        step_node
                    }
                    None => header,
                };
                for body_exit in body_exits {
                    self.edge(body_exit, back_target);
                }
                self.edge(header, exit);
                (entry, vec![exit])
            }

            Stmt::Goto(target) => {
                let node = self.add(NodeKind::Goto, format!("goto {target}"));
                match self.labels.get(target) {
                    Some(&label_node) => self.edge(node, label_node),
                    None => self.pending.entry(target.clone()).or_default().push(node),
                }
                (node, vec![])
            }

            Stmt::Label { name, inner } => {
                let node = self.add(NodeKind::Label, format!("{name}:"));
                self.labels.insert(name.clone(), node);
                if let Some(gotos) = self.pending.remove(name) {
                    for goto in gotos {
                        self.edge(goto, node);
                    }
                }
                match inner {
                    Some(inner) => {
                        let (inner_entry, inner_exits) = self.process_stmt(inner);
                        self.edge(node, inner_entry);
                        (node, inner_exits)
                    }
                    None => (node, vec![node]),
                }
            }

            Stmt::Return(_) => {
                let node = self.add(NodeKind::Return, single_line(stmt));
                self.returns.push(node);
                (node, vec![])
            }

            Stmt::Decl(_) | Stmt::Assign { .. } => {
                let node = self.add(NodeKind::Statement, single_line(stmt));
                (node, vec![node])
            }

            Stmt::Other(text) if text.trim().is_empty() => {
                let node = self.add(NodeKind::Empty, ";");
                (node, vec![node])
            }

            Stmt::Other(_) => {
                let node = self.add(NodeKind::Statement, single_line(stmt));
                (node, vec![node])
            }
        }
    }
}

/// Rendered statement text squashed to one line for use as a node label.
fn single_line(stmt: &Stmt) -> String {
    stmt.to_string().split_whitespace().collect::<Vec<_>>().join(" ")
}
