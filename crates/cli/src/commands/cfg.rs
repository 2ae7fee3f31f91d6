//! Builds the sample program's CFG (optionally simplified) and emits a
//! Graphviz .dot rendering to a file or stdout.

use crate::sample::quicksort_program;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::fs;
use veil_core::{build_program, simplify, Cfg};

/// Arguments for the `cfg` subcommand.
#[derive(Args)]
pub struct CfgArgs {
    /// Run the simplifier before rendering.
    #[arg(long)]
    simplify: bool,
    /// Output file for Graphviz .dot (default: stdout)
    #[arg(short, long)]
    output: Option<String>,
}

/// Executes the `cfg` subcommand to generate a CFG visualization.
#[async_trait]
impl super::Command for CfgArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let program = quicksort_program();
        let mut cfg = build_program(&program);
        if self.simplify {
            cfg = simplify(cfg);
        }

        let dot = generate_dot(&cfg);
        if let Some(out_path) = self.output {
            fs::write(out_path, &dot)?;
        } else {
            println!("{dot}");
        }
        Ok(())
    }
}

/// Generates a Graphviz .dot representation of the CFG.
fn generate_dot(cfg: &Cfg) -> String {
    let mut dot = String::from("digraph CFG {\n");

    for node in cfg.graph.node_indices() {
        let weight = &cfg.graph[node];
        let label = weight.label.replace('"', "\\\"");
        dot.push_str(&format!(
            "    {} [label=\"{}\\n[{:?}]\"];\n",
            node.index(),
            label,
            weight.kind
        ));
    }

    for edge in cfg.graph.edge_indices() {
        if let Some((src, dst)) = cfg.graph.edge_endpoints(edge) {
            dot.push_str(&format!("    {} -> {};\n", src.index(), dst.index()));
        }
    }

    dot.push_str("}\n");
    dot
}
