//! CFG simplification.
//!
//! Reduces a built CFG to a canonical shape so that graphs of
//! semantically-equal programs compare equal even when one was rewritten into
//! goto form. Two phases run in an outer loop until the graph stops changing:
//!
//! * Phase A rewires away routing nodes: single-parent/single-child
//!   goto/label/empty/join/loop-exit nodes are contracted, unreachable gotos
//!   are dropped, and fall-into labels, joins, loop exits and jump sources
//!   with exactly one successor are spliced out.
//! * Phase B garbage-collects everything not reachable from a function entry.
//!
//! Each effective pass strictly removes nodes, so the outer loop terminates.
//! Phase A is additionally capped per round; ten passes exhaust any chain the
//! mutation operators can produce.

use crate::cfg::{Cfg, NodeKind};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

type Graph = StableDiGraph<crate::cfg::CfgNode, ()>;

const PHASE_A_CAP: usize = 10;

/// Simplifies a CFG to its canonical comparison form.
pub fn simplify(mut cfg: Cfg) -> Cfg {
    let before = (cfg.node_count(), cfg.edge_count());
    loop {
        let mut rewired = false;
        for _ in 0..PHASE_A_CAP {
            let changed = contract_chains(&mut cfg.graph)
                | drop_dead_gotos(&mut cfg.graph)
                | splice_pass_through(&mut cfg.graph);
            if !changed {
                break;
            }
            rewired = true;
        }
        let collected = collect_unreachable(&mut cfg.graph);
        if !rewired && !collected {
            break;
        }
    }
    debug!(
        nodes_before = before.0,
        edges_before = before.1,
        nodes_after = cfg.node_count(),
        edges_after = cfg.edge_count(),
        "simplified cfg"
    );
    cfg
}

fn is_routing(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Goto | NodeKind::Label | NodeKind::Empty | NodeKind::Join | NodeKind::LoopExit
    )
}

fn parents(graph: &Graph, node: NodeIndex) -> Vec<NodeIndex> {
    graph.neighbors_directed(node, Incoming).collect()
}

fn children(graph: &Graph, node: NodeIndex) -> Vec<NodeIndex> {
    graph.neighbors_directed(node, Outgoing).collect()
}

fn reconnect(graph: &mut Graph, from: NodeIndex, to: NodeIndex) {
    if graph.find_edge(from, to).is_none() {
        graph.add_edge(from, to, ());
    }
}

/// Contracts routing nodes with exactly one parent and one child: the node is
/// removed and the parent wired straight to the child.
fn contract_chains(graph: &mut Graph) -> bool {
    let mut changed = false;
    for node in graph.node_indices().collect::<Vec<_>>() {
        if !graph.contains_node(node) || !is_routing(graph[node].kind) {
            continue;
        }
        let ps = parents(graph, node);
        let cs = children(graph, node);
        if ps.len() == 1 && cs.len() == 1 && ps[0] != node && cs[0] != node {
            let (parent, child) = (ps[0], cs[0]);
            graph.remove_node(node);
            reconnect(graph, parent, child);
            changed = true;
        }
    }
    changed
}

/// Removes goto nodes nothing flows into.
fn drop_dead_gotos(graph: &mut Graph) -> bool {
    let mut changed = false;
    for node in graph.node_indices().collect::<Vec<_>>() {
        if graph.contains_node(node)
            && graph[node].kind == NodeKind::Goto
            && parents(graph, node).is_empty()
        {
            graph.remove_node(node);
            changed = true;
        }
    }
    changed
}

/// Splices out pass-through nodes with exactly one successor, rewiring every
/// parent to that successor:
///
/// * goto nodes, unconditionally (the jump is the only thing they do);
/// * label, join and loop-exit nodes whose parents are all fall-ins (no goto
///   parents; a label still targeted by a jump stays structurally
///   meaningful).
fn splice_pass_through(graph: &mut Graph) -> bool {
    let mut changed = false;
    for node in graph.node_indices().collect::<Vec<_>>() {
        if !graph.contains_node(node) {
            continue;
        }
        let spliceable = match graph[node].kind {
            NodeKind::Goto => true,
            NodeKind::Label | NodeKind::Join | NodeKind::Empty | NodeKind::LoopExit => {
                parents(graph, node)
                    .iter()
                    .all(|&p| graph[p].kind != NodeKind::Goto)
            }
            _ => false,
        };
        if !spliceable {
            continue;
        }
        let ps = parents(graph, node);
        let cs = children(graph, node);
        if ps.is_empty() || cs.len() != 1 || cs[0] == node || ps.contains(&node) {
            continue;
        }
        let child = cs[0];
        graph.remove_node(node);
        for parent in ps {
            reconnect(graph, parent, child);
        }
        changed = true;
    }
    changed
}

/// Removes every node not reachable from a function entry.
fn collect_unreachable(graph: &mut Graph) -> bool {
    let roots: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&n| graph[n].kind == NodeKind::FunctionEntry)
        .collect();

    let mut reachable: HashSet<NodeIndex> = roots.iter().copied().collect();
    let mut queue: VecDeque<NodeIndex> = roots.into();
    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors_directed(node, Outgoing) {
            if reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let doomed: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|n| !reachable.contains(n))
        .collect();
    let changed = !doomed.is_empty();
    for node in doomed {
        graph.remove_node(node);
    }
    changed
}
