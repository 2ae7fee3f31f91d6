//! CFG metrics.
//!
//! Collects structural counts over a (usually simplified) CFG and exposes the
//! cyclomatic number as the built-in implementation of the pluggable
//! complexity-scorer seam used by the search driver.

use crate::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use veil_core::Cfg;

/// Structural metrics of a CFG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub nodes: usize,
    pub edges: usize,
    /// Number of function components (entry nodes).
    pub functions: usize,
    /// Cyclomatic complexity `E - N + 2P` over the whole graph.
    pub cyclomatic: i64,
}

/// Difference between two metric snapshots (after minus before).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsDelta {
    pub nodes: i64,
    pub edges: i64,
    pub cyclomatic: i64,
}

impl Metrics {
    pub fn compare(&self, other: &Metrics) -> MetricsDelta {
        MetricsDelta {
            nodes: other.nodes as i64 - self.nodes as i64,
            edges: other.edges as i64 - self.edges as i64,
            cyclomatic: other.cyclomatic - self.cyclomatic,
        }
    }
}

/// Collects metrics over a CFG.
pub fn collect_metrics(cfg: &Cfg) -> Result<Metrics> {
    if cfg.node_count() == 0 {
        return Err(AnalysisError::EmptyCfg);
    }
    let nodes = cfg.node_count();
    let edges = cfg.edge_count();
    let functions = cfg.function_entries().len();
    let cyclomatic = edges as i64 - nodes as i64 + 2 * functions as i64;
    Ok(Metrics {
        nodes,
        edges,
        functions,
        cyclomatic,
    })
}

/// Pluggable complexity measure over a simplified CFG. Implementations score
/// higher for graphs that are harder to follow.
pub trait ComplexityScorer: Send + Sync {
    fn complexity(&self, cfg: &Cfg) -> f64;
}

/// Built-in scorer: the cyclomatic number.
#[derive(Debug, Clone, Copy, Default)]
pub struct CyclomaticScorer;

impl ComplexityScorer for CyclomaticScorer {
    fn complexity(&self, cfg: &Cfg) -> f64 {
        match collect_metrics(cfg) {
            Ok(metrics) => metrics.cyclomatic as f64,
            Err(_) => 0.0,
        }
    }
}
