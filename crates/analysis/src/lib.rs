//! Analysis for the veil obfuscator: graph edit distance, CFG metrics and the
//! search fitness score.

pub mod distance;
pub mod metrics;
pub mod score;

pub use distance::edit_distance;
pub use metrics::{collect_metrics, ComplexityScorer, CyclomaticScorer, Metrics, MetricsDelta};
pub use score::{over_budget, score, NODE_CUTOFF, NODE_SLACK};

use thiserror::Error;

/// Analysis error type.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Metrics were requested over a graph with no nodes.
    #[error("cannot compute metrics over an empty cfg")]
    EmptyCfg,
}

/// Analysis result type
pub type Result<T> = std::result::Result<T, AnalysisError>;
