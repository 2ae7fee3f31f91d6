//! Search fitness.
//!
//! The driver minimizes this score: growing the edit distance to the
//! reference graph lowers it, while program growth raises it exponentially
//! once the raw built CFG passes the size cutoff. Past the slack band the
//! score saturates at `exp(NODE_SLACK)` so runaway growth never looks better
//! than slightly-over-budget growth.

/// Raw (pre-simplification) CFG node count at which the size penalty starts
/// to bite.
pub const NODE_CUTOFF: usize = 250;

/// Nodes past the cutoff before the penalty saturates.
pub const NODE_SLACK: usize = 10;

/// Fitness of a candidate: size penalty minus the obfuscation gain (edit
/// distance from the reference, or a complexity measure). Lower is better.
pub fn score(raw_nodes: usize, gain: f64) -> f64 {
    let over = raw_nodes as f64 - NODE_CUTOFF as f64;
    if over > NODE_SLACK as f64 {
        return (NODE_SLACK as f64).exp();
    }
    over.exp() - gain
}

/// Whether a candidate is over the hard size limit and must be rejected
/// before scoring.
pub fn over_budget(raw_nodes: usize) -> bool {
    raw_nodes > NODE_CUTOFF + NODE_SLACK
}
