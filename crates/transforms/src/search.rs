//! Mutation search driver.
//!
//! Runs the pre-passes, snapshots the reference CFG, then walks the operator
//! catalog: clone the current program, apply one random operator, score the
//! candidate against the reference, and let the acceptance policy decide.
//! Accepted candidates are validated against the oracle, immediately or in
//! adaptive batches; a failed validation rolls the walk back to the last
//! validated checkpoint. The run ends with a final oracle gate and returns
//! the best validated program seen, falling back to the pre-passed original
//! when nothing ever validated.

use crate::catalog;
use crate::unroll::unroll_loops;
use crate::uniquify::uniquify_variables;
use crate::{MutationCtx, Result};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use veil_analysis::{edit_distance, over_budget, score, ComplexityScorer};
use veil_core::{build_program, simplify, Cfg, NamePool, Oracle, Program};

/// Candidate acceptance policy. Scores are minimized; improvements are
/// always kept, the policies differ only in how they treat worsening moves.
pub enum Strategy {
    /// Accept only non-worsening candidates.
    Greedy,
    /// Accept worsening candidates with probability `candidate / current`,
    /// clamped to `[0, 1]`; they are rejected outright when the current
    /// score is not positive. The ratio rule is deliberately kept in this
    /// form even though it rewards score-preserving moves over mildly
    /// worsening ones.
    Metropolis,
    /// Simulated annealing with geometric cooling: worsening candidates are
    /// accepted with probability `exp((current - candidate) / T)`.
    Annealing {
        initial_temperature: f64,
        cooling: f64,
    },
}

impl Strategy {
    /// Decides whether `candidate` replaces `current`. A strict improvement
    /// is accepted unconditionally under every policy.
    pub fn accepts(
        &self,
        current: f64,
        candidate: f64,
        temperature: f64,
        rng: &mut StdRng,
    ) -> bool {
        if candidate < current {
            return true;
        }
        match self {
            Strategy::Greedy => candidate <= current,
            Strategy::Metropolis => {
                if current <= 0.0 {
                    return false;
                }
                let p = (candidate / current).clamp(0.0, 1.0);
                rng.random::<f64>() < p
            }
            Strategy::Annealing { .. } => {
                if candidate <= current {
                    return true;
                }
                if temperature <= 0.0 {
                    return false;
                }
                rng.random::<f64>() < ((current - candidate) / temperature).exp()
            }
        }
    }
}

/// What the score's gain term measures.
pub enum Fitness {
    /// Edit distance between the simplified reference and candidate CFGs.
    EditDistance,
    /// A pluggable complexity measure over the candidate's simplified CFG.
    Complexity(Box<dyn ComplexityScorer>),
}

/// When accepted candidates are checked against the oracle.
pub enum ValidationCadence {
    /// Validate every accepted candidate.
    EveryCandidate,
    /// Validate in batches that grow while failures stay rare: after a batch
    /// of `m` mutations the next batch size is `i / fail_n`, where `fail_n`
    /// absorbs the size of every failed batch.
    Adaptive,
}

/// Search configuration.
pub struct SearchConfig {
    pub iterations: usize,
    pub strategy: Strategy,
    pub fitness: Fitness,
    pub cadence: ValidationCadence,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: 250,
            strategy: Strategy::Metropolis,
            fitness: Fitness::EditDistance,
            cadence: ValidationCadence::Adaptive,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub iterations: usize,
    /// Operator applications that changed the program.
    pub applied: usize,
    pub accepted: usize,
    pub rejected_score: usize,
    pub rejected_budget: usize,
    pub validation_failures: usize,
    /// Applications per operator, changed or not.
    pub operator_counts: BTreeMap<String, usize>,
    /// Raw (pre-simplification) CFG node count of the final program.
    pub final_nodes: usize,
    pub final_distance: usize,
    pub final_score: f64,
}

/// Result of a run: the obfuscated program and its report.
pub struct SearchOutcome {
    pub program: Program,
    pub report: SearchReport,
}

/// Runs the full search pipeline on `program`.
pub async fn run_search(
    mut program: Program,
    oracle: &dyn Oracle,
    config: &SearchConfig,
    rng: &mut StdRng,
    names: &mut NamePool,
) -> Result<SearchOutcome> {
    uniquify_variables(&mut program);
    {
        let mut ctx = MutationCtx {
            rng: &mut *rng,
            names: &mut *names,
        };
        unroll_loops(&mut program, &mut ctx)?;
    }

    let raw = build_program(&program);
    info!(
        raw_nodes = raw.node_count(),
        iterations = config.iterations,
        "starting search"
    );
    let reference = simplify(raw);
    let initial = program.clone();

    let (_, mut current_score) = evaluate(&config.fitness, &reference, &program);
    let mut checkpoint = program.clone();
    let mut checkpoint_score = current_score;
    let mut best: Option<(f64, Program)> = None;

    let mut temperature = match config.strategy {
        Strategy::Annealing {
            initial_temperature,
            ..
        } => initial_temperature,
        _ => 0.0,
    };
    let mut fail_n = 1.0f64;
    let mut batch_len = 0usize;
    let mut batch_cap = 1.0f64;

    let mut report = SearchReport {
        iterations: config.iterations,
        applied: 0,
        accepted: 0,
        rejected_score: 0,
        rejected_budget: 0,
        validation_failures: 0,
        operator_counts: BTreeMap::new(),
        final_nodes: 0,
        final_distance: 0,
        final_score: 0.0,
    };

    for i in 0..config.iterations {
        let mut candidate = program.clone();
        let changed = {
            let mut ctx = MutationCtx {
                rng: &mut *rng,
                names: &mut *names,
            };
            let (operator, changed) = catalog::apply_random(&mut candidate, &mut ctx)?;
            *report.operator_counts.entry(operator.to_string()).or_default() += 1;
            changed
        };
        if !changed {
            continue;
        }
        report.applied += 1;

        let (raw_nodes, candidate_score) = evaluate(&config.fitness, &reference, &candidate);
        if over_budget(raw_nodes) {
            report.rejected_budget += 1;
            continue;
        }

        let accept = config
            .strategy
            .accepts(current_score, candidate_score, temperature, rng);
        if let Strategy::Annealing { cooling, .. } = config.strategy {
            temperature *= cooling;
        }
        if !accept {
            report.rejected_score += 1;
            continue;
        }

        program = candidate;
        current_score = candidate_score;
        report.accepted += 1;
        batch_len += 1;
        debug!(iteration = i, score = current_score, "accepted candidate");

        let validate_now = match config.cadence {
            ValidationCadence::EveryCandidate => true,
            ValidationCadence::Adaptive => batch_len as f64 >= batch_cap,
        };
        if !validate_now {
            continue;
        }

        if oracle.validate(&program).await? {
            checkpoint = program.clone();
            checkpoint_score = current_score;
            track_best(&mut best, current_score, &program);
        } else {
            report.validation_failures += 1;
            fail_n += batch_len as f64;
            warn!(iteration = i, batch = batch_len, "validation failed, reverting");
            program = checkpoint.clone();
            current_score = checkpoint_score;
        }
        batch_len = 0;
        if matches!(config.cadence, ValidationCadence::Adaptive) {
            batch_cap = (i as f64 / fail_n).max(1.0);
        }
    }

    // Final gate: whatever the walk ended on must still pass.
    if oracle.validate(&program).await? {
        track_best(&mut best, current_score, &program);
    } else if batch_len > 0 {
        warn!("final candidate failed validation, discarding trailing batch");
    }

    let final_program = match best {
        Some((_, program)) => program,
        None => initial,
    };

    let final_raw = build_program(&final_program);
    report.final_nodes = final_raw.node_count();
    let final_cfg = simplify(final_raw);
    report.final_distance = edit_distance(&reference, &final_cfg);
    report.final_score = score(
        report.final_nodes,
        match &config.fitness {
            Fitness::EditDistance => report.final_distance as f64,
            Fitness::Complexity(scorer) => scorer.complexity(&final_cfg),
        },
    );
    info!(
        accepted = report.accepted,
        validation_failures = report.validation_failures,
        distance = report.final_distance,
        score = report.final_score,
        "search finished"
    );

    Ok(SearchOutcome {
        program: final_program,
        report,
    })
}

fn track_best(best: &mut Option<(f64, Program)>, score: f64, program: &Program) {
    let improves = best.as_ref().map_or(true, |(s, _)| score < *s);
    if improves {
        *best = Some((score, program.clone()));
    }
}

/// Scores a candidate program against the reference graph. Returns the raw
/// built graph's node count (the size measure the budget is taken over)
/// alongside the score.
fn evaluate(fitness: &Fitness, reference: &Cfg, candidate: &Program) -> (usize, f64) {
    let raw = build_program(candidate);
    let raw_nodes = raw.node_count();
    let cfg = simplify(raw);
    let gain = match fitness {
        Fitness::EditDistance => edit_distance(reference, &cfg) as f64,
        Fitness::Complexity(scorer) => scorer.complexity(&cfg),
    };
    (raw_nodes, score(raw_nodes, gain))
}
