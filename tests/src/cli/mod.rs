//! End-to-end checks over the CLI's built-in sample program.

use crate::fixtures::rng;
use veil_cli::sample::quicksort_program;
use veil_core::{build_program, simplify, FixedOracle, NamePool, NodeKind};
use veil_transform::search::{run_search, Fitness, SearchConfig, Strategy, ValidationCadence};

#[test]
fn test_sample_builds_three_function_graphs() {
    let cfg = build_program(&quicksort_program());
    assert_eq!(cfg.function_entries().len(), 3);

    let labels: Vec<&str> = cfg.labels().collect();
    assert!(labels.contains(&"quickSort"));
    assert!(labels.contains(&"partition"));
    assert!(labels.contains(&"swap"));
}

#[test]
fn test_sample_renders_compilable_shapes() {
    let source = quicksort_program().to_string();
    assert!(source.contains("void swap(int *a, int *b)"));
    assert!(source.contains("int partition(int arr[], int low, int high)"));
    assert!(source.contains("return i + 1;"));
}

#[test]
fn test_simplifier_keeps_sample_loops() {
    let cfg = simplify(build_program(&quicksort_program()));
    let has_loop = cfg
        .graph
        .node_indices()
        .any(|n| matches!(cfg.graph[n].kind, NodeKind::LoopHeader));
    assert!(has_loop);
}

#[tokio::test]
async fn test_dry_run_search_over_the_sample() {
    let mut rng = rng(42);
    let mut names = NamePool::synthetic(4096);
    let config = SearchConfig {
        iterations: 50,
        strategy: Strategy::Greedy,
        fitness: Fitness::EditDistance,
        cadence: ValidationCadence::EveryCandidate,
    };
    let outcome = run_search(
        quicksort_program(),
        &FixedOracle(true),
        &config,
        &mut rng,
        &mut names,
    )
    .await
    .expect("search");

    assert!(outcome.program.items.len() >= 3);
    assert!(outcome.report.final_nodes > 0);
}
