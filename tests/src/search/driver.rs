use crate::fixtures::{branchy_program, int_decl, loop_program, pool, rng};
use veil_analysis::{CyclomaticScorer, NODE_CUTOFF, NODE_SLACK};
use veil_core::{build_program, Expr, FixedOracle, FuncDef, Item, Program, Stmt, TypeSpec};
use veil_transform::search::{
    run_search, Fitness, SearchConfig, SearchOutcome, Strategy, ValidationCadence,
};
use veil_transform::{unroll::unroll_loops, uniquify::uniquify_variables, MutationCtx};

fn greedy_config(iterations: usize) -> SearchConfig {
    SearchConfig {
        iterations,
        strategy: Strategy::Greedy,
        fitness: Fitness::EditDistance,
        cadence: ValidationCadence::EveryCandidate,
    }
}

#[tokio::test]
async fn test_failing_oracle_falls_back_to_pre_passed_program() {
    let mut rng_run = rng(17);
    let mut names_run = pool();
    let outcome = run_search(
        loop_program(),
        &FixedOracle(false),
        &greedy_config(20),
        &mut rng_run,
        &mut names_run,
    )
    .await
    .expect("search");

    // With the same seed the pre-passes draw the same fresh names.
    let mut expected = loop_program();
    uniquify_variables(&mut expected);
    let mut rng_ref = rng(17);
    let mut names_ref = pool();
    let mut ctx = MutationCtx {
        rng: &mut rng_ref,
        names: &mut names_ref,
    };
    unroll_loops(&mut expected, &mut ctx).expect("unroll");

    assert_eq!(outcome.program, expected);
    // Every acceptance is validated immediately and bounces.
    assert_eq!(outcome.report.validation_failures, outcome.report.accepted);
}

#[tokio::test]
async fn test_report_counts_are_consistent() {
    let mut rng = rng(18);
    let mut names = pool();
    let SearchOutcome { program, report } = run_search(
        branchy_program(),
        &FixedOracle(true),
        &greedy_config(40),
        &mut rng,
        &mut names,
    )
    .await
    .expect("search");

    assert_eq!(report.iterations, 40);
    assert_eq!(
        report.applied,
        report.accepted + report.rejected_score + report.rejected_budget
    );
    let draws: usize = report.operator_counts.values().sum();
    assert!(draws >= report.applied);
    assert!(draws <= report.iterations);
    assert_eq!(report.final_nodes, build_program(&program).node_count());
    assert_eq!(report.validation_failures, 0);
}

#[tokio::test]
async fn test_same_seed_reproduces_the_run() {
    let mut first = None;
    for _ in 0..2 {
        let mut rng = rng(19);
        let mut names = pool();
        let outcome = run_search(
            branchy_program(),
            &FixedOracle(true),
            &greedy_config(30),
            &mut rng,
            &mut names,
        )
        .await
        .expect("search");

        match &first {
            None => first = Some(outcome),
            Some(previous) => {
                assert_eq!(outcome.program, previous.program);
                assert_eq!(outcome.report.accepted, previous.report.accepted);
                assert_eq!(outcome.report.applied, previous.report.applied);
                assert_eq!(outcome.report.final_distance, previous.report.final_distance);
            }
        }
    }
}

#[test]
fn test_metropolis_always_accepts_improvements() {
    let mut rng = rng(7);
    for _ in 0..200 {
        assert!(Strategy::Metropolis.accepts(10.0, 1.0, 0.0, &mut rng));
        // A candidate at or below zero still wins when it improves.
        assert!(Strategy::Metropolis.accepts(10.0, -3.0, 0.0, &mut rng));
        assert!(Strategy::Metropolis.accepts(-1.0, -2.0, 0.0, &mut rng));
    }
}

#[test]
fn test_metropolis_worsening_moves_use_the_ratio() {
    let mut rng = rng(8);
    for _ in 0..200 {
        // Equal scores give ratio 1, so the move is always kept.
        assert!(Strategy::Metropolis.accepts(4.0, 4.0, 0.0, &mut rng));
        // Worsening from a non-positive score is always rejected.
        assert!(!Strategy::Metropolis.accepts(0.0, 1.0, 0.0, &mut rng));
        assert!(!Strategy::Metropolis.accepts(-2.0, -1.0, 0.0, &mut rng));
    }
}

#[tokio::test]
async fn test_budget_counts_cfg_nodes_not_expression_size() {
    // One statement carrying a huge expression: far over the cutoff by AST
    // size, a handful of CFG nodes.
    let wide = (0..NODE_CUTOFF as i64).fold(Expr::int(0), |acc, i| {
        Expr::binary("+", acc, Expr::int(i))
    });
    let program = Program {
        items: vec![Item::Func(FuncDef {
            name: "wide".to_string(),
            ret: TypeSpec::int(),
            params: vec![],
            body: vec![
                Stmt::Decl(int_decl("x", Some(wide))),
                Stmt::Return(Some(Expr::ident("x"))),
            ],
        })],
    };
    assert!(program.node_count() > NODE_CUTOFF + NODE_SLACK);
    assert!(build_program(&program).node_count() <= NODE_CUTOFF);

    let mut rng = rng(22);
    let mut names = pool();
    let outcome = run_search(
        program,
        &FixedOracle(true),
        &greedy_config(20),
        &mut rng,
        &mut names,
    )
    .await
    .expect("search");

    assert!(outcome.report.applied > 0);
    assert_eq!(outcome.report.rejected_budget, 0);
}

#[tokio::test]
async fn test_annealing_with_adaptive_cadence_completes() {
    let mut rng = rng(20);
    let mut names = pool();
    let config = SearchConfig {
        iterations: 25,
        strategy: Strategy::Annealing {
            initial_temperature: 1.0,
            cooling: 0.9,
        },
        fitness: Fitness::EditDistance,
        cadence: ValidationCadence::Adaptive,
    };
    let outcome = run_search(
        loop_program(),
        &FixedOracle(true),
        &config,
        &mut rng,
        &mut names,
    )
    .await
    .expect("search");

    assert_eq!(outcome.report.iterations, 25);
    assert!(outcome.report.final_nodes > 0);
}

#[tokio::test]
async fn test_complexity_fitness_runs() {
    let mut rng = rng(21);
    let mut names = pool();
    let config = SearchConfig {
        iterations: 15,
        strategy: Strategy::Greedy,
        fitness: Fitness::Complexity(Box::new(CyclomaticScorer)),
        cadence: ValidationCadence::EveryCandidate,
    };
    let outcome = run_search(
        branchy_program(),
        &FixedOracle(true),
        &config,
        &mut rng,
        &mut names,
    )
    .await
    .expect("search");

    assert!(outcome.report.final_nodes > 0);
}
