use crate::fixtures::{branchy_program, global_pair_program, pool, rng};
use veil_core::{normalize_source, Expr};
use veil_transform::opaque::{build_opaque_expr, is_opaque, OpaqueInsert, OpaqueRemove};
use veil_transform::{Mutation, MutationCtx};

#[test]
fn test_built_clause_is_detected_for_every_term_count() {
    let names = vec!["v".to_string()];
    for n in 2..=5 {
        let mut rng = rng(n as u64);
        let clause = build_opaque_expr(&names, n, &mut rng);
        assert!(is_opaque(&clause), "clause with {n} terms not detected");
    }
}

#[test]
fn test_empty_scope_degenerates_to_literal_zero() {
    let mut rng = rng(1);
    let clause = build_opaque_expr(&[], 3, &mut rng);
    assert_eq!(clause, Expr::int(0));
    assert!(is_opaque(&clause));
}

#[test]
fn test_detector_rejects_near_misses() {
    // Wrong modulus for the chain depth.
    let short_chain = Expr::binary(
        "%",
        Expr::binary("*", Expr::ident("v"), Expr::ident("v")),
        Expr::int(3),
    );
    assert!(!is_opaque(&short_chain));

    // Mixed variables.
    let mixed = Expr::binary(
        "%",
        Expr::binary("*", Expr::ident("v"), Expr::ident("w")),
        Expr::int(1),
    );
    assert!(!is_opaque(&mixed));

    // Not zero, not a chain.
    assert!(!is_opaque(&Expr::int(1)));
    assert!(!is_opaque(&Expr::binary("+", Expr::ident("a"), Expr::ident("b"))));
}

#[test]
fn test_insert_then_remove_round_trips_source() {
    let mut program = global_pair_program();
    let original = normalize_source(&program.to_string());

    let mut rng = rng(11);
    let mut names = pool();
    let mut ctx = MutationCtx {
        rng: &mut rng,
        names: &mut names,
    };

    assert!(OpaqueInsert.apply(&mut program, &mut ctx).expect("insert"));
    let mutated = normalize_source(&program.to_string());
    assert_ne!(mutated, original, "insertion must change the source");

    assert!(OpaqueRemove.apply(&mut program, &mut ctx).expect("remove"));
    assert_eq!(normalize_source(&program.to_string()), original);
}

#[test]
fn test_round_trip_on_branchy_program() {
    let mut program = branchy_program();
    let original = normalize_source(&program.to_string());

    let mut rng = rng(23);
    let mut names = pool();
    let mut ctx = MutationCtx {
        rng: &mut rng,
        names: &mut names,
    };

    assert!(OpaqueInsert.apply(&mut program, &mut ctx).expect("insert"));
    assert!(OpaqueRemove.apply(&mut program, &mut ctx).expect("remove"));
    assert_eq!(normalize_source(&program.to_string()), original);
}

#[test]
fn test_remove_reports_false_on_clean_program() {
    let mut program = branchy_program();
    let mut rng = rng(2);
    let mut names = pool();
    let mut ctx = MutationCtx {
        rng: &mut rng,
        names: &mut names,
    };
    assert!(!OpaqueRemove.apply(&mut program, &mut ctx).expect("remove"));
    assert_eq!(program, branchy_program());
}
