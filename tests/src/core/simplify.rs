use crate::fixtures::{branchy_program, goto_form_program};
use veil_analysis::edit_distance;
use veil_core::{build_program, simplify, Cfg, Expr, FuncDef, Item, NodeKind, Program, Stmt, TypeSpec};

fn kind_count(cfg: &Cfg, kind: NodeKind) -> usize {
    cfg.graph
        .node_indices()
        .filter(|&n| cfg.graph[n].kind == kind)
        .count()
}

fn sorted_labels(cfg: &Cfg) -> Vec<String> {
    let mut labels: Vec<String> = cfg.labels().map(str::to_string).collect();
    labels.sort();
    labels
}

#[test]
fn test_branchy_simplification_keeps_semantic_nodes() {
    let cfg = simplify(build_program(&branchy_program()));

    // Routing nodes are gone, decisions and work survive.
    assert_eq!(kind_count(&cfg, NodeKind::Join), 0);
    assert_eq!(kind_count(&cfg, NodeKind::Goto), 0);
    assert_eq!(kind_count(&cfg, NodeKind::Label), 0);
    assert_eq!(kind_count(&cfg, NodeKind::If), 1);
    assert_eq!(kind_count(&cfg, NodeKind::Statement), 3);
    assert_eq!(kind_count(&cfg, NodeKind::Return), 1);
    assert_eq!(cfg.node_count(), 7);
    assert_eq!(cfg.edge_count(), 7);
}

#[test]
fn test_goto_form_simplifies_to_structured_form() {
    let structured = simplify(build_program(&branchy_program()));
    let lowered = simplify(build_program(&goto_form_program()));

    assert_eq!(edit_distance(&structured, &lowered), 0);
    assert_eq!(sorted_labels(&structured), sorted_labels(&lowered));
}

#[test]
fn test_simplify_is_idempotent() {
    let once = simplify(build_program(&goto_form_program()));
    let labels_once = sorted_labels(&once);
    let edges_once = once.edge_count();

    let twice = simplify(once);
    assert_eq!(sorted_labels(&twice), labels_once);
    assert_eq!(twice.edge_count(), edges_once);
}

#[test]
fn test_unreachable_statements_are_collected() {
    let program = Program {
        items: vec![Item::Func(FuncDef {
            name: "f".to_string(),
            ret: TypeSpec::int(),
            params: vec![],
            body: vec![
                Stmt::Return(Some(Expr::int(0))),
                Stmt::assign(Expr::ident("x"), Expr::int(1)),
            ],
        })],
    };
    let cfg = simplify(build_program(&program));

    assert_eq!(kind_count(&cfg, NodeKind::Statement), 0);
    assert!(cfg.labels().all(|l| l != "x = 1;"));
    // entry, return, end
    assert_eq!(cfg.node_count(), 3);
}

#[test]
fn test_goto_cycle_terminates() {
    let program = Program {
        items: vec![Item::Func(FuncDef {
            name: "spin".to_string(),
            ret: TypeSpec::named(&["void"]),
            params: vec![],
            body: vec![
                Stmt::Label {
                    name: "again".to_string(),
                    inner: None,
                },
                Stmt::Goto("again".to_string()),
            ],
        })],
    };
    let cfg = simplify(build_program(&program));

    // Must converge rather than spin; the entry anchor survives.
    assert_eq!(kind_count(&cfg, NodeKind::FunctionEntry), 1);
    assert!(cfg.node_count() <= 3);
}

#[test]
fn test_long_goto_chain_converges_and_is_idempotent() {
    // 500 statements of label/assign/goto hops, every hop one label forward.
    let mut body = Vec::with_capacity(500);
    for i in 0..166i64 {
        body.push(Stmt::Label {
            name: format!("l{i}"),
            inner: None,
        });
        body.push(Stmt::assign(Expr::ident("x"), Expr::int(i)));
        body.push(Stmt::Goto(format!("l{}", i + 1)));
    }
    body.push(Stmt::Label {
        name: "l166".to_string(),
        inner: None,
    });
    body.push(Stmt::Return(Some(Expr::ident("x"))));
    assert_eq!(body.len(), 500);

    let program = Program {
        items: vec![Item::Func(FuncDef {
            name: "chain".to_string(),
            ret: TypeSpec::int(),
            params: vec![],
            body,
        })],
    };
    let once = simplify(build_program(&program));

    // Every hop collapses; only the straight line of assignments survives.
    assert_eq!(kind_count(&once, NodeKind::Goto), 0);
    assert_eq!(kind_count(&once, NodeKind::Label), 0);
    assert_eq!(kind_count(&once, NodeKind::Statement), 166);
    assert_eq!(once.node_count(), 169);
    assert_eq!(once.edge_count(), 168);

    let twice = simplify(once.clone());
    assert_eq!(edit_distance(&once, &twice), 0);
}

#[test]
fn test_empty_graph_is_a_fixed_point() {
    let cfg = simplify(Cfg::default());
    assert_eq!(cfg.node_count(), 0);
    assert_eq!(cfg.edge_count(), 0);
}
