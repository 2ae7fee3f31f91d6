use veil_core::{normalize_source, Decl, Expr, Stmt, TypeSpec};

#[test]
fn test_nested_binary_operands_are_parenthesized() {
    let expr = Expr::binary(
        "*",
        Expr::binary("+", Expr::ident("a"), Expr::int(1)),
        Expr::ident("b"),
    );
    assert_eq!(expr.to_string(), "(a + 1) * b");
}

#[test]
fn test_declarator_rendering_composes_inside_out() {
    let ptr = TypeSpec::Pointer(Box::new(TypeSpec::int()));
    assert_eq!(ptr.render_with_name("p"), "int *p");

    let arr = TypeSpec::Array {
        elem: Box::new(TypeSpec::int()),
        size: None,
    };
    assert_eq!(arr.render_with_name("arr"), "int arr[]");

    let quals = TypeSpec::named(&["unsigned", "long"]);
    assert_eq!(quals.render_with_name("n"), "unsigned long n");
}

#[test]
fn test_statement_rendering() {
    let stmt = Stmt::If {
        cond: Expr::binary("<", Expr::ident("i"), Expr::int(10)),
        then_branch: Box::new(Stmt::Block(vec![Stmt::Goto("done".to_string())])),
        else_branch: None,
    };
    let rendered = stmt.to_string();
    assert!(rendered.contains("if (i < 10)"));
    assert!(rendered.contains("goto done;"));

    let label = Stmt::Label {
        name: "done".to_string(),
        inner: None,
    };
    assert_eq!(label.to_string().trim(), "done: ;");
}

#[test]
fn test_decl_rendering_with_initializer() {
    let decl = Decl {
        name: "y".to_string(),
        ty: TypeSpec::int(),
        init: Some(Expr::int(0)),
    };
    assert_eq!(decl.to_string(), "int y = 0");
}

#[test]
fn test_node_count_counts_nested_structure() {
    // if-stmt(1) + cond binary(1) + two idents... cond: Binary + 2 leaves = 3,
    // branch: block(1) + assign(1) + 2 leaves = 4.
    let stmt = Stmt::If {
        cond: Expr::binary(">", Expr::ident("x"), Expr::int(0)),
        then_branch: Box::new(Stmt::Block(vec![Stmt::assign(
            Expr::ident("y"),
            Expr::int(1),
        )])),
        else_branch: None,
    };
    assert_eq!(stmt.node_count(), 8);
}

#[test]
fn test_normalize_source_strips_all_whitespace() {
    assert_eq!(
        normalize_source("int  y =\n  0 ;"),
        normalize_source("int y = 0;")
    );
    assert_ne!(normalize_source("int y = 0;"), normalize_source("int y = 1;"));
}
