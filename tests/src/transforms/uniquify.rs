use crate::fixtures::{global_pair_program, int_decl, loop_program};
use veil_core::{Expr, FuncDef, Item, Program, Stmt, TypeSpec};
use veil_transform::uniquify::uniquify_variables;

#[test]
fn test_globals_rename_and_uses_follow() {
    let mut program = global_pair_program();
    uniquify_variables(&mut program);

    let Item::Global(alpha) = &program.items[0] else {
        panic!("global expected");
    };
    let Item::Global(beta) = &program.items[1] else {
        panic!("global expected");
    };
    assert_eq!(alpha.name, "var_1");
    assert_eq!(beta.name, "var_2");

    let Item::Func(func) = &program.items[2] else {
        panic!("function expected");
    };
    assert_eq!(func.name, "use_alpha", "function names stay put");
    let Stmt::Assign { lvalue, .. } = &func.body[0] else {
        panic!("assignment expected");
    };
    assert_eq!(lvalue, &Expr::ident("var_1"));
    assert_eq!(
        func.body[1],
        Stmt::Return(Some(Expr::Raw("var_1 + var_2".to_string())))
    );
}

#[test]
fn test_shadowed_names_become_distinct() {
    let mut program = Program {
        items: vec![Item::Func(FuncDef {
            name: "sh".to_string(),
            ret: TypeSpec::named(&["void"]),
            params: vec![int_decl("x", None)],
            body: vec![
                Stmt::assign(Expr::ident("x"), Expr::int(1)),
                Stmt::Block(vec![
                    Stmt::Decl(int_decl("x", Some(Expr::int(5)))),
                    Stmt::assign(Expr::ident("x"), Expr::int(2)),
                ]),
                Stmt::assign(Expr::ident("x"), Expr::int(3)),
            ],
        })],
    };
    uniquify_variables(&mut program);

    let Item::Func(func) = &program.items[0] else {
        panic!("function expected");
    };
    assert_eq!(func.params[0].name, "var_1");
    assert_eq!(func.body[0], Stmt::assign(Expr::ident("var_1"), Expr::int(1)));

    let Stmt::Block(inner) = &func.body[1] else {
        panic!("block expected");
    };
    assert!(matches!(&inner[0], Stmt::Decl(decl) if decl.name == "var_2"));
    assert_eq!(inner[1], Stmt::assign(Expr::ident("var_2"), Expr::int(2)));

    // Back outside the block the outer binding is visible again.
    assert_eq!(func.body[2], Stmt::assign(Expr::ident("var_1"), Expr::int(3)));
}

#[test]
fn test_raw_text_rewrites_whole_words_only() {
    let mut program = Program {
        items: vec![Item::Func(FuncDef {
            name: "rw".to_string(),
            ret: TypeSpec::named(&["void"]),
            params: vec![int_decl("x", None)],
            body: vec![Stmt::Other("swap(x, xx, x1)".to_string())],
        })],
    };
    uniquify_variables(&mut program);

    let Item::Func(func) = &program.items[0] else {
        panic!("function expected");
    };
    assert_eq!(func.body[0], Stmt::Other("swap(var_1, xx, x1)".to_string()));
}

#[test]
fn test_counter_runs_across_functions() {
    let mut program = Program {
        items: vec![
            Item::Func(FuncDef {
                name: "one".to_string(),
                ret: TypeSpec::named(&["void"]),
                params: vec![int_decl("a", None)],
                body: vec![],
            }),
            Item::Func(FuncDef {
                name: "two".to_string(),
                ret: TypeSpec::named(&["void"]),
                params: vec![int_decl("a", None)],
                body: vec![],
            }),
        ],
    };
    uniquify_variables(&mut program);

    let names: Vec<String> = program
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Func(func) => Some(func.params[0].name.clone()),
            Item::Global(_) => None,
        })
        .collect();
    assert_eq!(names, vec!["var_1".to_string(), "var_2".to_string()]);
}

#[test]
fn test_for_init_declares_into_loop_scope() {
    let mut program = loop_program();
    uniquify_variables(&mut program);

    let Item::Func(func) = &program.items[0] else {
        panic!("function expected");
    };
    // Param n, local total, then the loop counter.
    assert_eq!(func.params[0].name, "var_1");
    assert!(matches!(&func.body[0], Stmt::Decl(decl) if decl.name == "var_2"));

    let Stmt::For {
        init: Some(init),
        cond: Some(cond),
        step: Some(step),
        ..
    } = &func.body[1]
    else {
        panic!("for loop expected");
    };
    assert!(matches!(&**init, Stmt::Decl(decl) if decl.name == "var_3"));
    assert_eq!(
        cond,
        &Expr::binary("<", Expr::ident("var_3"), Expr::ident("var_1"))
    );
    assert_eq!(step, &Expr::Raw("var_3++".to_string()));

    assert_eq!(func.body[2], Stmt::Return(Some(Expr::ident("var_2"))));
}
