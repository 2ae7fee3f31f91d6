//! The built-in demo program: a quicksort over `int` arrays, expressed
//! directly as an AST. The frontend that parses real C sources is a separate
//! concern; the CLI ships this program so every subcommand has something to
//! chew on out of the box. A matching test harness (`fib`/`sqr`-style driver
//! calling `quickSort` and checking the result) must be compiled to an object
//! file by the caller for oracle-backed runs.

use veil_core::{Decl, Expr, FuncDef, Item, Program, Stmt, TypeSpec};

fn int_param(name: &str) -> Decl {
    Decl {
        name: name.to_string(),
        ty: TypeSpec::int(),
        init: None,
    }
}

fn int_array_param(name: &str) -> Decl {
    Decl {
        name: name.to_string(),
        ty: TypeSpec::Array {
            elem: Box::new(TypeSpec::int()),
            size: None,
        },
        init: None,
    }
}

fn int_ptr_param(name: &str) -> Decl {
    Decl {
        name: name.to_string(),
        ty: TypeSpec::Pointer(Box::new(TypeSpec::int())),
        init: None,
    }
}

fn local(name: &str, init: Expr) -> Stmt {
    Stmt::Decl(Decl {
        name: name.to_string(),
        ty: TypeSpec::int(),
        init: Some(init),
    })
}

/// `swap` / `partition` / `quickSort`.
pub fn quicksort_program() -> Program {
    let swap = FuncDef {
        name: "swap".to_string(),
        ret: TypeSpec::named(&["void"]),
        params: vec![int_ptr_param("a"), int_ptr_param("b")],
        body: vec![
            local("temp", Expr::Raw("*a".to_string())),
            Stmt::assign(Expr::Raw("*a".to_string()), Expr::Raw("*b".to_string())),
            Stmt::assign(Expr::Raw("*b".to_string()), Expr::ident("temp")),
        ],
    };

    let partition = FuncDef {
        name: "partition".to_string(),
        ret: TypeSpec::int(),
        params: vec![
            int_array_param("arr"),
            int_param("low"),
            int_param("high"),
        ],
        body: vec![
            local("pivot", Expr::Raw("arr[high]".to_string())),
            local("i", Expr::binary("-", Expr::ident("low"), Expr::int(1))),
            Stmt::For {
                init: Some(Box::new(local("j", Expr::ident("low")))),
                cond: Some(Expr::binary(
                    "<=",
                    Expr::ident("j"),
                    Expr::binary("-", Expr::ident("high"), Expr::int(1)),
                )),
                step: Some(Expr::Raw("j++".to_string())),
                body: Box::new(Stmt::Block(vec![Stmt::If {
                    cond: Expr::binary("<=", Expr::Raw("arr[j]".to_string()), Expr::ident("pivot")),
                    then_branch: Box::new(Stmt::Block(vec![
                        Stmt::Other("i++".to_string()),
                        Stmt::Other("swap(&arr[i], &arr[j])".to_string()),
                    ])),
                    else_branch: None,
                }])),
            },
            Stmt::Other("swap(&arr[i + 1], &arr[high])".to_string()),
            Stmt::Return(Some(Expr::binary("+", Expr::ident("i"), Expr::int(1)))),
        ],
    };

    let quicksort = FuncDef {
        name: "quickSort".to_string(),
        ret: TypeSpec::named(&["void"]),
        params: vec![
            int_array_param("arr"),
            int_param("low"),
            int_param("high"),
        ],
        body: vec![Stmt::If {
            cond: Expr::binary("<", Expr::ident("low"), Expr::ident("high")),
            then_branch: Box::new(Stmt::Block(vec![
                local("pi", Expr::Raw("partition(arr, low, high)".to_string())),
                Stmt::Other("quickSort(arr, low, pi - 1)".to_string()),
                Stmt::Other("quickSort(arr, pi + 1, high)".to_string()),
            ])),
            else_branch: None,
        }],
    };

    Program {
        items: vec![
            Item::Func(swap),
            Item::Func(partition),
            Item::Func(quicksort),
        ],
    }
}
