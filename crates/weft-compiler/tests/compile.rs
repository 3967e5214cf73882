// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! End-to-end tests over the full pass pipeline: programmatically built
//! filesets go through resolution, type checking, simplification, and
//! indirect parameter analysis, and the results are checked through the
//! public compile entry point.

use weft_ast::{
    BinOp, ExprKind, FileSet, IfArm, ParamDecl, Span, Stmt, StmtKind, TemplateFile,
    TemplateNode, TypeExpr, UnaryOp,
};
use weft_compiler::{compile, CompileOptions};
use weft_types::{ConstVal, FunctionRegistry, FunctionSignature, Type, TypeRegistry};

fn sp() -> Span {
    Span::new(0, 0)
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt { kind, span: sp() }
}

fn param(name: &str, ty: TypeExpr) -> ParamDecl {
    ParamDecl {
        name: name.into(),
        ty,
        injected: false,
        required: true,
        span: sp(),
    }
}

fn template(name: &str, params: Vec<ParamDecl>, body: Vec<Stmt>) -> TemplateNode {
    TemplateNode {
        name: name.into(),
        params,
        body,
        span: sp(),
        slot_count: 0,
    }
}

fn single_file(file: TemplateFile) -> FileSet {
    let mut set = FileSet::new();
    set.files.push(file);
    set
}

fn no_simplify() -> CompileOptions {
    CompileOptions {
        simplify: false,
        ..CompileOptions::default()
    }
}

#[test]
fn negative_literal_arithmetic_folds_through_the_pipeline() {
    // {print -99 + -111} compiles to {print -210}
    let mut file = TemplateFile::new("math.weft");
    let a = file.arena.alloc(ExprKind::Int(99), sp());
    let neg_a = file.arena.alloc(
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: a,
        },
        sp(),
    );
    let b = file.arena.alloc(ExprKind::Int(111), sp());
    let neg_b = file.arena.alloc(
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: b,
        },
        sp(),
    );
    let sum = file.arena.alloc(
        ExprKind::Binary {
            op: BinOp::Add,
            left: neg_a,
            right: neg_b,
        },
        sp(),
    );
    file.templates
        .push(template("math", Vec::new(), vec![stmt(StmtKind::Print(sum))]));
    let mut set = single_file(file);

    let compiled = compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &CompileOptions::default(),
    )
    .expect("compiles");

    let body = &set.files[0].templates[0].body;
    let StmtKind::Print(expr) = &body[0].kind else {
        panic!("print survives");
    };
    assert!(matches!(set.files[0].arena.kind(*expr), ExprKind::Int(-210)));
    // the folded literal is typed in the refreshed annotations
    assert_eq!(compiled.files[0].typed.node_types[expr], Type::Int);
}

#[test]
fn folded_let_value_inlines_and_stays_typed() {
    // {let $x: 1 + 1 /}{print $x} compiles to {print 2} with an Int annotation
    let mut file = TemplateFile::new("letfold.weft");
    let one = file.arena.alloc(ExprKind::Int(1), sp());
    let other = file.arena.alloc(ExprKind::Int(1), sp());
    let sum = file.arena.alloc(
        ExprKind::Binary {
            op: BinOp::Add,
            left: one,
            right: other,
        },
        sp(),
    );
    let use_x = file.arena.alloc(ExprKind::Var("x".into()), sp());
    file.templates.push(template(
        "letfold",
        Vec::new(),
        vec![
            stmt(StmtKind::LetValue {
                name: "x".into(),
                value: sum,
            }),
            stmt(StmtKind::Print(use_x)),
        ],
    ));
    let mut set = single_file(file);

    let compiled = compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &CompileOptions::default(),
    )
    .expect("compiles");

    let body = &set.files[0].templates[0].body;
    assert_eq!(body.len(), 1);
    let StmtKind::Print(expr) = &body[0].kind else {
        panic!("print survives");
    };
    assert!(matches!(set.files[0].arena.kind(*expr), ExprKind::Int(2)));
    assert_eq!(compiled.files[0].typed.node_types[expr], Type::Int);
}

#[test]
fn string_concat_folds_partially_around_a_variable() {
    // 'a' + 'b' + $boo keeps one concat: 'ab' + $boo
    let mut file = TemplateFile::new("concat.weft");
    let a = file.arena.alloc(ExprKind::Str("a".into()), sp());
    let b = file.arena.alloc(ExprKind::Str("b".into()), sp());
    let ab = file.arena.alloc(
        ExprKind::Binary {
            op: BinOp::Add,
            left: a,
            right: b,
        },
        sp(),
    );
    let boo = file.arena.alloc(ExprKind::Var("boo".into()), sp());
    let root = file.arena.alloc(
        ExprKind::Binary {
            op: BinOp::Add,
            left: ab,
            right: boo,
        },
        sp(),
    );
    file.templates.push(template(
        "concat",
        vec![param("boo", TypeExpr::String)],
        vec![stmt(StmtKind::Print(root))],
    ));
    let mut set = single_file(file);

    compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &CompileOptions::default(),
    )
    .expect("compiles");

    let arena = &set.files[0].arena;
    let ExprKind::Binary { left, right, .. } = arena.kind(root) else {
        panic!("outer concat survives");
    };
    assert!(matches!(arena.kind(*left), ExprKind::Str(s) if s == "ab"));
    assert!(matches!(arena.kind(*right), ExprKind::Var(_)));
}

#[test]
fn impure_function_never_folds_pure_function_does() {
    let mut functions = FunctionRegistry::new();
    functions.register_with_eval(
        FunctionSignature {
            name: "ceiling".into(),
            params: vec![Type::Float],
            ret: Type::Int,
            pure: true,
        },
        |args| match args {
            [ConstVal::Float(f)] => Some(ConstVal::Int(f.ceil() as i64)),
            _ => None,
        },
    );
    functions.register_with_eval(
        FunctionSignature {
            name: "randomInt".into(),
            params: vec![Type::Int],
            ret: Type::Int,
            pure: false,
        },
        |_| Some(ConstVal::Int(4)),
    );

    let mut file = TemplateFile::new("calls.weft");
    let half = file.arena.alloc(ExprKind::Float(0.5), sp());
    let pure_call = file.arena.alloc(
        ExprKind::Call {
            name: "ceiling".into(),
            args: vec![half],
        },
        sp(),
    );
    let ten = file.arena.alloc(ExprKind::Int(10), sp());
    let impure_call = file.arena.alloc(
        ExprKind::Call {
            name: "randomInt".into(),
            args: vec![ten],
        },
        sp(),
    );
    file.templates.push(template(
        "calls",
        Vec::new(),
        vec![
            stmt(StmtKind::Print(pure_call)),
            stmt(StmtKind::Print(impure_call)),
        ],
    ));
    let mut set = single_file(file);

    compile(
        &mut set,
        &TypeRegistry::new(),
        &functions,
        &CompileOptions::default(),
    )
    .expect("compiles");

    let body = &set.files[0].templates[0].body;
    let StmtKind::Print(folded) = &body[0].kind else {
        panic!()
    };
    let StmtKind::Print(unfolded) = &body[1].kind else {
        panic!()
    };
    assert!(matches!(set.files[0].arena.kind(*folded), ExprKind::Int(1)));
    assert!(matches!(
        set.files[0].arena.kind(*unfolded),
        ExprKind::Call { .. }
    ));
}

#[test]
fn narrowing_is_sound_for_nullable_bool() {
    // {if $maybe}{print $maybe}{/if}{print $maybe}
    let mut file = TemplateFile::new("narrow.weft");
    let cond = file.arena.alloc(ExprKind::Var("maybe".into()), sp());
    let inside = file.arena.alloc(ExprKind::Var("maybe".into()), sp());
    let outside = file.arena.alloc(ExprKind::Var("maybe".into()), sp());
    file.templates.push(template(
        "narrow",
        vec![param(
            "maybe",
            TypeExpr::Union(vec![TypeExpr::Bool, TypeExpr::Null]),
        )],
        vec![
            stmt(StmtKind::If {
                arms: vec![IfArm {
                    cond,
                    body: vec![stmt(StmtKind::Print(inside))],
                }],
                else_body: None,
            }),
            stmt(StmtKind::Print(outside)),
        ],
    ));
    let mut set = single_file(file);

    let compiled = compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &no_simplify(),
    )
    .expect("compiles");

    let types = &compiled.files[0].typed.node_types;
    assert_eq!(types[&inside], Type::Bool);
    assert_eq!(types[&outside], Type::union(vec![Type::Bool, Type::Null]));
}

#[test]
fn unknown_typed_values_never_narrow_beyond_unknown() {
    let mut file = TemplateFile::new("unknown.weft");
    let cond = file.arena.alloc(ExprKind::Var("data".into()), sp());
    let inside = file.arena.alloc(ExprKind::Var("data".into()), sp());
    file.templates.push(template(
        "unknown",
        vec![param("data", TypeExpr::Unknown)],
        vec![stmt(StmtKind::If {
            arms: vec![IfArm {
                cond,
                body: vec![stmt(StmtKind::Print(inside))],
            }],
            else_body: None,
        })],
    ));
    let mut set = single_file(file);

    let compiled = compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &no_simplify(),
    )
    .expect("compiles");

    assert_eq!(
        compiled.files[0].typed.node_types[&inside],
        Type::Unknown
    );
}

#[test]
fn one_bad_call_yields_one_arity_diagnostic_and_later_errors_still_surface() {
    let mut functions = FunctionRegistry::new();
    functions.register(FunctionSignature {
        name: "strlen".into(),
        params: vec![Type::String],
        ret: Type::Int,
        pure: true,
    });

    let mut file = TemplateFile::new("errors.weft");
    let s = file.arena.alloc(ExprKind::Str("x".into()), sp());
    let extra = file.arena.alloc(ExprKind::Str("y".into()), sp());
    let bad_call = file.arena.alloc(
        ExprKind::Call {
            name: "strlen".into(),
            args: vec![s, extra],
        },
        sp(),
    );
    let ghost = file.arena.alloc(ExprKind::Var("ghost".into()), sp());
    file.templates.push(template(
        "errors",
        Vec::new(),
        vec![stmt(StmtKind::Print(bad_call)), stmt(StmtKind::Print(ghost))],
    ));
    let mut set = single_file(file);

    let diagnostics = compile(
        &mut set,
        &TypeRegistry::new(),
        &functions,
        &CompileOptions::default(),
    )
    .unwrap_err();

    let arity: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.code.as_ref().is_some_and(|c| c.0 == "E0310"))
        .collect();
    let undefined: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.code.as_ref().is_some_and(|c| c.0 == "E0200"))
        .collect();
    assert_eq!(arity.len(), 1);
    assert_eq!(undefined.len(), 1);
}

#[test]
fn duplicate_let_in_one_scope_is_rejected() {
    let mut file = TemplateFile::new("dup.weft");
    let one = file.arena.alloc(ExprKind::Int(1), sp());
    let two = file.arena.alloc(ExprKind::Int(2), sp());
    file.templates.push(template(
        "dup",
        Vec::new(),
        vec![
            stmt(StmtKind::LetValue {
                name: "x".into(),
                value: one,
            }),
            stmt(StmtKind::LetValue {
                name: "x".into(),
                value: two,
            }),
        ],
    ));
    let mut set = single_file(file);

    let diagnostics = compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_ref().unwrap().0, "E0201");
}

#[test]
fn sibling_branch_locals_share_slots_loop_locals_do_not() {
    let mut file = TemplateFile::new("slots.weft");
    let cond = file.arena.alloc(ExprKind::Var("flag".into()), sp());
    let one = file.arena.alloc(ExprKind::Int(1), sp());
    let two = file.arena.alloc(ExprKind::Int(2), sp());
    let items = file.arena.alloc(ExprKind::Var("items".into()), sp());
    let three = file.arena.alloc(ExprKind::Int(3), sp());
    file.templates.push(template(
        "slots",
        vec![
            param("flag", TypeExpr::Bool),
            param(
                "items",
                TypeExpr::List(Box::new(TypeExpr::Int)),
            ),
        ],
        vec![
            stmt(StmtKind::If {
                arms: vec![IfArm {
                    cond,
                    body: vec![stmt(StmtKind::LetValue {
                        name: "a".into(),
                        value: one,
                    })],
                }],
                else_body: Some(vec![stmt(StmtKind::LetValue {
                    name: "b".into(),
                    value: two,
                })]),
            }),
            stmt(StmtKind::For {
                var: "item".into(),
                iterable: items,
                body: vec![stmt(StmtKind::LetValue {
                    name: "c".into(),
                    value: three,
                })],
            }),
        ],
    ));
    let mut set = single_file(file);

    let compiled = compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &no_simplify(),
    )
    .expect("compiles");

    let resolved = &compiled.files[0].resolved;
    let slot_of = |name: &str| {
        resolved
            .symbols
            .iter()
            .find(|sym| sym.name == name)
            .and_then(|sym| sym.slot)
            .unwrap()
    };
    // params take 0 and 1; the first free local slot is 2 and both closed
    // sibling branches reuse it
    assert_eq!(slot_of("a"), 2);
    assert_eq!(slot_of("b"), 2);
    // the loop variable owns three live slots, pushing the body local past
    // them
    assert_eq!(slot_of("item"), 2);
    assert_eq!(slot_of("c"), 5);
    assert_eq!(set.files[0].templates[0].slot_count, 6);
}

#[test]
fn legacy_truthiness_types_logic_over_nonbool_as_unknown() {
    let build = || {
        let mut file = TemplateFile::new("legacy.weft");
        let left = file.arena.alloc(ExprKind::Var("n".into()), sp());
        let right = file.arena.alloc(ExprKind::Bool(true), sp());
        let and = file.arena.alloc(
            ExprKind::Binary {
                op: BinOp::And,
                left,
                right,
            },
            sp(),
        );
        file.templates.push(template(
            "legacy",
            vec![param("n", TypeExpr::Int)],
            vec![stmt(StmtKind::Print(and))],
        ));
        (single_file(file), and)
    };

    let (mut strict_set, and) = build();
    let compiled = compile(
        &mut strict_set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &no_simplify(),
    )
    .expect("compiles");
    assert_eq!(compiled.files[0].typed.node_types[&and], Type::Bool);

    let (mut legacy_set, and) = build();
    let options = CompileOptions {
        legacy_truthiness: true,
        simplify: false,
    };
    let compiled = compile(
        &mut legacy_set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &options,
    )
    .expect("compiles");
    assert_eq!(compiled.files[0].typed.node_types[&and], Type::Unknown);
}

#[test]
fn indirect_params_flow_through_forwarding_calls() {
    let mut file = TemplateFile::new("calls.weft");
    file.templates.push(template(
        "outer",
        vec![param("shared", TypeExpr::Int)],
        vec![stmt(StmtKind::CallTemplate {
            callee: "inner".into(),
            args: Vec::new(),
            pass_all_data: true,
        })],
    ));
    file.templates.push(template(
        "inner",
        vec![param("shared", TypeExpr::Int), param("depth", TypeExpr::Int)],
        Vec::new(),
    ));
    let mut set = single_file(file);

    let compiled = compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &CompileOptions::default(),
    )
    .expect("compiles");

    let outer = &compiled.indirect_params["outer"];
    assert_eq!(outer.params.len(), 1);
    assert_eq!(outer.params.get("depth"), Some(&Type::Int));
    assert!(compiled.indirect_params["inner"].params.is_empty());
}

#[test]
fn constant_branches_collapse_and_raw_text_merges() {
    let mut file = TemplateFile::new("collapse.weft");
    let t = file.arena.alloc(ExprKind::Bool(true), sp());
    file.templates.push(template(
        "collapse",
        Vec::new(),
        vec![
            stmt(StmtKind::RawText("Hello".into())),
            stmt(StmtKind::If {
                arms: vec![IfArm {
                    cond: t,
                    body: vec![stmt(StmtKind::RawText(", world".into()))],
                }],
                else_body: Some(vec![stmt(StmtKind::RawText(", nobody".into()))]),
            }),
        ],
    ));
    let mut set = single_file(file);

    compile(
        &mut set,
        &TypeRegistry::new(),
        &FunctionRegistry::new(),
        &CompileOptions::default(),
    )
    .expect("compiles");

    let body = &set.files[0].templates[0].body;
    assert_eq!(body.len(), 1);
    assert!(matches!(&body[0].kind, StmtKind::RawText(s) if s == "Hello, world"));
}
