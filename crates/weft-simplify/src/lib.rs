// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Constant folding and simplification of resolved template files.
//!
//! Three rewrites run as one sweep per template: expression folding over the
//! arena, collapse of statically-decided branches, and `let` inlining.
//! Sweeps repeat until none of them changes anything, so a fold enabled by
//! an inline (or the reverse) is always picked up. The simplifier validates
//! nothing and raises no errors; whatever it cannot prove it leaves alone.

mod fold;
mod inline;
mod stmts;

use weft_ast::TemplateFile;
use weft_resolve::ResolvedFile;
use weft_types::FunctionRegistry;

/// Simplify every template in a file to a fixed point.
pub fn simplify_file(
    file: &mut TemplateFile,
    resolved: &mut ResolvedFile,
    functions: &FunctionRegistry,
) {
    let TemplateFile {
        arena, templates, ..
    } = file;
    loop {
        let mut changed = false;
        for template in templates.iter_mut() {
            changed |= stmts::simplify_body(arena, resolved, functions, &mut template.body);
            changed |= inline::inline_lets(arena, resolved, &mut template.body);
        }
        if !changed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ast::{ExprKind, Span, Stmt, StmtKind, TemplateNode};
    use weft_resolve::resolve_file;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn inline_then_fold_reaches_fixed_point() {
        // {let $x: 4 /}{print $x * 10 + 2} becomes {print 42}
        let mut file = TemplateFile::new("test.weft");
        let four = file.arena.alloc(ExprKind::Int(4), sp());
        let use_x = file.arena.alloc(ExprKind::Var("x".into()), sp());
        let ten = file.arena.alloc(ExprKind::Int(10), sp());
        let mul = file.arena.alloc(
            ExprKind::Binary {
                op: weft_ast::BinOp::Mul,
                left: use_x,
                right: ten,
            },
            sp(),
        );
        let two = file.arena.alloc(ExprKind::Int(2), sp());
        let sum = file.arena.alloc(
            ExprKind::Binary {
                op: weft_ast::BinOp::Add,
                left: mul,
                right: two,
            },
            sp(),
        );
        file.templates.push(TemplateNode {
            name: "t".into(),
            params: Vec::new(),
            body: vec![
                Stmt {
                    kind: StmtKind::LetValue {
                        name: "x".into(),
                        value: four,
                    },
                    span: sp(),
                },
                Stmt {
                    kind: StmtKind::Print(sum),
                    span: sp(),
                },
            ],
            span: sp(),
            slot_count: 0,
        });
        let mut resolved = resolve_file(&mut file);
        assert!(resolved.errors.is_empty());

        let functions = FunctionRegistry::new();
        simplify_file(&mut file, &mut resolved, &functions);

        let body = &file.templates[0].body;
        assert_eq!(body.len(), 1);
        let StmtKind::Print(expr) = &body[0].kind else {
            panic!("print must survive");
        };
        assert!(matches!(file.arena.kind(*expr), ExprKind::Int(42)));
    }

    #[test]
    fn fold_then_inline_reaches_fixed_point() {
        // {let $x: 1 + 1 /}{print $x} becomes {print 2}
        let mut file = TemplateFile::new("test.weft");
        let one = file.arena.alloc(ExprKind::Int(1), sp());
        let other = file.arena.alloc(ExprKind::Int(1), sp());
        let sum = file.arena.alloc(
            ExprKind::Binary {
                op: weft_ast::BinOp::Add,
                left: one,
                right: other,
            },
            sp(),
        );
        let use_x = file.arena.alloc(ExprKind::Var("x".into()), sp());
        file.templates.push(TemplateNode {
            name: "t".into(),
            params: Vec::new(),
            body: vec![
                Stmt {
                    kind: StmtKind::LetValue {
                        name: "x".into(),
                        value: sum,
                    },
                    span: sp(),
                },
                Stmt {
                    kind: StmtKind::Print(use_x),
                    span: sp(),
                },
            ],
            span: sp(),
            slot_count: 0,
        });
        let mut resolved = resolve_file(&mut file);
        assert!(resolved.errors.is_empty());

        let functions = FunctionRegistry::new();
        simplify_file(&mut file, &mut resolved, &functions);

        // The binding folds to a literal first; the literal then inlines.
        let body = &file.templates[0].body;
        assert_eq!(body.len(), 1);
        let StmtKind::Print(expr) = &body[0].kind else {
            panic!("print must survive");
        };
        assert!(matches!(file.arena.kind(*expr), ExprKind::Int(2)));
    }
}
