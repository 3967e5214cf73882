// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Inlining of `let` value bindings.
//!
//! A binding whose value is trivial (a literal or a bare variable), or that
//! is referenced exactly once, is substituted at its use sites and removed.
//! A use inside a loop body deeper than the binding blocks inlining: the
//! value expression would move from once-per-entry to once-per-iteration.

use std::collections::HashMap;

use weft_ast::{Expr, ExprArena, ExprId, ExprKind, Stmt, StmtKind};
use weft_resolve::{ResolvedFile, SymbolId};

struct LetInfo {
    value: ExprId,
    depth: u32,
    trivial: bool,
    uses: u32,
    max_use_depth: u32,
    use_sites: Vec<ExprId>,
}

/// One inlining sweep over a template body. Returns true if any binding was
/// substituted away.
pub(crate) fn inline_lets(
    arena: &mut ExprArena,
    resolved: &mut ResolvedFile,
    body: &mut Vec<Stmt>,
) -> bool {
    let mut lets: HashMap<SymbolId, LetInfo> = HashMap::new();
    collect(arena, resolved, body, 0, &mut lets);

    let inlined: Vec<SymbolId> = lets
        .iter()
        .filter(|(_, info)| {
            (info.trivial || info.uses == 1) && info.max_use_depth <= info.depth
        })
        .map(|(sym, _)| *sym)
        .collect();
    if inlined.is_empty() {
        return false;
    }

    for sym in &inlined {
        let info = &lets[sym];
        let value = info.value;
        for use_site in info.use_sites.clone() {
            substitute(arena, resolved, use_site, value);
        }
    }

    let doomed: Vec<ExprId> = inlined.iter().map(|sym| lets[sym].value).collect();
    remove_bindings(body, &doomed);
    true
}

/// Record every value binding and every variable use with its loop depth.
fn collect(
    arena: &ExprArena,
    resolved: &ResolvedFile,
    body: &[Stmt],
    depth: u32,
    lets: &mut HashMap<SymbolId, LetInfo>,
) {
    for stmt in body {
        match &stmt.kind {
            StmtKind::RawText(_) => {}
            StmtKind::Print(expr) => collect_uses(arena, resolved, *expr, depth, lets),
            StmtKind::LetValue { value, .. } => {
                collect_uses(arena, resolved, *value, depth, lets);
                if let Some(&sym) = resolved.decls.get(value) {
                    lets.insert(
                        sym,
                        LetInfo {
                            value: *value,
                            depth,
                            trivial: matches!(
                                arena.kind(*value),
                                kind if kind.is_literal() || matches!(kind, ExprKind::Var(_))
                            ),
                            uses: 0,
                            max_use_depth: 0,
                            use_sites: Vec::new(),
                        },
                    );
                }
            }
            StmtKind::LetContent { body, .. } => collect(arena, resolved, body, depth, lets),
            StmtKind::If { arms, else_body } => {
                for arm in arms {
                    collect_uses(arena, resolved, arm.cond, depth, lets);
                    collect(arena, resolved, &arm.body, depth, lets);
                }
                if let Some(body) = else_body {
                    collect(arena, resolved, body, depth, lets);
                }
            }
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                collect_uses(arena, resolved, *subject, depth, lets);
                for case in cases {
                    for expr in &case.exprs {
                        collect_uses(arena, resolved, *expr, depth, lets);
                    }
                    collect(arena, resolved, &case.body, depth, lets);
                }
                if let Some(body) = default {
                    collect(arena, resolved, body, depth, lets);
                }
            }
            StmtKind::For {
                iterable, body, ..
            } => {
                collect_uses(arena, resolved, *iterable, depth, lets);
                collect(arena, resolved, body, depth + 1, lets);
            }
            StmtKind::CallTemplate { args, .. } => {
                for arg in args {
                    collect_uses(arena, resolved, arg.value, depth, lets);
                }
            }
        }
    }
}

fn collect_uses(
    arena: &ExprArena,
    resolved: &ResolvedFile,
    expr: ExprId,
    depth: u32,
    lets: &mut HashMap<SymbolId, LetInfo>,
) {
    if let ExprKind::Var(_) = arena.kind(expr) {
        if let Some(sym) = resolved.symbol_of(expr) {
            if let Some(info) = lets.get_mut(&sym) {
                info.uses += 1;
                info.max_use_depth = info.max_use_depth.max(depth);
                info.use_sites.push(expr);
            }
        }
    }
    for child in arena.kind(expr).children() {
        collect_uses(arena, resolved, child, depth, lets);
    }
}

/// Overwrite a use site with a fresh copy of the bound value.
fn substitute(arena: &mut ExprArena, resolved: &mut ResolvedFile, use_site: ExprId, value: ExprId) {
    let root = clone_subtree(arena, resolved, value);
    let kind = arena.kind(root).clone();
    let span = arena.span(use_site);
    match resolved.resolutions.get(&root).copied() {
        Some(sym) => {
            resolved.resolutions.insert(use_site, sym);
        }
        None => {
            resolved.resolutions.remove(&use_site);
        }
    }
    *arena.get_mut(use_site) = Expr { kind, span };
}

/// Copy a subtree into fresh arena entries, carrying variable resolutions
/// over to the copied nodes.
fn clone_subtree(arena: &mut ExprArena, resolved: &mut ResolvedFile, id: ExprId) -> ExprId {
    let Expr { kind, span } = arena.get(id).clone();
    let kind = match kind {
        ExprKind::Unary { op, operand } => ExprKind::Unary {
            op,
            operand: clone_subtree(arena, resolved, operand),
        },
        ExprKind::Binary { op, left, right } => ExprKind::Binary {
            op,
            left: clone_subtree(arena, resolved, left),
            right: clone_subtree(arena, resolved, right),
        },
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => ExprKind::Conditional {
            cond: clone_subtree(arena, resolved, cond),
            then: clone_subtree(arena, resolved, then),
            otherwise: clone_subtree(arena, resolved, otherwise),
        },
        ExprKind::Call { name, args } => ExprKind::Call {
            name,
            args: args
                .into_iter()
                .map(|a| clone_subtree(arena, resolved, a))
                .collect(),
        },
        ExprKind::ListLit(items) => ExprKind::ListLit(
            items
                .into_iter()
                .map(|i| clone_subtree(arena, resolved, i))
                .collect(),
        ),
        ExprKind::MapLit(entries) => ExprKind::MapLit(
            entries
                .into_iter()
                .map(|(k, v)| {
                    (
                        clone_subtree(arena, resolved, k),
                        clone_subtree(arena, resolved, v),
                    )
                })
                .collect(),
        ),
        ExprKind::RecordLit(fields) => ExprKind::RecordLit(
            fields
                .into_iter()
                .map(|(name, v)| (name, clone_subtree(arena, resolved, v)))
                .collect(),
        ),
        ExprKind::Field {
            base,
            field,
            null_safe,
        } => ExprKind::Field {
            base: clone_subtree(arena, resolved, base),
            field,
            null_safe,
        },
        ExprKind::Index {
            base,
            index,
            null_safe,
        } => ExprKind::Index {
            base: clone_subtree(arena, resolved, base),
            index: clone_subtree(arena, resolved, index),
            null_safe,
        },
        leaf => leaf,
    };
    let copy = arena.alloc(kind, span);
    if let Some(sym) = resolved.resolutions.get(&id).copied() {
        resolved.resolutions.insert(copy, sym);
    }
    copy
}

/// Drop the binding statements whose value ids were inlined.
fn remove_bindings(body: &mut Vec<Stmt>, doomed: &[ExprId]) {
    body.retain_mut(|stmt| match &mut stmt.kind {
        StmtKind::LetValue { value, .. } => !doomed.contains(value),
        StmtKind::LetContent { body, .. } => {
            remove_bindings(body, doomed);
            true
        }
        StmtKind::If { arms, else_body } => {
            for arm in arms {
                remove_bindings(&mut arm.body, doomed);
            }
            if let Some(body) = else_body {
                remove_bindings(body, doomed);
            }
            true
        }
        StmtKind::Switch { cases, default, .. } => {
            for case in cases {
                remove_bindings(&mut case.body, doomed);
            }
            if let Some(body) = default {
                remove_bindings(body, doomed);
            }
            true
        }
        StmtKind::For { body, .. } => {
            remove_bindings(body, doomed);
            true
        }
        _ => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ast::{Span, TemplateFile, TemplateNode};
    use weft_resolve::resolve_file;

    fn sp() -> Span {
        Span::new(0, 0)
    }

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt { kind, span: sp() }
    }

    fn template(body: Vec<Stmt>) -> TemplateNode {
        TemplateNode {
            name: "t".into(),
            params: Vec::new(),
            body,
            span: sp(),
            slot_count: 0,
        }
    }

    #[test]
    fn trivial_binding_inlines_everywhere() {
        let mut file = TemplateFile::new("test.weft");
        let one = file.arena.alloc(ExprKind::Int(1), sp());
        let use_a = file.arena.alloc(ExprKind::Var("x".into()), sp());
        let use_b = file.arena.alloc(ExprKind::Var("x".into()), sp());
        file.templates.push(template(vec![
            stmt(StmtKind::LetValue {
                name: "x".into(),
                value: one,
            }),
            stmt(StmtKind::Print(use_a)),
            stmt(StmtKind::Print(use_b)),
        ]));
        let mut resolved = resolve_file(&mut file);

        let mut body = std::mem::take(&mut file.templates[0].body);
        assert!(inline_lets(&mut file.arena, &mut resolved, &mut body));
        assert_eq!(body.len(), 2);
        assert!(matches!(file.arena.kind(use_a), ExprKind::Int(1)));
        assert!(matches!(file.arena.kind(use_b), ExprKind::Int(1)));
        assert!(!resolved.resolutions.contains_key(&use_a));
    }

    #[test]
    fn single_use_nontrivial_binding_inlines() {
        let mut file = TemplateFile::new("test.weft");
        let a = file.arena.alloc(ExprKind::Var("p".into()), sp());
        let b = file.arena.alloc(ExprKind::Int(2), sp());
        let sum = file.arena.alloc(
            ExprKind::Binary {
                op: weft_ast::BinOp::Add,
                left: a,
                right: b,
            },
            sp(),
        );
        let use_site = file.arena.alloc(ExprKind::Var("x".into()), sp());
        let p_decl = file.arena.alloc(ExprKind::Int(40), sp());
        file.templates.push(template(vec![
            stmt(StmtKind::LetValue {
                name: "p".into(),
                value: p_decl,
            }),
            stmt(StmtKind::LetValue {
                name: "x".into(),
                value: sum,
            }),
            stmt(StmtKind::Print(use_site)),
        ]));
        let mut resolved = resolve_file(&mut file);
        assert!(resolved.errors.is_empty());

        let mut body = std::mem::take(&mut file.templates[0].body);
        assert!(inline_lets(&mut file.arena, &mut resolved, &mut body));
        // the use site now holds a copy of $p + 2, with the inner var still
        // resolving to $p
        let ExprKind::Binary { left, .. } = file.arena.kind(use_site) else {
            panic!("use site must hold the binding's value");
        };
        assert!(resolved.symbol_of(*left).is_some());
    }

    #[test]
    fn use_inside_deeper_loop_blocks_inlining() {
        let mut file = TemplateFile::new("test.weft");
        let p = file.arena.alloc(ExprKind::Var("p".into()), sp());
        let p_decl = file.arena.alloc(ExprKind::ListLit(Vec::new()), sp());
        let value = file.arena.alloc(
            ExprKind::Call {
                name: "expensive".into(),
                args: Vec::new(),
            },
            sp(),
        );
        let use_site = file.arena.alloc(ExprKind::Var("x".into()), sp());
        file.templates.push(template(vec![
            stmt(StmtKind::LetValue {
                name: "p".into(),
                value: p_decl,
            }),
            stmt(StmtKind::LetValue {
                name: "x".into(),
                value,
            }),
            stmt(StmtKind::For {
                var: "item".into(),
                iterable: p,
                body: vec![stmt(StmtKind::Print(use_site))],
            }),
        ]));
        let mut resolved = resolve_file(&mut file);
        assert!(resolved.errors.is_empty());

        let mut body = std::mem::take(&mut file.templates[0].body);
        inline_lets(&mut file.arena, &mut resolved, &mut body);
        // $x survives: its single use sits one loop deeper than the binding
        assert!(body.iter().any(|s| matches!(
            &s.kind,
            StmtKind::LetValue { name, .. } if name == "x"
        )));
        assert!(matches!(file.arena.kind(use_site), ExprKind::Var(_)));
    }
}
