// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement-level simplification: folding each statement's expressions,
//! collapsing branches whose condition became constant, and merging adjacent
//! raw text.

use weft_ast::{ExprArena, Stmt, StmtKind};
use weft_resolve::ResolvedFile;
use weft_types::FunctionRegistry;

use crate::fold::{const_of, Folder};

/// One simplification sweep over a statement body. Returns true if anything
/// changed; the caller re-runs until a sweep is a no-op.
pub(crate) fn simplify_body(
    arena: &mut ExprArena,
    resolved: &mut ResolvedFile,
    functions: &FunctionRegistry,
    body: &mut Vec<Stmt>,
) -> bool {
    let mut changed = false;
    for stmt in body.iter_mut() {
        changed |= fold_stmt_exprs(arena, resolved, functions, stmt);
    }
    changed |= collapse(arena, body);
    changed |= merge_raw_text(body);
    changed
}

/// Fold the expressions a statement holds, rewriting its root ids, and
/// recurse into nested bodies. A `let` value or loop iterable doubles as the
/// key of its binding's `decls` entry, so folding one rekeys that entry.
fn fold_stmt_exprs(
    arena: &mut ExprArena,
    resolved: &mut ResolvedFile,
    functions: &FunctionRegistry,
    stmt: &mut Stmt,
) -> bool {
    let mut folder = Folder::new(arena, functions);
    match &mut stmt.kind {
        StmtKind::RawText(_) => {}
        StmtKind::Print(expr) => *expr = folder.fold(*expr),
        StmtKind::LetValue { value, .. } => {
            let folded = folder.fold(*value);
            if folded != *value {
                if let Some(sym) = resolved.decls.remove(value) {
                    resolved.decls.insert(folded, sym);
                }
                *value = folded;
            }
        }
        StmtKind::LetContent { body, .. } => {
            let changed = folder.changed;
            drop(folder);
            return changed | simplify_body(arena, resolved, functions, body);
        }
        StmtKind::If { arms, else_body } => {
            for arm in arms.iter_mut() {
                arm.cond = folder.fold(arm.cond);
            }
            let changed = folder.changed;
            drop(folder);
            let mut any = changed;
            for arm in arms.iter_mut() {
                any |= simplify_body(arena, resolved, functions, &mut arm.body);
            }
            if let Some(body) = else_body {
                any |= simplify_body(arena, resolved, functions, body);
            }
            return any;
        }
        StmtKind::Switch {
            subject,
            cases,
            default,
        } => {
            *subject = folder.fold(*subject);
            for case in cases.iter_mut() {
                for expr in case.exprs.iter_mut() {
                    *expr = folder.fold(*expr);
                }
            }
            let changed = folder.changed;
            drop(folder);
            let mut any = changed;
            for case in cases.iter_mut() {
                any |= simplify_body(arena, resolved, functions, &mut case.body);
            }
            if let Some(body) = default {
                any |= simplify_body(arena, resolved, functions, body);
            }
            return any;
        }
        StmtKind::For { iterable, body, .. } => {
            let folded = folder.fold(*iterable);
            if folded != *iterable {
                if let Some(sym) = resolved.decls.remove(iterable) {
                    resolved.decls.insert(folded, sym);
                }
                *iterable = folded;
            }
            let changed = folder.changed;
            drop(folder);
            return changed | simplify_body(arena, resolved, functions, body);
        }
        StmtKind::CallTemplate { args, .. } => {
            for arg in args.iter_mut() {
                arg.value = folder.fold(arg.value);
            }
        }
    }
    folder.changed
}

/// Collapse statements whose outcome is statically known.
fn collapse(arena: &ExprArena, body: &mut Vec<Stmt>) -> bool {
    let mut changed = false;
    let mut out = Vec::with_capacity(body.len());
    for stmt in body.drain(..) {
        match stmt.kind {
            StmtKind::If { arms, else_body } => {
                changed |= collapse_if(arena, arms, else_body, stmt.span, &mut out);
            }
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                changed |= collapse_switch(arena, subject, cases, default, stmt.span, &mut out);
            }
            kind => out.push(Stmt {
                kind,
                span: stmt.span,
            }),
        }
    }
    *body = out;
    changed
}

fn collapse_if(
    arena: &ExprArena,
    arms: Vec<weft_ast::IfArm>,
    else_body: Option<Vec<Stmt>>,
    span: weft_ast::Span,
    out: &mut Vec<Stmt>,
) -> bool {
    let mut kept = Vec::with_capacity(arms.len());
    let mut changed = false;
    for arm in arms {
        match const_of(arena, arm.cond) {
            Some(val) if val.is_truthy() => {
                if kept.is_empty() {
                    // unconditionally taken
                    out.extend(arm.body);
                } else {
                    // becomes the else of the arms still in doubt
                    out.push(Stmt {
                        kind: StmtKind::If {
                            arms: kept,
                            else_body: Some(arm.body),
                        },
                        span,
                    });
                }
                return true;
            }
            Some(_) => {
                // never taken
                changed = true;
            }
            None => kept.push(arm),
        }
    }
    if kept.is_empty() {
        changed = true;
        if let Some(body) = else_body {
            out.extend(body);
        }
    } else {
        out.push(Stmt {
            kind: StmtKind::If {
                arms: kept,
                else_body,
            },
            span,
        });
    }
    changed
}

fn collapse_switch(
    arena: &ExprArena,
    subject: weft_ast::ExprId,
    cases: Vec<weft_ast::SwitchCase>,
    default: Option<Vec<Stmt>>,
    span: weft_ast::Span,
    out: &mut Vec<Stmt>,
) -> bool {
    let all_const = const_of(arena, subject).is_some()
        && cases
            .iter()
            .all(|case| case.exprs.iter().all(|e| const_of(arena, *e).is_some()));
    if !all_const {
        out.push(Stmt {
            kind: StmtKind::Switch {
                subject,
                cases,
                default,
            },
            span,
        });
        return false;
    }

    // every comparison must be decidable before committing to a branch
    let subject_val = const_of(arena, subject).unwrap();
    let mut verdicts = Vec::with_capacity(cases.len());
    let mut decidable = true;
    'cases: for case in &cases {
        let mut matched = false;
        for expr in &case.exprs {
            match crate::fold::const_eq(&const_of(arena, *expr).unwrap(), &subject_val) {
                Some(true) => matched = true,
                Some(false) => {}
                None => {
                    decidable = false;
                    break 'cases;
                }
            }
        }
        verdicts.push(matched);
    }
    if !decidable {
        out.push(Stmt {
            kind: StmtKind::Switch {
                subject,
                cases,
                default,
            },
            span,
        });
        return false;
    }

    for (case, matched) in cases.into_iter().zip(verdicts) {
        if matched {
            out.extend(case.body);
            return true;
        }
    }
    if let Some(body) = default {
        out.extend(body);
    }
    true
}

/// Merge runs of adjacent raw text into one node.
fn merge_raw_text(body: &mut Vec<Stmt>) -> bool {
    let mut changed = false;
    let mut out: Vec<Stmt> = Vec::with_capacity(body.len());
    for stmt in body.drain(..) {
        if let StmtKind::RawText(text) = &stmt.kind {
            if let Some(Stmt {
                kind: StmtKind::RawText(prev),
                span,
            }) = out.last_mut()
            {
                prev.push_str(text);
                *span = span.merge(stmt.span);
                changed = true;
                continue;
            }
        }
        out.push(stmt);
    }
    *body = out;
    changed
}
