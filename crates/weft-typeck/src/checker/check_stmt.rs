// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement walking and branch-scoped narrowing.

use weft_ast::{ExprId, ExprKind, Stmt, StmtKind, TemplateNode};
use weft_types::Type;

use super::TypeChecker;
use crate::errors::TypeError;
use crate::narrow::Facts;
use crate::path::AccessPath;

impl<'a> TypeChecker<'a> {
    pub(crate) fn check_template(&mut self, template: &TemplateNode) {
        for param in &template.params {
            let Some(sym) = self
                .resolved
                .symbols
                .iter()
                .find(|sym| sym.name == param.name && sym.span == param.span)
                .map(|sym| sym.id)
            else {
                continue;
            };
            let mut ty = match self.types.resolve_type(&param.ty) {
                Ok(ty) => ty,
                Err(err) => {
                    self.errors.push(TypeError::UnboundName {
                        name: err.0,
                        span: param.span,
                    });
                    Type::Unknown
                }
            };
            if !param.required {
                ty = Type::union(vec![ty, Type::Null]);
            }
            self.symbol_types.insert(sym, ty);
        }
        self.check_body(&template.body);
    }

    fn check_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::RawText(_) => {}

            StmtKind::Print(expr) => {
                self.check_expr(*expr);
            }

            StmtKind::LetValue { value, .. } => {
                let ty = self.check_expr(*value);
                if let Some(&sym) = self.resolved.decls.get(value) {
                    self.symbol_types.insert(sym, ty);
                }
            }

            StmtKind::LetContent { body, .. } => {
                self.check_body(body);
            }

            StmtKind::If { arms, else_body } => {
                let mark = self.subs_mark();
                // Negative facts of each failed condition carry into every
                // later arm and the else body.
                for arm in arms {
                    self.check_expr(arm.cond);
                    let facts = self.condition_facts(arm.cond);

                    let arm_mark = self.subs_mark();
                    self.apply_facts(&facts.when_true);
                    self.check_body(&arm.body);
                    self.subs_restore(arm_mark);

                    self.apply_facts(&facts.when_false);
                }
                if let Some(body) = else_body {
                    self.check_body(body);
                }
                self.subs_restore(mark);
            }

            StmtKind::Switch {
                subject,
                cases,
                default,
            } => self.check_switch(*subject, cases, default.as_deref()),

            StmtKind::For {
                iterable, body, ..
            } => {
                let iterable_ty = self.check_expr(*iterable);
                if let Some(&sym) = self.resolved.decls.get(iterable) {
                    self.symbol_types.insert(sym, element_type(&iterable_ty));
                }
                // Facts proven outside do not hold across iterations.
                let saved = std::mem::take(&mut self.substitutions);
                self.check_body(body);
                self.substitutions = saved;
            }

            StmtKind::CallTemplate { args, .. } => {
                for arg in args {
                    self.check_expr(arg.value);
                }
            }
        }
    }

    fn check_switch(&mut self, subject: ExprId, cases: &[weft_ast::SwitchCase], default: Option<&[Stmt]>) {
        let subject_ty = self.check_expr(subject);
        let path = AccessPath::from_expr(self.arena, &self.resolved.resolutions, subject);

        let mut any_null_case = false;
        for case in cases {
            let mut has_null = false;
            let mut all_literal = !case.exprs.is_empty();
            for expr in &case.exprs {
                self.check_expr(*expr);
                match self.arena.kind(*expr) {
                    ExprKind::Null => has_null = true,
                    kind if kind.is_literal() => {}
                    _ => all_literal = false,
                }
            }
            any_null_case |= has_null;

            let mark = self.subs_mark();
            if let Some(path) = &path {
                let mut facts = Facts::new();
                if has_null {
                    facts.insert(path.clone(), subject_ty.try_keep_null());
                } else if all_literal {
                    facts.insert(path.clone(), subject_ty.try_remove_null());
                }
                self.apply_facts(&facts);
            }
            self.check_body(&case.body);
            self.subs_restore(mark);
        }

        if let Some(body) = default {
            let mark = self.subs_mark();
            if any_null_case {
                if let Some(path) = &path {
                    let mut facts = Facts::new();
                    facts.insert(path.clone(), subject_ty.try_remove_null());
                    self.apply_facts(&facts);
                }
            }
            self.check_body(body);
            self.subs_restore(mark);
        }
    }
}

/// Element type when iterating a value.
fn element_type(iterable: &Type) -> Type {
    match iterable.try_remove_null() {
        Type::List(elem) => *elem,
        Type::Unknown | Type::Any => Type::Unknown,
        Type::Union(members) => {
            Type::union(members.iter().map(element_type).collect())
        }
        _ => Type::Unknown,
    }
}
