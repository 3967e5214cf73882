// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression type inference.

use weft_ast::{BinOp, ExprId, ExprKind, Span, UnaryOp};
use weft_types::Type;

use super::TypeChecker;
use crate::errors::TypeError;
use crate::path::AccessPath;

impl<'a> TypeChecker<'a> {
    /// Infer and record the type of one expression.
    pub(crate) fn check_expr(&mut self, id: ExprId) -> Type {
        let ty = self.infer(id);
        self.node_types.insert(id, ty.clone());
        ty
    }

    fn infer(&mut self, id: ExprId) -> Type {
        let span = self.arena.span(id);
        match self.arena.kind(id).clone() {
            ExprKind::Null => Type::Null,
            ExprKind::Bool(_) => Type::Bool,
            ExprKind::Int(_) => Type::Int,
            ExprKind::Float(_) => Type::Float,
            ExprKind::Str(_) => Type::String,

            ExprKind::Var(_) => {
                let Some(sym) = self.resolved.symbol_of(id) else {
                    return Type::Unknown;
                };
                self.substitution(&AccessPath::root(sym))
                    .cloned()
                    .unwrap_or_else(|| self.symbol_type(sym))
            }

            ExprKind::Global(name) => match self.types.resolve_global(&name) {
                Some((ty, _)) => ty,
                None => {
                    self.errors.push(TypeError::UnboundName { name, span });
                    Type::Unknown
                }
            },

            ExprKind::Unary { op, operand } => {
                let operand_ty = self.check_expr(operand);
                match op {
                    UnaryOp::Neg => {
                        if matches!(operand_ty, Type::Unknown | Type::Any) {
                            Type::Unknown
                        } else if operand_ty.is_numeric() {
                            operand_ty.try_remove_null()
                        } else {
                            self.errors.push(TypeError::ArgumentTypeMismatch {
                                name: "-".to_string(),
                                position: 1,
                                expected: Type::union(vec![Type::Int, Type::Float]),
                                found: operand_ty,
                                span,
                            });
                            Type::Unknown
                        }
                    }
                    UnaryOp::Not => {
                        if self.legacy_truthiness && operand_ty != Type::Bool {
                            Type::Unknown
                        } else {
                            Type::Bool
                        }
                    }
                }
            }

            ExprKind::Binary { op, left, right } => self.infer_binary(op, left, right, span),

            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.check_expr(cond);
                let facts = self.condition_facts(cond);

                let mark = self.subs_mark();
                self.apply_facts(&facts.when_true);
                let then_ty = self.check_expr(then);
                self.subs_restore(mark);

                self.apply_facts(&facts.when_false);
                let else_ty = self.check_expr(otherwise);
                self.subs_restore(mark);

                Type::union(vec![then_ty, else_ty])
            }

            ExprKind::Call { name, args } => self.infer_call(&name, &args, span),

            ExprKind::ListLit(items) => {
                if items.is_empty() {
                    Type::List(Box::new(Type::Unknown))
                } else {
                    let elems = items.iter().map(|item| self.check_expr(*item)).collect();
                    Type::List(Box::new(Type::union(elems)))
                }
            }

            ExprKind::MapLit(pairs) => {
                if pairs.is_empty() {
                    Type::Map {
                        key: Box::new(Type::Unknown),
                        value: Box::new(Type::Unknown),
                    }
                } else {
                    let mut keys = Vec::with_capacity(pairs.len());
                    let mut values = Vec::with_capacity(pairs.len());
                    for (k, v) in &pairs {
                        keys.push(self.check_expr(*k));
                        values.push(self.check_expr(*v));
                    }
                    Type::Map {
                        key: Box::new(Type::union(keys)),
                        value: Box::new(Type::union(values)),
                    }
                }
            }

            ExprKind::RecordLit(fields) => {
                let mut record = std::collections::BTreeMap::new();
                for (name, value) in &fields {
                    let value_ty = self.check_expr(*value);
                    if record.insert(name.clone(), value_ty).is_some() {
                        self.errors.push(TypeError::RecordLiteralDuplicateKey {
                            key: name.clone(),
                            span,
                        });
                    }
                }
                Type::Record(record)
            }

            ExprKind::Field {
                base,
                field,
                null_safe,
            } => {
                let base_ty = self.check_expr(base);
                let receiver = if null_safe {
                    base_ty.try_remove_null()
                } else {
                    base_ty.clone()
                };
                let mut ty = match self.field_of(&receiver, &field) {
                    Some(ty) => ty,
                    None => {
                        self.errors.push(TypeError::FieldNotFound {
                            ty: receiver,
                            field,
                            span,
                        });
                        Type::Unknown
                    }
                };
                if null_safe && base_ty.is_nullable() {
                    ty = Type::union(vec![ty, Type::Null]);
                }
                self.narrowed(id, ty)
            }

            ExprKind::Index {
                base,
                index,
                null_safe,
            } => {
                let base_ty = self.check_expr(base);
                let index_ty = self.check_expr(index);
                let receiver = if null_safe {
                    base_ty.try_remove_null()
                } else {
                    base_ty.clone()
                };
                let mut ty = self.infer_index(&receiver, &index_ty, span);
                if null_safe && base_ty.is_nullable() {
                    ty = Type::union(vec![ty, Type::Null]);
                }
                self.narrowed(id, ty)
            }
        }
    }

    /// Substitute the narrowed type for this node's access path, if one is
    /// in force.
    fn narrowed(&self, id: ExprId, structural: Type) -> Type {
        AccessPath::from_expr(self.arena, &self.resolved.resolutions, id)
            .and_then(|path| self.substitution(&path).cloned())
            .unwrap_or(structural)
    }

    fn infer_binary(&mut self, op: BinOp, left: ExprId, right: ExprId, span: Span) -> Type {
        match op {
            BinOp::And | BinOp::Or => {
                let left_ty = self.check_expr(left);
                let facts = self.condition_facts(left);
                let mark = self.subs_mark();
                // The right operand only evaluates when `and` saw truth or
                // `or` saw falsehood.
                if op == BinOp::And {
                    self.apply_facts(&facts.when_true);
                } else {
                    self.apply_facts(&facts.when_false);
                }
                let right_ty = self.check_expr(right);
                self.subs_restore(mark);

                if self.legacy_truthiness
                    && (left_ty != Type::Bool || right_ty != Type::Bool)
                {
                    Type::Unknown
                } else {
                    Type::Bool
                }
            }

            BinOp::NullCoalesce => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);
                Type::union(vec![left_ty.try_remove_null(), right_ty])
            }

            BinOp::Add => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);
                match Type::plus(&left_ty, &right_ty) {
                    Some(ty) => ty,
                    None => {
                        self.operand_mismatch(op, &left_ty, &right_ty, span);
                        Type::Unknown
                    }
                }
            }

            _ if op.is_arithmetic() => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);
                match Type::arithmetic(&left_ty, &right_ty) {
                    Some(ty) => ty,
                    None => {
                        self.operand_mismatch(op, &left_ty, &right_ty, span);
                        Type::Unknown
                    }
                }
            }

            // Comparisons accept any operands and produce bool.
            _ => {
                self.check_expr(left);
                self.check_expr(right);
                Type::Bool
            }
        }
    }

    /// Report the non-numeric side of a failed arithmetic operator.
    fn operand_mismatch(&mut self, op: BinOp, left: &Type, right: &Type, span: Span) {
        let expected = Type::union(vec![Type::Int, Type::Float]);
        let (position, found) = if left.is_numeric() {
            (2, right.clone())
        } else {
            (1, left.clone())
        };
        self.errors.push(TypeError::ArgumentTypeMismatch {
            name: op.to_string(),
            position,
            expected,
            found,
            span,
        });
    }

    fn infer_call(&mut self, name: &str, args: &[ExprId], span: Span) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|arg| self.check_expr(*arg)).collect();

        let Some(sig) = self.functions.signature(name).cloned() else {
            self.errors.push(TypeError::UnboundName {
                name: name.to_string(),
                span,
            });
            return Type::Unknown;
        };

        if arg_types.len() != sig.params.len() {
            self.errors.push(TypeError::ArityMismatch {
                name: name.to_string(),
                expected: sig.params.len(),
                found: arg_types.len(),
                span,
            });
        }
        for (position, (expected, found)) in
            sig.params.iter().zip(arg_types.iter()).enumerate()
        {
            if !expected.is_assignable_from(found) {
                self.errors.push(TypeError::ArgumentTypeMismatch {
                    name: name.to_string(),
                    position: position + 1,
                    expected: expected.clone(),
                    found: found.clone(),
                    span,
                });
            }
        }
        sig.ret
    }

    /// Element type of an index access, distributing over union receivers.
    fn infer_index(&mut self, receiver: &Type, index_ty: &Type, span: Span) -> Type {
        match receiver {
            Type::Unknown | Type::Any => Type::Unknown,
            Type::List(elem) => {
                if !Type::Int.is_assignable_from(index_ty) {
                    self.errors.push(TypeError::KeyTypeMismatch {
                        ty: receiver.clone(),
                        expected: Type::Int,
                        found: index_ty.clone(),
                        span,
                    });
                    return Type::Unknown;
                }
                (**elem).clone()
            }
            Type::Map { key, value } => {
                if !key.is_assignable_from(index_ty) {
                    self.errors.push(TypeError::KeyTypeMismatch {
                        ty: receiver.clone(),
                        expected: (**key).clone(),
                        found: index_ty.clone(),
                        span,
                    });
                    return Type::Unknown;
                }
                (**value).clone()
            }
            Type::Union(members) => {
                let results = members
                    .iter()
                    .map(|member| self.infer_index(member, index_ty, span))
                    .collect();
                Type::union(results)
            }
            other => {
                self.errors.push(TypeError::KeyTypeMismatch {
                    ty: other.clone(),
                    expected: Type::Unknown,
                    found: index_ty.clone(),
                    span,
                });
                Type::Unknown
            }
        }
    }
}
