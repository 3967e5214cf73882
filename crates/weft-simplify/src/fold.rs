// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression constant folding over the arena.
//!
//! Folding a node allocates a replacement entry and returns its id; the
//! caller writes the new id into the parent's child slot. The folder never
//! raises errors: anything it cannot prove safe it leaves alone. Integer
//! arithmetic folds only when the checked operation succeeds, so overflow
//! and division by zero stay runtime concerns.

use weft_ast::{BinOp, ExprArena, ExprId, ExprKind, UnaryOp};
use weft_types::{ConstVal, FunctionRegistry};

pub(crate) struct Folder<'a> {
    pub arena: &'a mut ExprArena,
    pub functions: &'a FunctionRegistry,
    pub changed: bool,
}

impl<'a> Folder<'a> {
    pub fn new(arena: &'a mut ExprArena, functions: &'a FunctionRegistry) -> Self {
        Self {
            arena,
            functions,
            changed: false,
        }
    }

    /// Fold the subtree rooted at `id`, returning the id of the result.
    pub fn fold(&mut self, id: ExprId) -> ExprId {
        self.fold_children(id);
        match self.try_fold(id) {
            Some(folded) => {
                self.changed |= folded != id;
                folded
            }
            None => id,
        }
    }

    fn fold_children(&mut self, id: ExprId) {
        for child in self.arena.kind(id).children() {
            let folded = self.fold(child);
            if folded != child {
                self.replace_child(id, child, folded);
            }
        }
    }

    fn replace_child(&mut self, parent: ExprId, old: ExprId, new: ExprId) {
        let slot_eq = |slot: &mut ExprId| {
            if *slot == old {
                *slot = new;
            }
        };
        match &mut self.arena.get_mut(parent).kind {
            ExprKind::Unary { operand, .. } => slot_eq(operand),
            ExprKind::Binary { left, right, .. } => {
                slot_eq(left);
                slot_eq(right);
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                slot_eq(cond);
                slot_eq(then);
                slot_eq(otherwise);
            }
            ExprKind::Call { args, .. } => args.iter_mut().for_each(slot_eq),
            ExprKind::ListLit(items) => items.iter_mut().for_each(slot_eq),
            ExprKind::MapLit(entries) => {
                for (k, v) in entries.iter_mut() {
                    slot_eq(k);
                    slot_eq(v);
                }
            }
            ExprKind::RecordLit(fields) => {
                for (_, v) in fields.iter_mut() {
                    slot_eq(v);
                }
            }
            ExprKind::Field { base, .. } => slot_eq(base),
            ExprKind::Index { base, index, .. } => {
                slot_eq(base);
                slot_eq(index);
            }
            _ => {}
        }
    }

    /// The replacement for `id`, or None when nothing folds.
    fn try_fold(&mut self, id: ExprId) -> Option<ExprId> {
        let span = self.arena.span(id);
        match self.arena.kind(id).clone() {
            ExprKind::Unary { op, operand } => {
                let val = self.const_of(operand)?;
                let result = match (op, val) {
                    (UnaryOp::Neg, ConstVal::Int(n)) => ConstVal::Int(n.checked_neg()?),
                    (UnaryOp::Neg, ConstVal::Float(f)) => ConstVal::Float(-f),
                    (UnaryOp::Not, ConstVal::Bool(b)) => ConstVal::Bool(!b),
                    _ => return None,
                };
                Some(self.literal(result, span))
            }

            ExprKind::Binary { op, left, right } => {
                self.fold_binary(op, left, right, span)
            }

            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                let val = self.const_of(cond)?;
                Some(if val.is_truthy() { then } else { otherwise })
            }

            ExprKind::Call { name, args } => {
                if !self.functions.is_pure(&name) {
                    return None;
                }
                let eval = self.functions.get(&name)?.eval?;
                let values: Option<Vec<ConstVal>> =
                    args.iter().map(|arg| self.const_of(*arg)).collect();
                let result = eval(&values?)?;
                Some(self.literal(result, span))
            }

            ExprKind::Field {
                base,
                field,
                null_safe,
            } => {
                if null_safe && matches!(self.arena.kind(base), ExprKind::Null) {
                    return Some(self.alloc(ExprKind::Null, span));
                }
                if let ExprKind::RecordLit(fields) = self.arena.kind(base) {
                    // later duplicates shadow earlier ones
                    return fields
                        .iter()
                        .rev()
                        .find(|(name, _)| *name == field)
                        .map(|(_, value)| *value);
                }
                None
            }

            ExprKind::Index {
                base,
                index,
                null_safe,
            } => {
                if null_safe && matches!(self.arena.kind(base), ExprKind::Null) {
                    return Some(self.alloc(ExprKind::Null, span));
                }
                let key = self.const_of(index)?;
                match self.arena.kind(base) {
                    ExprKind::ListLit(items) => {
                        let ConstVal::Int(n) = key else { return None };
                        usize::try_from(n).ok().and_then(|n| items.get(n)).copied()
                    }
                    ExprKind::MapLit(entries) => self.map_lookup(entries.clone(), &key),
                    _ => None,
                }
            }

            _ => None,
        }
    }

    fn fold_binary(
        &mut self,
        op: BinOp,
        left: ExprId,
        right: ExprId,
        span: weft_ast::Span,
    ) -> Option<ExprId> {
        // Short-circuit operators fold on the left side alone.
        match op {
            BinOp::And => {
                let l = self.const_of(left)?;
                return Some(if l.is_truthy() { right } else { left });
            }
            BinOp::Or => {
                let l = self.const_of(left)?;
                return Some(if l.is_truthy() { left } else { right });
            }
            BinOp::NullCoalesce => {
                let l = self.const_of(left)?;
                return Some(if l.is_null() { right } else { left });
            }
            _ => {}
        }

        let l = self.const_of(left)?;
        let r = self.const_of(right)?;
        let result = match op {
            BinOp::Add => fold_plus(&l, &r)?,
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => fold_arithmetic(op, &l, &r)?,
            BinOp::Eq => ConstVal::Bool(const_eq(&l, &r)?),
            BinOp::NotEq => ConstVal::Bool(!const_eq(&l, &r)?),
            BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
                ConstVal::Bool(fold_ordering(op, &l, &r)?)
            }
            BinOp::And | BinOp::Or | BinOp::NullCoalesce => unreachable!(),
        };
        Some(self.literal(result, span))
    }

    fn map_lookup(&self, entries: Vec<(ExprId, ExprId)>, key: &ConstVal) -> Option<ExprId> {
        // every key must be constant, or a later entry might alias `key`
        let mut found = None;
        for (k, v) in entries {
            let k = self.const_of(k)?;
            if const_eq(&k, key) == Some(true) {
                found = Some(v);
            }
        }
        found
    }

    pub fn const_of(&self, id: ExprId) -> Option<ConstVal> {
        const_of(self.arena, id)
    }

    fn literal(&mut self, val: ConstVal, span: weft_ast::Span) -> ExprId {
        let kind = match val {
            ConstVal::Null => ExprKind::Null,
            ConstVal::Bool(b) => ExprKind::Bool(b),
            ConstVal::Int(n) => ExprKind::Int(n),
            ConstVal::Float(f) => ExprKind::Float(f),
            ConstVal::Str(s) => ExprKind::Str(s),
        };
        self.alloc(kind, span)
    }

    fn alloc(&mut self, kind: ExprKind, span: weft_ast::Span) -> ExprId {
        self.arena.alloc(kind, span)
    }
}

/// The constant value of a literal leaf node.
pub(crate) fn const_of(arena: &ExprArena, id: ExprId) -> Option<ConstVal> {
    match arena.kind(id) {
        ExprKind::Null => Some(ConstVal::Null),
        ExprKind::Bool(b) => Some(ConstVal::Bool(*b)),
        ExprKind::Int(n) => Some(ConstVal::Int(*n)),
        ExprKind::Float(f) => Some(ConstVal::Float(*f)),
        ExprKind::Str(s) => Some(ConstVal::Str(s.clone())),
        _ => None,
    }
}

/// `+` over constants: numeric addition, or string concatenation when either
/// side is a string.
fn fold_plus(l: &ConstVal, r: &ConstVal) -> Option<ConstVal> {
    if matches!(l, ConstVal::Str(_)) || matches!(r, ConstVal::Str(_)) {
        if matches!(l, ConstVal::Null) || matches!(r, ConstVal::Null) {
            return None;
        }
        return Some(ConstVal::Str(format!(
            "{}{}",
            l.coerce_to_string(),
            r.coerce_to_string()
        )));
    }
    fold_arithmetic(BinOp::Add, l, r)
}

fn fold_arithmetic(op: BinOp, l: &ConstVal, r: &ConstVal) -> Option<ConstVal> {
    match (l, r) {
        (ConstVal::Int(a), ConstVal::Int(b)) => {
            let result = match op {
                BinOp::Add => a.checked_add(*b),
                BinOp::Sub => a.checked_sub(*b),
                BinOp::Mul => a.checked_mul(*b),
                BinOp::Div => a.checked_div(*b),
                BinOp::Mod => a.checked_rem(*b),
                _ => None,
            };
            result.map(ConstVal::Int)
        }
        (ConstVal::Float(a), ConstVal::Float(b)) => {
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
                _ => return None,
            };
            Some(ConstVal::Float(result))
        }
        // mixed or non-numeric operands stay unfolded
        _ => None,
    }
}

/// Structural equality of two constants, None when the comparison would be
/// questionable (cross-type except null checks).
pub(crate) fn const_eq(l: &ConstVal, r: &ConstVal) -> Option<bool> {
    match (l, r) {
        (ConstVal::Null, ConstVal::Null) => Some(true),
        (ConstVal::Null, _) | (_, ConstVal::Null) => Some(false),
        (ConstVal::Bool(a), ConstVal::Bool(b)) => Some(a == b),
        (ConstVal::Int(a), ConstVal::Int(b)) => Some(a == b),
        (ConstVal::Float(a), ConstVal::Float(b)) => Some(a == b),
        (ConstVal::Int(a), ConstVal::Float(b)) | (ConstVal::Float(b), ConstVal::Int(a)) => {
            Some(*a as f64 == *b)
        }
        (ConstVal::Str(a), ConstVal::Str(b)) => Some(a == b),
        _ => None,
    }
}

fn fold_ordering(op: BinOp, l: &ConstVal, r: &ConstVal) -> Option<bool> {
    let (a, b) = match (l, r) {
        (ConstVal::Int(a), ConstVal::Int(b)) => (*a as f64, *b as f64),
        (ConstVal::Float(a), ConstVal::Float(b)) => (*a, *b),
        (ConstVal::Int(a), ConstVal::Float(b)) => (*a as f64, *b),
        (ConstVal::Float(a), ConstVal::Int(b)) => (*a, *b as f64),
        _ => return None,
    };
    match op {
        BinOp::Lt => Some(a < b),
        BinOp::Lte => Some(a <= b),
        BinOp::Gt => Some(a > b),
        BinOp::Gte => Some(a >= b),
        _ => None,
    }
}
