// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Condition analysis for data-flow type narrowing.
//!
//! Given a condition expression, compute two fact maps: what is known about
//! access paths when the condition is true, and when it is false. The checker
//! installs these as type substitutions while walking the guarded branches.
//!
//! Combinators follow De Morgan: for `a and b` the true-branch facts are the
//! merge of both sides (stricter wins on a shared path), and the false-branch
//! facts keep only paths both sides constrain, joined by union. `or` is the
//! dual, and `not` swaps the two maps.

use std::collections::{hash_map, HashMap};

use weft_ast::{BinOp, ExprArena, ExprId, ExprKind, UnaryOp};
use weft_resolve::SymbolId;
use weft_types::Type;

use crate::path::AccessPath;

/// Narrowed types keyed by access path.
#[derive(Debug, Clone, Default)]
pub struct Facts {
    map: HashMap<AccessPath, Type>,
}

impl Facts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, path: &AccessPath) -> Option<&Type> {
        self.map.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccessPath, &Type)> {
        self.map.iter()
    }

    /// Record a fact, keeping the stricter type if the path already has one.
    pub fn insert(&mut self, path: AccessPath, ty: Type) {
        match self.map.entry(path) {
            hash_map::Entry::Vacant(slot) => {
                slot.insert(ty);
            }
            hash_map::Entry::Occupied(mut slot) => {
                if let Some(stricter) = Type::stricter(slot.get(), &ty) {
                    slot.insert(stricter);
                }
            }
        }
    }

    /// Both fact sets hold: union of paths, stricter type on a shared path.
    pub fn both(mut a: Facts, b: Facts) -> Facts {
        for (path, ty) in b.map {
            a.insert(path, ty);
        }
        a
    }

    /// Either fact set holds: only paths constrained by both survive, with
    /// the union of the two constraints.
    pub fn either(a: Facts, b: Facts) -> Facts {
        let mut out = Facts::new();
        for (path, ty) in a.map {
            if let Some(other) = b.map.get(&path) {
                out.map
                    .insert(path, Type::union(vec![ty, other.clone()]));
            }
        }
        out
    }
}

/// Facts for the two outcomes of one condition.
#[derive(Debug, Clone, Default)]
pub struct ConditionFacts {
    pub when_true: Facts,
    pub when_false: Facts,
}

impl ConditionFacts {
    fn swapped(self) -> Self {
        Self {
            when_true: self.when_false,
            when_false: self.when_true,
        }
    }
}

/// Computes condition facts against already-resolved expression types.
pub struct Narrower<'a> {
    arena: &'a ExprArena,
    resolutions: &'a HashMap<ExprId, SymbolId>,
    node_types: &'a HashMap<ExprId, Type>,
}

impl<'a> Narrower<'a> {
    pub fn new(
        arena: &'a ExprArena,
        resolutions: &'a HashMap<ExprId, SymbolId>,
        node_types: &'a HashMap<ExprId, Type>,
    ) -> Self {
        Self {
            arena,
            resolutions,
            node_types,
        }
    }

    pub fn condition(&self, cond: ExprId) -> ConditionFacts {
        match self.arena.kind(cond) {
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.condition(*operand).swapped(),

            ExprKind::Binary {
                op: BinOp::And,
                left,
                right,
            } => {
                let l = self.condition(*left);
                let r = self.condition(*right);
                ConditionFacts {
                    when_true: Facts::both(l.when_true, r.when_true),
                    when_false: Facts::either(l.when_false, r.when_false),
                }
            }

            ExprKind::Binary {
                op: BinOp::Or,
                left,
                right,
            } => {
                let l = self.condition(*left);
                let r = self.condition(*right);
                ConditionFacts {
                    when_true: Facts::either(l.when_true, r.when_true),
                    when_false: Facts::both(l.when_false, r.when_false),
                }
            }

            ExprKind::Binary {
                op: op @ (BinOp::Eq | BinOp::NotEq),
                left,
                right,
            } => {
                let facts = if matches!(self.arena.kind(*right), ExprKind::Null) {
                    self.null_comparison(*left)
                } else if matches!(self.arena.kind(*left), ExprKind::Null) {
                    self.null_comparison(*right)
                } else {
                    ConditionFacts::default()
                };
                if *op == BinOp::Eq {
                    facts
                } else {
                    facts.swapped()
                }
            }

            // A bare expression used as a condition: truthiness rules out
            // null, but falseness proves nothing (false, 0 and '' are falsy
            // without being null).
            _ => {
                let mut when_true = Facts::new();
                self.narrow_chain(cond, &mut when_true);
                ConditionFacts {
                    when_true,
                    when_false: Facts::new(),
                }
            }
        }
    }

    /// Facts for `expr == null`.
    fn null_comparison(&self, expr: ExprId) -> ConditionFacts {
        let mut facts = ConditionFacts::default();
        if let Some(path) = self.path_of(expr) {
            facts
                .when_true
                .insert(path, self.current_type(expr).try_keep_null());
        }
        // Inequality with null also proves every null-safe base on the way
        // was non-null, which `narrow_chain` records.
        self.narrow_chain(expr, &mut facts.when_false);
        facts
    }

    /// Record that `expr` evaluated to a non-null value: its own path loses
    /// null, and so does the base of every null-safe step in the chain.
    fn narrow_chain(&self, expr: ExprId, facts: &mut Facts) {
        if let Some(path) = self.path_of(expr) {
            facts.insert(path, self.current_type(expr).try_remove_null());
        }
        if let ExprKind::Field {
            base, null_safe, ..
        }
        | ExprKind::Index {
            base, null_safe, ..
        } = self.arena.kind(expr)
        {
            if *null_safe {
                self.narrow_chain(*base, facts);
            }
        }
    }

    fn path_of(&self, expr: ExprId) -> Option<AccessPath> {
        AccessPath::from_expr(self.arena, self.resolutions, expr)
    }

    fn current_type(&self, expr: ExprId) -> Type {
        self.node_types
            .get(&expr)
            .cloned()
            .unwrap_or(Type::Unknown)
    }
}
