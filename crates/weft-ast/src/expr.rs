// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression nodes and the per-file expression arena.
//!
//! Expressions live in an [`ExprArena`] and refer to each other through
//! stable [`ExprId`] indices. Rewriting passes replace a node by allocating
//! a new entry and pointing the parent's child slot at it; entries are never
//! removed, so ids held elsewhere (resolution maps, type maps) stay valid.

use crate::Span;
use std::fmt;

/// Stable index of an expression node within its file's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExprId(pub u32);

/// An expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Null literal
    Null,
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal
    Str(String),
    /// Local variable reference ($name)
    Var(String),
    /// Dotted external reference (enum members, globals)
    Global(String),
    /// Unary operation
    Unary { op: UnaryOp, operand: ExprId },
    /// Binary operation
    Binary {
        op: BinOp,
        left: ExprId,
        right: ExprId,
    },
    /// Ternary conditional (cond ? then : otherwise)
    Conditional {
        cond: ExprId,
        then: ExprId,
        otherwise: ExprId,
    },
    /// Function call (plugin functions, resolved via the function registry)
    Call { name: String, args: Vec<ExprId> },
    /// List literal
    ListLit(Vec<ExprId>),
    /// Map literal (key/value pairs)
    MapLit(Vec<(ExprId, ExprId)>),
    /// Record literal (named fields)
    RecordLit(Vec<(String, ExprId)>),
    /// Field access (base.field or base?.field)
    Field {
        base: ExprId,
        field: String,
        null_safe: bool,
    },
    /// Index access (base[index] or base?[index])
    Index {
        base: ExprId,
        index: ExprId,
        null_safe: bool,
    },
}

impl ExprKind {
    /// True for literal leaves (null, bool, int, float, string).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Null
                | ExprKind::Bool(_)
                | ExprKind::Int(_)
                | ExprKind::Float(_)
                | ExprKind::Str(_)
        )
    }

    /// Child expression ids, in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Var(_)
            | ExprKind::Global(_) => Vec::new(),
            ExprKind::Unary { operand, .. } => vec![*operand],
            ExprKind::Binary { left, right, .. } => vec![*left, *right],
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => vec![*cond, *then, *otherwise],
            ExprKind::Call { args, .. } => args.clone(),
            ExprKind::ListLit(items) => items.clone(),
            ExprKind::MapLit(entries) => {
                entries.iter().flat_map(|(k, v)| [*k, *v]).collect()
            }
            ExprKind::RecordLit(fields) => fields.iter().map(|(_, v)| *v).collect(),
            ExprKind::Field { base, .. } => vec![*base],
            ExprKind::Index { base, index, .. } => vec![*base, *index],
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    NotEq,
    And,
    Or,
    /// Null coalescing (a ?? b)
    NullCoalesce,
}

impl BinOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte | BinOp::Eq | BinOp::NotEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::NullCoalesce => "??",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

/// Arena of expression nodes for one template file.
#[derive(Debug, Clone, Default)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a new node and return its id.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(Expr { kind, span });
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.nodes[id.0 as usize]
    }

    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get(id).kind
    }

    pub fn span(&self, id: ExprId) -> Span {
        self.get(id).span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deep-copy the subtree rooted at `id`, returning the new root.
    pub fn deep_copy(&mut self, id: ExprId) -> ExprId {
        let Expr { kind, span } = self.get(id).clone();
        let kind = match kind {
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: self.deep_copy(operand),
            },
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op,
                left: self.deep_copy(left),
                right: self.deep_copy(right),
            },
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => ExprKind::Conditional {
                cond: self.deep_copy(cond),
                then: self.deep_copy(then),
                otherwise: self.deep_copy(otherwise),
            },
            ExprKind::Call { name, args } => ExprKind::Call {
                name,
                args: args.into_iter().map(|a| self.deep_copy(a)).collect(),
            },
            ExprKind::ListLit(items) => {
                ExprKind::ListLit(items.into_iter().map(|i| self.deep_copy(i)).collect())
            }
            ExprKind::MapLit(entries) => ExprKind::MapLit(
                entries
                    .into_iter()
                    .map(|(k, v)| (self.deep_copy(k), self.deep_copy(v)))
                    .collect(),
            ),
            ExprKind::RecordLit(fields) => ExprKind::RecordLit(
                fields
                    .into_iter()
                    .map(|(n, v)| (n, self.deep_copy(v)))
                    .collect(),
            ),
            ExprKind::Field {
                base,
                field,
                null_safe,
            } => ExprKind::Field {
                base: self.deep_copy(base),
                field,
                null_safe,
            },
            ExprKind::Index {
                base,
                index,
                null_safe,
            } => ExprKind::Index {
                base: self.deep_copy(base),
                index: self.deep_copy(index),
                null_safe,
            },
            leaf => leaf,
        };
        self.alloc(kind, span)
    }

    /// Visit `id` and every transitive child, pre-order.
    pub fn walk(&self, id: ExprId, f: &mut impl FnMut(ExprId, &Expr)) {
        let expr = self.get(id);
        f(id, expr);
        for child in expr.kind.children() {
            self.walk(child, f);
        }
    }
}
