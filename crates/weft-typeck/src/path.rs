// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Normalized access paths for data-flow narrowing.
//!
//! A narrowing fact applies to a concrete chain of accesses rooted at a
//! resolved variable, like `$r.user.name` or `$m['key']`. Two syntactically
//! distinct expressions that denote the same chain normalize to equal paths,
//! so a fact learned from one applies to the other. Chains involving computed
//! keys do not normalize and are never narrowed.

use std::collections::HashMap;

use weft_ast::{ExprArena, ExprId, ExprKind};
use weft_resolve::SymbolId;

/// One step of an access chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSeg {
    Field(String),
    IndexInt(i64),
    IndexStr(String),
}

/// A normalized access chain: a root symbol plus zero or more constant steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessPath {
    pub base: SymbolId,
    pub segs: Vec<PathSeg>,
}

impl AccessPath {
    pub fn root(base: SymbolId) -> Self {
        Self {
            base,
            segs: Vec::new(),
        }
    }

    /// Normalize an expression into a path, if it is a chain of field or
    /// constant-index accesses over a resolved variable.
    pub fn from_expr(
        arena: &ExprArena,
        resolutions: &HashMap<ExprId, SymbolId>,
        id: ExprId,
    ) -> Option<AccessPath> {
        match arena.kind(id) {
            ExprKind::Var(_) => {
                let sym = *resolutions.get(&id)?;
                Some(AccessPath::root(sym))
            }
            ExprKind::Field { base, field, .. } => {
                let mut path = AccessPath::from_expr(arena, resolutions, *base)?;
                path.segs.push(PathSeg::Field(field.clone()));
                Some(path)
            }
            ExprKind::Index { base, index, .. } => {
                let seg = match arena.kind(*index) {
                    ExprKind::Int(n) => PathSeg::IndexInt(*n),
                    ExprKind::Str(s) => PathSeg::IndexStr(s.clone()),
                    _ => return None,
                };
                let mut path = AccessPath::from_expr(arena, resolutions, *base)?;
                path.segs.push(seg);
                Some(path)
            }
            _ => None,
        }
    }

    /// Proper prefixes, shortest first, ending just before the full path.
    pub fn proper_prefixes(&self) -> impl Iterator<Item = AccessPath> + '_ {
        (0..self.segs.len()).map(move |n| AccessPath {
            base: self.base,
            segs: self.segs[..n].to_vec(),
        })
    }
}
