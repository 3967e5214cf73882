// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The expression type resolution pass.
//!
//! Walks each template post-order, assigning a type to every expression node
//! and collecting errors without aborting. Narrowing facts from conditions
//! are installed as a stack of path substitutions; leaving the guarded region
//! truncates the stack back to its entry mark.

use std::collections::HashMap;

use weft_ast::{ExprArena, ExprId, TemplateFile};
use weft_resolve::{ResolvedFile, SymbolId, SymbolKind};
use weft_types::{FunctionRegistry, Type, TypeRegistry};

mod check_expr;
mod check_stmt;

use crate::errors::TypeError;
use crate::narrow::{ConditionFacts, Facts, Narrower};
use crate::path::{AccessPath, PathSeg};

/// Knobs for the type resolution pass.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Accept non-bool operands to `and`/`or`/`not`, typing the result as
    /// unknown instead of bool.
    pub legacy_truthiness: bool,
}

/// Types assigned by the pass.
#[derive(Debug, Default)]
pub struct TypedFile {
    pub node_types: HashMap<ExprId, Type>,
    pub symbol_types: HashMap<SymbolId, Type>,
}

pub(crate) struct TypeChecker<'a> {
    pub(crate) arena: &'a ExprArena,
    pub(crate) resolved: &'a ResolvedFile,
    pub(crate) types: &'a TypeRegistry,
    pub(crate) functions: &'a FunctionRegistry,
    pub(crate) legacy_truthiness: bool,
    pub(crate) node_types: HashMap<ExprId, Type>,
    pub(crate) symbol_types: HashMap<SymbolId, Type>,
    /// Narrowing substitutions, innermost last.
    substitutions: Vec<(AccessPath, Type)>,
    pub(crate) errors: Vec<TypeError>,
}

/// Resolve every expression type in a file. All errors are collected; an
/// offending subtree types as unknown and checking continues past it.
pub fn check_file(
    file: &TemplateFile,
    resolved: &ResolvedFile,
    types: &TypeRegistry,
    functions: &FunctionRegistry,
    options: &CheckOptions,
) -> Result<TypedFile, Vec<TypeError>> {
    let mut checker = TypeChecker {
        arena: &file.arena,
        resolved,
        types,
        functions,
        legacy_truthiness: options.legacy_truthiness,
        node_types: HashMap::new(),
        symbol_types: HashMap::new(),
        substitutions: Vec::new(),
        errors: Vec::new(),
    };

    for template in &file.templates {
        checker.check_template(template);
    }

    if checker.errors.is_empty() {
        Ok(TypedFile {
            node_types: checker.node_types,
            symbol_types: checker.symbol_types,
        })
    } else {
        Err(checker.errors)
    }
}

impl<'a> TypeChecker<'a> {
    /// The declared or inferred type of a symbol.
    pub(crate) fn symbol_type(&self, sym: SymbolId) -> Type {
        if let Some(ty) = self.symbol_types.get(&sym) {
            return ty.clone();
        }
        match self.resolved.symbols.get(sym).kind {
            SymbolKind::LetContent => Type::String,
            _ => Type::Unknown,
        }
    }

    pub(crate) fn condition_facts(&self, cond: ExprId) -> ConditionFacts {
        Narrower::new(self.arena, &self.resolved.resolutions, &self.node_types).condition(cond)
    }

    /// A mark into the substitution stack, for restoring on region exit.
    pub(crate) fn subs_mark(&self) -> usize {
        self.substitutions.len()
    }

    pub(crate) fn subs_restore(&mut self, mark: usize) {
        self.substitutions.truncate(mark);
    }

    /// The narrowed type currently in force for a path, if any.
    pub(crate) fn substitution(&self, path: &AccessPath) -> Option<&Type> {
        self.substitutions
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, ty)| ty)
    }

    /// Install a fact set as substitutions. Facts on a deeper path are kept
    /// only when every prefix of the path is known non-null at that point;
    /// anything else is dropped so narrowing can under-apply but never lie.
    pub(crate) fn apply_facts(&mut self, facts: &Facts) {
        let mut entries: Vec<(&AccessPath, &Type)> = facts.iter().collect();
        entries.sort_by_key(|(path, _)| path.segs.len());
        for (path, ty) in entries {
            if self.path_prefixes_sound(path) {
                self.substitutions.push((path.clone(), ty.clone()));
            }
        }
    }

    fn path_prefixes_sound(&self, path: &AccessPath) -> bool {
        path.proper_prefixes()
            .all(|prefix| match self.path_type(&prefix) {
                Some(ty) => !ty.is_nullable(),
                None => false,
            })
    }

    /// The effective type of an access path: the symbol's type stepped
    /// through each segment, with substitutions overriding at every prefix.
    pub(crate) fn path_type(&self, path: &AccessPath) -> Option<Type> {
        let mut prefix = AccessPath::root(path.base);
        let mut ty = self
            .substitution(&prefix)
            .cloned()
            .unwrap_or_else(|| self.symbol_type(path.base));
        for seg in &path.segs {
            ty = self.step(&ty, seg)?;
            prefix.segs.push(seg.clone());
            if let Some(narrowed) = self.substitution(&prefix) {
                ty = narrowed.clone();
            }
        }
        Some(ty)
    }

    /// Structural type of one access step, None when the receiver does not
    /// support it.
    fn step(&self, ty: &Type, seg: &PathSeg) -> Option<Type> {
        match seg {
            PathSeg::Field(name) => self.field_of(ty, name),
            PathSeg::IndexInt(_) => match ty {
                Type::Unknown | Type::Any => Some(Type::Unknown),
                Type::List(elem) => Some((**elem).clone()),
                Type::Map { key, value } if key.is_assignable_from(&Type::Int) => {
                    Some((**value).clone())
                }
                _ => None,
            },
            PathSeg::IndexStr(_) => match ty {
                Type::Unknown | Type::Any => Some(Type::Unknown),
                Type::Map { key, value } if key.is_assignable_from(&Type::String) => {
                    Some((**value).clone())
                }
                _ => None,
            },
        }
    }

    /// Field lookup, distributing over union receivers. Unknown receivers
    /// permit any field and yield unknown.
    pub(crate) fn field_of(&self, ty: &Type, field: &str) -> Option<Type> {
        match ty {
            Type::Unknown | Type::Any => Some(Type::Unknown),
            Type::Record(fields) => fields.get(field).cloned(),
            Type::Union(members) => {
                let mut results = Vec::with_capacity(members.len());
                for member in members {
                    results.push(self.field_of(member, field)?);
                }
                Some(Type::union(results))
            }
            _ => None,
        }
    }
}
