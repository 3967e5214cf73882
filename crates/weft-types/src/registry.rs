// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type and function registries.
//!
//! Both registries are built once at compiler-configuration time and passed
//! by reference into every compilation. They are read-only during passes, so
//! independent files can be compiled concurrently against the same registry.

use crate::types::{EnumId, Type};
use crate::value::ConstVal;
use std::collections::HashMap;
use weft_ast::TypeExpr;

/// A registered named enum type with its member→ordinal mapping.
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<String>,
}

impl EnumDef {
    pub fn ordinal(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }
}

/// Registry of declared named types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    enums: Vec<EnumDef>,
    by_name: HashMap<String, EnumId>,
}

/// A named type reference that the registry does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTypeName(pub String);

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enum. Later registrations of the same name win, matching
    /// config-file override order.
    pub fn register_enum(
        &mut self,
        name: impl Into<String>,
        members: Vec<String>,
    ) -> EnumId {
        let name = name.into();
        let id = EnumId(self.enums.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.enums.push(EnumDef { name, members });
        id
    }

    pub fn enum_def(&self, id: EnumId) -> &EnumDef {
        &self.enums[id.0 as usize]
    }

    pub fn enum_by_name(&self, name: &str) -> Option<EnumId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a dotted global reference like `Color.RED` to its enum type
    /// and member ordinal.
    pub fn resolve_global(&self, dotted: &str) -> Option<(Type, i64)> {
        let (enum_name, member) = dotted.rsplit_once('.')?;
        let id = self.enum_by_name(enum_name)?;
        let def = self.enum_def(id);
        let ordinal = def.ordinal(member)?;
        let ty = Type::Enum {
            id,
            name: def.name.clone(),
        };
        Some((ty, ordinal as i64))
    }

    /// Convert a declared type expression to a lattice type.
    pub fn resolve_type(&self, expr: &TypeExpr) -> Result<Type, UnknownTypeName> {
        Ok(match expr {
            TypeExpr::Bool => Type::Bool,
            TypeExpr::Int => Type::Int,
            TypeExpr::Float => Type::Float,
            TypeExpr::String => Type::String,
            TypeExpr::Null => Type::Null,
            TypeExpr::Unknown => Type::Unknown,
            TypeExpr::Any => Type::Any,
            TypeExpr::List(elem) => Type::List(Box::new(self.resolve_type(elem)?)),
            TypeExpr::Map(key, value) => Type::Map {
                key: Box::new(self.resolve_type(key)?),
                value: Box::new(self.resolve_type(value)?),
            },
            TypeExpr::Record(fields) => Type::Record(
                fields
                    .iter()
                    .map(|(name, ty)| Ok((name.clone(), self.resolve_type(ty)?)))
                    .collect::<Result<_, UnknownTypeName>>()?,
            ),
            TypeExpr::Union(members) => Type::union(
                members
                    .iter()
                    .map(|m| self.resolve_type(m))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            TypeExpr::Named(name) => {
                let id = self
                    .enum_by_name(name)
                    .ok_or_else(|| UnknownTypeName(name.clone()))?;
                Type::Enum {
                    id,
                    name: self.enum_def(id).name.clone(),
                }
            }
        })
    }
}

/// Hook evaluating a pure function over constant arguments. Returning `None`
/// means "cannot evaluate at compile time"; the call is left unfolded.
pub type ConstEvalFn = fn(&[ConstVal]) -> Option<ConstVal>;

/// The declared signature of a plugin function.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Type>,
    pub ret: Type,
    /// Pure functions are deterministic and effect-free; only they may be
    /// constant-folded.
    pub pure: bool,
}

#[derive(Debug, Clone)]
pub struct FunctionEntry {
    pub sig: FunctionSignature,
    pub eval: Option<ConstEvalFn>,
}

/// Registry of plugin function signatures, keyed by name.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    fns: HashMap<String, FunctionEntry>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sig: FunctionSignature) {
        self.fns
            .insert(sig.name.clone(), FunctionEntry { sig, eval: None });
    }

    pub fn register_with_eval(&mut self, sig: FunctionSignature, eval: ConstEvalFn) {
        self.fns.insert(
            sig.name.clone(),
            FunctionEntry {
                sig,
                eval: Some(eval),
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.fns.get(name)
    }

    pub fn signature(&self, name: &str) -> Option<&FunctionSignature> {
        self.fns.get(name).map(|e| &e.sig)
    }

    /// The per-function purity predicate. Unknown functions are impure.
    pub fn is_pure(&self, name: &str) -> bool {
        self.fns.get(name).map(|e| e.sig.pure).unwrap_or(false)
    }
}
