// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type definitions and the subtyping lattice.

use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a registered enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumId(pub u32);

/// A static type in the template language.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// The null type (the type of the `null` literal).
    Null,
    Bool,
    Int,
    Float,
    String,
    /// Top type for untyped/legacy data. Assignable from and to everything.
    Unknown,
    /// Union absorber: assignable from everything, but not to anything else.
    Any,
    /// List with a single element type.
    List(Box<Type>),
    /// Map with declared key and value types.
    Map { key: Box<Type>, value: Box<Type> },
    /// Record with a fixed field set.
    Record(BTreeMap<String, Type>),
    /// Union of several possible types. Canonical form: flattened,
    /// deduplicated, sorted by display name, never a singleton.
    Union(Vec<Type>),
    /// Registered named enum type.
    Enum { id: EnumId, name: String },
}

impl Type {
    /// Build a canonical union: flattened, deduplicated, sorted by display
    /// name. A single member collapses to that member. `Unknown` and `Any`
    /// absorb the rest.
    pub fn union(types: Vec<Type>) -> Type {
        let mut flat = Vec::new();
        for ty in types {
            match ty {
                Type::Union(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.iter().any(|t| matches!(t, Type::Unknown)) {
            return Type::Unknown;
        }
        if flat.iter().any(|t| matches!(t, Type::Any)) {
            return Type::Any;
        }
        flat.sort_by(|a, b| format!("{}", a).cmp(&format!("{}", b)));
        flat.dedup();
        match flat.len() {
            0 => Type::Unknown,
            1 => flat.into_iter().next().unwrap(),
            _ => Type::Union(flat),
        }
    }

    /// The subtyping predicate: can a value of type `source` be used where
    /// `self` is expected?
    pub fn is_assignable_from(&self, source: &Type) -> bool {
        // Unknown is the top type in both directions.
        if matches!(self, Type::Unknown) || matches!(source, Type::Unknown) {
            return true;
        }
        match (self, source) {
            (Type::Any, _) => true,
            (_, Type::Any) => false,
            (_, Type::Union(members)) => {
                members.iter().all(|m| self.is_assignable_from(m))
            }
            (Type::Union(members), _) => {
                members.iter().any(|m| m.is_assignable_from(source))
            }
            (Type::Float, Type::Int) => true,
            (Type::List(a), Type::List(b)) => a.is_assignable_from(b),
            (
                Type::Map { key: ka, value: va },
                Type::Map { key: kb, value: vb },
            ) => ka.is_assignable_from(kb) && va.is_assignable_from(vb),
            (Type::Record(want), Type::Record(have)) => want.iter().all(|(name, fty)| {
                have.get(name)
                    .map(|sty| fty.is_assignable_from(sty))
                    .unwrap_or(false)
            }),
            (Type::Enum { id: a, .. }, Type::Enum { id: b, .. }) => a == b,
            (a, b) => a == b,
        }
    }

    /// True if a value of this type may be null.
    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Null | Type::Unknown | Type::Any => true,
            Type::Union(members) => members.iter().any(|m| m.is_nullable()),
            _ => false,
        }
    }

    /// Remove `Null` from a union. A bare `Null` (or a type with no null
    /// member) is returned unchanged; `Unknown` stays `Unknown`.
    pub fn try_remove_null(&self) -> Type {
        match self {
            Type::Union(members) => Type::union(
                members
                    .iter()
                    .filter(|m| !matches!(m, Type::Null))
                    .cloned()
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Restrict to the null part of this type: `Null` if the type admits
    /// null, otherwise the type unchanged (nothing to keep).
    pub fn try_keep_null(&self) -> Type {
        if self.is_nullable() {
            Type::Null
        } else {
            self.clone()
        }
    }

    /// True for Int, Float, or a union of them (null excluded first).
    pub fn is_numeric(&self) -> bool {
        match self.try_remove_null() {
            Type::Int | Type::Float => true,
            Type::Union(members) => members.iter().all(|m| m.is_numeric()),
            _ => false,
        }
    }

    /// True if string concatenation accepts this operand.
    pub fn is_stringish(&self) -> bool {
        match self.try_remove_null() {
            Type::String => true,
            Type::Union(members) => members.iter().any(|m| m.is_stringish()),
            _ => false,
        }
    }

    /// Result type of an arithmetic operator over two operands, or None if
    /// the combination is invalid. Int stays Int only when both sides are
    /// Int; Unknown propagates.
    pub fn arithmetic(a: &Type, b: &Type) -> Option<Type> {
        let left = a.try_remove_null();
        let right = b.try_remove_null();
        let numeric_or_unknown =
            |t: &Type| t.is_numeric() || matches!(t, Type::Unknown | Type::Any);
        if !numeric_or_unknown(&left) || !numeric_or_unknown(&right) {
            return None;
        }
        if matches!(left, Type::Unknown | Type::Any) || matches!(right, Type::Unknown | Type::Any)
        {
            return Some(Type::Unknown);
        }
        if left == Type::Int && right == Type::Int {
            Some(Type::Int)
        } else {
            Some(Type::Float)
        }
    }

    /// Result type of the `+` operator: arithmetic when both sides are
    /// numeric, string concatenation when either side is stringish.
    pub fn plus(a: &Type, b: &Type) -> Option<Type> {
        if let Some(ty) = Type::arithmetic(a, b) {
            // unknown + string is concatenation, not arithmetic
            if ty == Type::Unknown && (a.is_stringish() || b.is_stringish()) {
                return Some(Type::String);
            }
            return Some(ty);
        }
        if a.is_stringish() || b.is_stringish() {
            Some(Type::String)
        } else {
            None
        }
    }

    /// The stricter of two types, when one is assignable from the other.
    pub fn stricter(a: &Type, b: &Type) -> Option<Type> {
        if a.is_assignable_from(b) {
            Some(b.clone())
        } else if b.is_assignable_from(a) {
            Some(a.clone())
        } else {
            None
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => write!(f, "null"),
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Unknown => write!(f, "?"),
            Type::Any => write!(f, "any"),
            Type::List(elem) => write!(f, "list<{}>", elem),
            Type::Map { key, value } => write!(f, "map<{}, {}>", key, value),
            Type::Record(fields) => {
                write!(f, "[")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, "]")
            }
            Type::Union(members) => {
                for (i, ty) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", ty)?;
                }
                Ok(())
            }
            Type::Enum { name, .. } => write!(f, "{}", name),
        }
    }
}
