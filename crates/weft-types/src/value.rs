// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compile-time constant values.
//!
//! These are the values of literal expressions, used by the simplifier for
//! constant folding and by function registry const-eval hooks.

use crate::types::Type;
use std::fmt;

/// A compile-time constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstVal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ConstVal {
    /// The intrinsic static type of this literal.
    pub fn type_of(&self) -> Type {
        match self {
            ConstVal::Null => Type::Null,
            ConstVal::Bool(_) => Type::Bool,
            ConstVal::Int(_) => Type::Int,
            ConstVal::Float(_) => Type::Float,
            ConstVal::Str(_) => Type::String,
        }
    }

    /// Truthiness under the template language's coercion rules.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConstVal::Null => false,
            ConstVal::Bool(b) => *b,
            ConstVal::Int(n) => *n != 0,
            ConstVal::Float(x) => *x != 0.0,
            ConstVal::Str(s) => !s.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConstVal::Null)
    }
}

impl fmt::Display for ConstVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstVal::Str(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other.coerce_to_string()),
        }
    }
}

impl ConstVal {
    /// Render as output text, the way a backend would print the value.
    pub fn coerce_to_string(&self) -> String {
        match self {
            ConstVal::Null => "null".to_string(),
            ConstVal::Bool(b) => b.to_string(),
            ConstVal::Int(n) => n.to_string(),
            ConstVal::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    format!("{:.1}", x)
                } else {
                    x.to_string()
                }
            }
            ConstVal::Str(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_typing() {
        assert_eq!(ConstVal::Null.type_of(), Type::Null);
        assert_eq!(ConstVal::Int(3).type_of(), Type::Int);
        assert_eq!(ConstVal::Str("x".into()).type_of(), Type::String);
    }

    #[test]
    fn truthiness() {
        assert!(!ConstVal::Null.is_truthy());
        assert!(!ConstVal::Int(0).is_truthy());
        assert!(ConstVal::Int(-1).is_truthy());
        assert!(!ConstVal::Str(String::new()).is_truthy());
        assert!(ConstVal::Str("a".into()).is_truthy());
    }

    #[test]
    fn string_coercion() {
        assert_eq!(ConstVal::Float(2.0).coerce_to_string(), "2.0");
        assert_eq!(ConstVal::Int(-210).coerce_to_string(), "-210");
    }
}
