// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type checker error types.

use weft_ast::Span;
use weft_types::Type;

/// A type error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("{name} expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("argument {position} of {name} expects {expected}, found {found}")]
    ArgumentTypeMismatch {
        name: String,
        /// 1-based argument position.
        position: usize,
        expected: Type,
        found: Type,
        span: Span,
    },
    #[error("no field '{field}' on type {ty}")]
    FieldNotFound { ty: Type, field: String, span: Span },
    #[error("cannot index {ty} with key of type {found}, expected {expected}")]
    KeyTypeMismatch {
        ty: Type,
        expected: Type,
        found: Type,
        span: Span,
    },
    #[error("unbound name: {name}")]
    UnboundName { name: String, span: Span },
    #[error("duplicate record key '{key}'")]
    RecordLiteralDuplicateKey { key: String, span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::ArityMismatch { span, .. }
            | TypeError::ArgumentTypeMismatch { span, .. }
            | TypeError::FieldNotFound { span, .. }
            | TypeError::KeyTypeMismatch { span, .. }
            | TypeError::UnboundName { span, .. }
            | TypeError::RecordLiteralDuplicateKey { span, .. } => *span,
        }
    }
}
