// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolution error types.

use thiserror::Error;
use weft_ast::Span;

/// A name resolution error.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
}

impl ResolveError {
    pub fn undefined(name: String, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::UndefinedVariable { name },
            span,
        }
    }

    pub fn duplicate(name: String, span: Span, previous: Span) -> Self {
        Self {
            kind: ResolveErrorKind::DuplicateDeclaration { name, previous },
            span,
        }
    }
}

/// The kind of resolution error.
#[derive(Debug, Clone, Error)]
pub enum ResolveErrorKind {
    #[error("undefined variable: ${name}")]
    UndefinedVariable { name: String },

    #[error("variable ${name} already declared (previous declaration at {previous:?})")]
    DuplicateDeclaration { name: String, previous: Span },
}
