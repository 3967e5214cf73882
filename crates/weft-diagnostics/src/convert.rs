// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from pass error types to `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};

impl ToDiagnostic for weft_resolve::ResolveError {
    fn to_diagnostic(&self) -> Diagnostic {
        use weft_resolve::ResolveErrorKind::*;

        match &self.kind {
            UndefinedVariable { name } => {
                Diagnostic::error(format!("undefined variable: `${name}`"))
                    .with_code("E0200")
                    .with_primary(self.span, "not declared in any enclosing scope")
                    .with_help(format!("declare `${name}` with a param or let before this use"))
            }

            DuplicateDeclaration { name, previous } => {
                Diagnostic::error(format!("variable `${name}` is already declared"))
                    .with_code("E0201")
                    .with_primary(self.span, "redeclared here")
                    .with_secondary(*previous, "previous declaration")
                    .with_note("a name stays live until its scope closes and cannot be shadowed")
            }
        }
    }
}

impl ToDiagnostic for weft_typeck::TypeError {
    fn to_diagnostic(&self) -> Diagnostic {
        use weft_typeck::TypeError::*;

        match self {
            ArityMismatch {
                name,
                expected,
                found,
                span,
            } => Diagnostic::error(format!(
                "`{name}` expects {expected} argument(s), found {found}"
            ))
            .with_code("E0310")
            .with_primary(*span, "in this call"),

            ArgumentTypeMismatch {
                name,
                position,
                expected,
                found,
                span,
            } => Diagnostic::error(format!(
                "argument {position} of `{name}` expects `{expected}`, found `{found}`"
            ))
            .with_code("E0311")
            .with_primary(*span, format!("this argument is `{found}`")),

            FieldNotFound { ty, field, span } => {
                Diagnostic::error(format!("no field `{field}` on type `{ty}`"))
                    .with_code("E0312")
                    .with_primary(*span, "unknown field")
            }

            KeyTypeMismatch {
                ty,
                expected,
                found,
                span,
            } => Diagnostic::error(format!(
                "cannot index `{ty}` with a key of type `{found}`"
            ))
            .with_code("E0313")
            .with_primary(*span, format!("expected a `{expected}` key")),

            UnboundName { name, span } => Diagnostic::error(format!("unbound name: `{name}`"))
                .with_code("E0300")
                .with_primary(*span, "not registered")
                .with_help("functions and enum types must be registered before compilation"),

            RecordLiteralDuplicateKey { key, span } => {
                Diagnostic::error(format!("duplicate record key `{key}`"))
                    .with_code("E0314")
                    .with_primary(*span, "key given more than once")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ast::Span;

    #[test]
    fn resolve_error_converts_with_both_labels() {
        let err = weft_resolve::ResolveError::duplicate(
            "x".into(),
            Span::new(10, 12),
            Span::new(2, 4),
        );
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_ref().unwrap().0, "E0201");
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.primary_span(), Some(Span::new(10, 12)));
    }

    #[test]
    fn type_error_converts_with_code() {
        let err = weft_typeck::TypeError::ArityMismatch {
            name: "strlen".into(),
            expected: 1,
            found: 2,
            span: Span::new(0, 6),
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_ref().unwrap().0, "E0310");
        assert!(diag.message.contains("strlen"));
    }
}
