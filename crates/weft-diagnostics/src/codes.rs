// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0200, E0310, ...) to titles and categories for
//! error display and machine output.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy)]
pub enum ErrorCategory {
    Resolution,
    Type,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Resolution => write!(f, "Resolution"),
            ErrorCategory::Type => write!(f, "Type"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Resolution errors (E02xx)
                "E0200" => ("undefined variable", Resolution),
                "E0201" => ("duplicate declaration", Resolution),

                // Type errors (E03xx)
                "E0300" => ("unbound name", Type),
                "E0310" => ("arity mismatch", Type),
                "E0311" => ("argument type mismatch", Type),
                "E0312" => ("no such field", Type),
                "E0313" => ("key type mismatch", Type),
                "E0314" => ("duplicate record key", Type),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_resolves() {
        let registry = ErrorCodeRegistry::default();
        for code in ["E0200", "E0201", "E0300", "E0310", "E0311", "E0312", "E0313", "E0314"] {
            assert!(registry.get(code).is_some(), "{code} missing");
        }
        assert!(registry.get("E9999").is_none());
    }
}
