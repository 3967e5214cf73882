// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Name resolution for template files.
//!
//! Resolution links every `$variable` reference to the symbol it names,
//! assigns each binding a local-variable storage slot, and computes the slot
//! count for each template. Errors are collected rather than aborting the
//! pass, so a file with one bad reference still yields a usable symbol table
//! for everything else.

pub mod error;
pub mod resolver;
pub mod scope;
pub mod symbol;

pub use error::{ResolveError, ResolveErrorKind};
pub use resolver::{resolve_file, ResolvedFile};
pub use scope::{FrameKind, ScopeStack};
pub use symbol::{LoopAux, Symbol, SymbolId, SymbolKind, SymbolTable};
