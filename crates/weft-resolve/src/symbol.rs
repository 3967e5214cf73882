// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol definitions and the symbol table.

use weft_ast::{Span, TypeExpr};

/// Unique identifier for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// The kind of declaration a symbol came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// A template header parameter.
    Param,
    /// An injected (@inject) parameter.
    InjectedParam,
    /// A {let $x: expr /} value binding.
    LetValue,
    /// A {let $x}...{/let} content binding.
    LetContent,
    /// A loop iteration variable.
    LoopVar,
    /// Synthetic placeholder created after an undefined-variable error so
    /// sibling references keep resolving.
    Undeclared,
}

/// Companion storage slots for a loop variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopAux {
    /// Slot holding the current iteration index.
    pub index_slot: u32,
    /// Slot holding the "is last iteration" flag.
    pub is_last_slot: u32,
}

/// A declared variable.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type annotation (parameters only).
    pub declared_ty: Option<TypeExpr>,
    /// Local-variable storage slot. Placeholder symbols have none.
    pub slot: Option<u32>,
    /// Index/is-last companion slots (loop variables only).
    pub aux: Option<LoopAux>,
    /// Where this symbol was declared.
    pub span: Span,
}

/// Table of all symbols declared while resolving one file.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
        }
    }

    /// Insert a new symbol and return its id.
    pub fn insert(
        &mut self,
        name: String,
        kind: SymbolKind,
        declared_ty: Option<TypeExpr>,
        slot: Option<u32>,
        aux: Option<LoopAux>,
        span: Span,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name,
            kind,
            declared_ty,
            slot,
            aux,
            span,
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
