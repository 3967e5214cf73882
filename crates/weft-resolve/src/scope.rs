// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexical scope stack with local-variable slot allocation.
//!
//! Each frame corresponds to one lexical block. Declaring a variable claims
//! the lowest free slot; closing a frame returns its slots to the free pool
//! so sibling scopes can reuse them. A loop variable's slots (value, index,
//! is-last) belong to the loop frame itself and stay reserved until the loop
//! construct closes, not just one body block.

use crate::error::ResolveError;
use crate::symbol::{LoopAux, SymbolId, SymbolKind, SymbolTable};
use weft_ast::{Span, TypeExpr};

/// The kind of lexical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Template root (parameters live here).
    Template,
    /// Plain block (if arm, switch case, let-content body).
    Block,
    /// Loop construct frame holding the iteration variable.
    Loop,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    bindings: Vec<(String, SymbolId)>,
    /// Slots to release when this frame closes.
    owned_slots: Vec<u32>,
}

/// Stack of open scopes for one template.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    free_slots: Vec<u32>,
    high_water: u32,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            free_slots: Vec::new(),
            high_water: 0,
        }
    }

    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            bindings: Vec::new(),
            owned_slots: Vec::new(),
        });
    }

    pub fn pop(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.free_slots.extend(frame.owned_slots);
        }
    }

    fn alloc_slot(&mut self) -> u32 {
        if let Some(pos) = self
            .free_slots
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| **slot)
            .map(|(pos, _)| pos)
        {
            self.free_slots.swap_remove(pos)
        } else {
            let slot = self.high_water;
            self.high_water += 1;
            slot
        }
    }

    /// Highest slot count seen so far (the template's frame size).
    pub fn high_water(&self) -> u32 {
        self.high_water
    }

    /// Look up a name, walking enclosing frames outward.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        for frame in self.frames.iter().rev() {
            if let Some((_, sym)) = frame.bindings.iter().find(|(n, _)| n == name) {
                return Some(*sym);
            }
        }
        None
    }

    /// Declare a variable in the innermost frame. Fails if the name is
    /// already live in *any* open frame: shadowing at overlapping lifetime
    /// is rejected. A placeholder binding does not count as live.
    pub fn declare(
        &mut self,
        symbols: &mut SymbolTable,
        name: &str,
        kind: SymbolKind,
        declared_ty: Option<TypeExpr>,
        span: Span,
    ) -> Result<SymbolId, ResolveError> {
        if let Some(existing) = self.lookup(name) {
            if symbols.get(existing).kind != SymbolKind::Undeclared {
                let previous = symbols.get(existing).span;
                return Err(ResolveError::duplicate(name.to_string(), span, previous));
            }
            // A placeholder left by an undefined use must not block the real
            // declaration; unbind it so the new symbol wins lookups.
            self.remove_binding(existing);
        }

        let slot = self.alloc_slot();
        let aux = if kind == SymbolKind::LoopVar {
            Some(LoopAux {
                index_slot: self.alloc_slot(),
                is_last_slot: self.alloc_slot(),
            })
        } else {
            None
        };

        let sym = symbols.insert(name.to_string(), kind, declared_ty, Some(slot), aux, span);
        let frame = self
            .frames
            .last_mut()
            .expect("declare called with no open scope");
        frame.bindings.push((name.to_string(), sym));
        frame.owned_slots.push(slot);
        if let Some(aux) = aux {
            frame.owned_slots.push(aux.index_slot);
            frame.owned_slots.push(aux.is_last_slot);
        }
        Ok(sym)
    }

    /// Define a slotless placeholder in the template root frame so repeated
    /// references to the same undefined name resolve (and report) once.
    pub fn declare_placeholder(
        &mut self,
        symbols: &mut SymbolTable,
        name: &str,
        span: Span,
    ) -> SymbolId {
        let sym = symbols.insert(
            name.to_string(),
            SymbolKind::Undeclared,
            None,
            None,
            None,
            span,
        );
        if let Some(root) = self.frames.first_mut() {
            root.bindings.push((name.to_string(), sym));
        }
        sym
    }

    fn remove_binding(&mut self, sym: SymbolId) {
        for frame in &mut self.frames {
            frame.bindings.retain(|(_, s)| *s != sym);
        }
    }

    pub fn current_kind(&self) -> Option<FrameKind> {
        self.frames.last().map(|f| f.kind)
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
