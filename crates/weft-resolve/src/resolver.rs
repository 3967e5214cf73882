// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The name resolution pass.
//!
//! Walks every template body, declaring parameters and local bindings into a
//! [`ScopeStack`] and linking each variable reference to its symbol. A `let`
//! value expression is resolved *before* its name is declared, so
//! `{let $x: $x /}` sees the outer `$x` (or fails) rather than itself. A
//! loop's iterable is likewise resolved in the enclosing scope.
//!
//! Resolution never stops at the first error. An undefined variable gets a
//! slotless placeholder symbol in the template root frame, so later uses of
//! the same name resolve to it and report only once.

use std::collections::HashMap;

use weft_ast::{ExprArena, ExprId, ExprKind, Span, Stmt, StmtKind, TemplateNode};

use crate::error::ResolveError;
use crate::scope::{FrameKind, ScopeStack};
use crate::symbol::{SymbolId, SymbolKind, SymbolTable};

/// The output of resolving one template file.
#[derive(Debug, Default)]
pub struct ResolvedFile {
    /// Every symbol declared across all templates in the file.
    pub symbols: SymbolTable,
    /// Variable reference expression -> the symbol it names.
    pub resolutions: HashMap<ExprId, SymbolId>,
    /// Declaration site -> declared symbol, keyed by the binding's defining
    /// expression (a `let` value or a loop iterable).
    pub decls: HashMap<ExprId, SymbolId>,
    pub errors: Vec<ResolveError>,
}

impl ResolvedFile {
    /// The symbol a variable reference resolved to.
    pub fn symbol_of(&self, expr: ExprId) -> Option<SymbolId> {
        self.resolutions.get(&expr).copied()
    }
}

struct Resolver<'a> {
    arena: &'a ExprArena,
    scopes: ScopeStack,
    out: ResolvedFile,
}

impl<'a> Resolver<'a> {
    fn new(arena: &'a ExprArena) -> Self {
        Self {
            arena,
            scopes: ScopeStack::new(),
            out: ResolvedFile::default(),
        }
    }

    fn resolve_template(&mut self, template: &mut TemplateNode) {
        self.scopes = ScopeStack::new();
        self.scopes.push(FrameKind::Template);

        for param in &template.params {
            let kind = if param.injected {
                SymbolKind::InjectedParam
            } else {
                SymbolKind::Param
            };
            match self.scopes.declare(
                &mut self.out.symbols,
                &param.name,
                kind,
                Some(param.ty.clone()),
                param.span,
            ) {
                Ok(_) => {}
                Err(err) => self.out.errors.push(err),
            }
        }

        self.resolve_body(&template.body);
        self.scopes.pop();
        template.slot_count = self.scopes.high_water();
    }

    fn resolve_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_block(&mut self, body: &[Stmt]) {
        self.scopes.push(FrameKind::Block);
        self.resolve_body(body);
        self.scopes.pop();
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::RawText(_) => {}
            StmtKind::Print(expr) => self.resolve_expr(*expr),
            StmtKind::LetValue { name, value } => {
                self.resolve_expr(*value);
                if let Some(sym) = self.declare(name, SymbolKind::LetValue, stmt.span) {
                    self.out.decls.insert(*value, sym);
                }
            }
            StmtKind::LetContent { name, body } => {
                self.resolve_block(body);
                self.declare(name, SymbolKind::LetContent, stmt.span);
            }
            StmtKind::If { arms, else_body } => {
                for arm in arms {
                    self.resolve_expr(arm.cond);
                    self.resolve_block(&arm.body);
                }
                if let Some(body) = else_body {
                    self.resolve_block(body);
                }
            }
            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                self.resolve_expr(*subject);
                for case in cases {
                    for expr in &case.exprs {
                        self.resolve_expr(*expr);
                    }
                    self.resolve_block(&case.body);
                }
                if let Some(body) = default {
                    self.resolve_block(body);
                }
            }
            StmtKind::For {
                var,
                iterable,
                body,
            } => {
                self.resolve_expr(*iterable);
                self.scopes.push(FrameKind::Loop);
                if let Some(sym) = self.declare(var, SymbolKind::LoopVar, stmt.span) {
                    self.out.decls.insert(*iterable, sym);
                }
                self.resolve_body(body);
                self.scopes.pop();
            }
            StmtKind::CallTemplate { args, .. } => {
                for arg in args {
                    self.resolve_expr(arg.value);
                }
            }
        }
    }

    fn resolve_expr(&mut self, id: ExprId) {
        let arena = self.arena;
        match arena.kind(id) {
            ExprKind::Var(name) => {
                let sym = self.lookup_or_placeholder(name, arena.span(id));
                self.out.resolutions.insert(id, sym);
            }
            other => {
                for child in other.children() {
                    self.resolve_expr(child);
                }
            }
        }
    }

    fn declare(&mut self, name: &str, kind: SymbolKind, span: Span) -> Option<SymbolId> {
        match self
            .scopes
            .declare(&mut self.out.symbols, name, kind, None, span)
        {
            Ok(sym) => Some(sym),
            Err(err) => {
                self.out.errors.push(err);
                None
            }
        }
    }

    fn lookup_or_placeholder(&mut self, name: &str, span: Span) -> SymbolId {
        if let Some(sym) = self.scopes.lookup(name) {
            return sym;
        }
        self.out
            .errors
            .push(ResolveError::undefined(name.to_string(), span));
        self.scopes
            .declare_placeholder(&mut self.out.symbols, name, span)
    }
}

/// Resolve every template in a file, filling in each template's slot count.
pub fn resolve_file(file: &mut weft_ast::TemplateFile) -> ResolvedFile {
    let weft_ast::TemplateFile {
        arena, templates, ..
    } = file;
    let mut resolver = Resolver::new(arena);
    for template in templates.iter_mut() {
        resolver.resolve_template(template);
    }
    resolver.out
}
