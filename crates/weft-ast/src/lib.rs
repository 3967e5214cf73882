// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the weft template language.
//!
//! This crate defines the nodes produced by the external parser and shared
//! between name resolution, type resolution, and the simplifier. Expressions
//! are arena-allocated per file; see [`expr::ExprArena`].

pub mod span;
pub mod expr;
pub mod stmt;
pub mod template;

pub use span::{LineMap, Span};
pub use expr::{BinOp, Expr, ExprArena, ExprId, ExprKind, UnaryOp};
pub use stmt::{CallArg, IfArm, Stmt, StmtKind, SwitchCase};
pub use template::{FileSet, ParamDecl, TemplateFile, TemplateNode, TypeExpr};
