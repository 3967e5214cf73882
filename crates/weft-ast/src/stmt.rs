// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement nodes for template bodies.

use crate::expr::ExprId;
use crate::Span;

/// A statement in a template body.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Literal output text
    RawText(String),
    /// Print an expression's value
    Print(ExprId),
    /// Value binding ({let $x: expr /})
    LetValue { name: String, value: ExprId },
    /// Content binding ({let $x}...{/let}), renders its body to a string
    LetContent { name: String, body: Vec<Stmt> },
    /// If / elseif chain with optional else
    If {
        arms: Vec<IfArm>,
        else_body: Option<Vec<Stmt>>,
    },
    /// Switch over a subject expression
    Switch {
        subject: ExprId,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },
    /// Loop over a list expression
    For {
        var: String,
        iterable: ExprId,
        body: Vec<Stmt>,
    },
    /// Invoke another template
    CallTemplate {
        callee: String,
        args: Vec<CallArg>,
        /// Forward the caller's entire param record to the callee.
        pass_all_data: bool,
    },
}

/// One `if`/`elseif` arm: a condition and the statements it guards.
#[derive(Debug, Clone)]
pub struct IfArm {
    pub cond: ExprId,
    pub body: Vec<Stmt>,
}

/// One `case` arm of a switch: candidate expressions and a body.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub exprs: Vec<ExprId>,
    pub body: Vec<Stmt>,
}

/// An explicit argument at a template call site.
#[derive(Debug, Clone)]
pub struct CallArg {
    pub name: String,
    pub value: ExprId,
}
