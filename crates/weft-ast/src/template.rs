// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Template and file-level nodes.

use crate::expr::ExprArena;
use crate::stmt::Stmt;
use crate::Span;

/// A parameter declared in a template header.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    /// Declared type, written in the template's type syntax. Parsed against
    /// the type registry during type resolution.
    pub ty: TypeExpr,
    /// Declared with @inject rather than @param.
    pub injected: bool,
    pub required: bool,
    pub span: Span,
}

/// A declared type as the parser sees it, before registry lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Bool,
    Int,
    Float,
    String,
    Null,
    Unknown,
    Any,
    List(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Record(Vec<(String, TypeExpr)>),
    Union(Vec<TypeExpr>),
    /// Named type (enums), resolved against the type registry.
    Named(String),
}

/// One template definition.
#[derive(Debug, Clone)]
pub struct TemplateNode {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
    /// Local-variable slot count, filled in by name resolution.
    pub slot_count: u32,
}

/// One parsed template file: its templates plus the arena their expressions
/// live in.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub path: String,
    pub arena: ExprArena,
    pub templates: Vec<TemplateNode>,
}

impl TemplateFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            arena: ExprArena::new(),
            templates: Vec::new(),
        }
    }
}

/// A set of template files compiled together.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    pub files: Vec<TemplateFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a template by name across all files.
    pub fn template(&self, name: &str) -> Option<&TemplateNode> {
        self.files
            .iter()
            .flat_map(|f| f.templates.iter())
            .find(|t| t.name == name)
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .flat_map(|f| f.templates.iter())
            .map(|t| t.name.as_str())
    }
}
