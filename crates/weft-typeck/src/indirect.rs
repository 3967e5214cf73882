// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Cross-template indirect parameter analysis.
//!
//! A template that forwards its whole data record to a callee
//! (`pass_all_data`) implicitly accepts every parameter the callee declares
//! and does not receive explicitly at the call site, transitively through
//! further forwarding calls. This pass computes that set per template.
//!
//! Traversal is an explicit worklist over call edges with a visited set, so
//! the call graph's shape never shows up as stack depth. Results are
//! memoized by template name and reused when another root reaches the same
//! callee.

use std::collections::{BTreeMap, HashMap, HashSet};

use weft_ast::{FileSet, Stmt, StmtKind, TemplateNode};
use weft_types::{Type, TypeRegistry};

/// Parameters a template accepts on behalf of its callees.
#[derive(Debug, Clone, Default)]
pub struct IndirectParams {
    /// Parameter name to declared type, unioned when several callees declare
    /// the same name.
    pub params: BTreeMap<String, Type>,
    /// A forwarding call targets a template outside this fileset, so the
    /// set may be incomplete.
    pub may_have_external: bool,
    /// The forwarding graph under this template contains a cycle. The set is
    /// still complete: parameters accumulate monotonically, so revisiting a
    /// template adds nothing new.
    pub cyclic: bool,
}

/// Memoizing analyzer over one fileset.
pub struct IndirectParamsAnalyzer<'a> {
    fileset: &'a FileSet,
    types: &'a TypeRegistry,
    memo: HashMap<String, IndirectParams>,
}

impl<'a> IndirectParamsAnalyzer<'a> {
    pub fn new(fileset: &'a FileSet, types: &'a TypeRegistry) -> Self {
        Self {
            fileset,
            types,
            memo: HashMap::new(),
        }
    }

    /// Analyze every template in the fileset.
    pub fn analyze_all(mut self) -> HashMap<String, IndirectParams> {
        let names: Vec<String> = self
            .fileset
            .template_names()
            .map(str::to_string)
            .collect();
        for name in &names {
            self.analyze(name);
        }
        self.memo
    }

    /// The indirect parameters of one template, computed on first request.
    pub fn analyze(&mut self, root: &str) -> &IndirectParams {
        if !self.memo.contains_key(root) {
            let result = self.compute(root);
            self.memo.insert(root.to_string(), result);
        }
        &self.memo[root]
    }

    fn compute(&self, root: &str) -> IndirectParams {
        let mut result = IndirectParams::default();
        let Some(template) = self.fileset.template(root) else {
            return result;
        };

        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(root);
        let mut worklist: Vec<&TemplateNode> = vec![template];

        while let Some(current) = worklist.pop() {
            for (callee, explicit) in forwarding_calls(&current.body) {
                let Some(callee_node) = self.fileset.template(callee) else {
                    result.may_have_external = true;
                    continue;
                };
                for param in &callee_node.params {
                    if param.injected || explicit.contains(&param.name.as_str()) {
                        continue;
                    }
                    let ty = self
                        .types
                        .resolve_type(&param.ty)
                        .unwrap_or(Type::Unknown);
                    result
                        .params
                        .entry(param.name.clone())
                        .and_modify(|existing| {
                            *existing = Type::union(vec![existing.clone(), ty.clone()]);
                        })
                        .or_insert(ty);
                }

                // A memoized callee contributes its transitive set without a
                // re-walk; otherwise the callee joins the worklist.
                if let Some(memoized) = self.memo.get(callee) {
                    for (name, ty) in &memoized.params {
                        result
                            .params
                            .entry(name.clone())
                            .and_modify(|existing| {
                                *existing = Type::union(vec![existing.clone(), ty.clone()]);
                            })
                            .or_insert_with(|| ty.clone());
                    }
                    result.may_have_external |= memoized.may_have_external;
                    result.cyclic |= memoized.cyclic;
                } else if visited.insert(callee) {
                    worklist.push(callee_node);
                } else {
                    result.cyclic = true;
                }
            }
        }

        // Parameters the root declares itself are direct, not indirect.
        for param in &template.params {
            result.params.remove(&param.name);
        }
        result
    }
}

/// Every `pass_all_data` call in a statement tree, with the argument names
/// set explicitly at the call site.
fn forwarding_calls(body: &[Stmt]) -> Vec<(&str, HashSet<&str>)> {
    let mut calls = Vec::new();
    let mut stack: Vec<&Stmt> = body.iter().rev().collect();
    while let Some(stmt) = stack.pop() {
        match &stmt.kind {
            StmtKind::CallTemplate {
                callee,
                args,
                pass_all_data: true,
            } => {
                calls.push((
                    callee.as_str(),
                    args.iter().map(|arg| arg.name.as_str()).collect(),
                ));
            }
            StmtKind::CallTemplate { .. } | StmtKind::RawText(_) | StmtKind::Print(_) => {}
            StmtKind::LetValue { .. } => {}
            StmtKind::LetContent { body, .. } => stack.extend(body.iter().rev()),
            StmtKind::If { arms, else_body } => {
                for arm in arms {
                    stack.extend(arm.body.iter().rev());
                }
                if let Some(body) = else_body {
                    stack.extend(body.iter().rev());
                }
            }
            StmtKind::Switch { cases, default, .. } => {
                for case in cases {
                    stack.extend(case.body.iter().rev());
                }
                if let Some(body) = default {
                    stack.extend(body.iter().rev());
                }
            }
            StmtKind::For { body, .. } => stack.extend(body.iter().rev()),
        }
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ast::{CallArg, ParamDecl, Span, TemplateFile, TypeExpr};

    fn sp() -> Span {
        Span::new(0, 0)
    }

    fn param(name: &str, ty: TypeExpr) -> ParamDecl {
        ParamDecl {
            name: name.into(),
            ty,
            injected: false,
            required: true,
            span: sp(),
        }
    }

    fn call(callee: &str, args: Vec<CallArg>, pass_all_data: bool) -> Stmt {
        Stmt {
            kind: StmtKind::CallTemplate {
                callee: callee.into(),
                args,
                pass_all_data,
            },
            span: sp(),
        }
    }

    fn template(name: &str, params: Vec<ParamDecl>, body: Vec<Stmt>) -> TemplateNode {
        TemplateNode {
            name: name.into(),
            params,
            body,
            span: sp(),
            slot_count: 0,
        }
    }

    fn fileset(templates: Vec<TemplateNode>) -> FileSet {
        let mut file = TemplateFile::new("test.weft");
        file.templates = templates;
        let mut set = FileSet::new();
        set.files.push(file);
        set
    }

    #[test]
    fn forwarded_callee_params_become_indirect() {
        let set = fileset(vec![
            template("caller", vec![param("own", TypeExpr::Int)], vec![call(
                "leaf",
                Vec::new(),
                true,
            )]),
            template(
                "leaf",
                vec![param("own", TypeExpr::Int), param("extra", TypeExpr::String)],
                Vec::new(),
            ),
        ]);
        let types = TypeRegistry::new();
        let mut analyzer = IndirectParamsAnalyzer::new(&set, &types);

        let result = analyzer.analyze("caller");
        // `own` is declared by the caller itself; only `extra` is indirect.
        assert_eq!(result.params.len(), 1);
        assert_eq!(result.params.get("extra"), Some(&Type::String));
        assert!(!result.may_have_external);
        assert!(!result.cyclic);
    }

    #[test]
    fn explicit_args_and_plain_calls_do_not_forward() {
        let set = fileset(vec![
            template("caller", Vec::new(), vec![
                call(
                    "leaf",
                    vec![CallArg {
                        name: "given".into(),
                        value: weft_ast::ExprId(0),
                    }],
                    true,
                ),
                call("other", Vec::new(), false),
            ]),
            template(
                "leaf",
                vec![param("given", TypeExpr::Int), param("wanted", TypeExpr::Bool)],
                Vec::new(),
            ),
            template("other", vec![param("hidden", TypeExpr::Int)], Vec::new()),
        ]);
        let types = TypeRegistry::new();
        let mut analyzer = IndirectParamsAnalyzer::new(&set, &types);

        let result = analyzer.analyze("caller");
        assert_eq!(result.params.len(), 1);
        assert!(result.params.contains_key("wanted"));
    }

    #[test]
    fn cycles_terminate_and_are_flagged() {
        let set = fileset(vec![
            template("a", vec![param("pa", TypeExpr::Int)], vec![call(
                "b",
                Vec::new(),
                true,
            )]),
            template("b", vec![param("pb", TypeExpr::Bool)], vec![call(
                "a",
                Vec::new(),
                true,
            )]),
        ]);
        let types = TypeRegistry::new();
        let mut analyzer = IndirectParamsAnalyzer::new(&set, &types);

        let result = analyzer.analyze("a");
        assert!(result.cyclic);
        // a's own param comes back around through the cycle but is direct.
        assert_eq!(result.params.len(), 1);
        assert!(result.params.contains_key("pb"));
    }

    #[test]
    fn unknown_callee_marks_external() {
        let set = fileset(vec![template("caller", Vec::new(), vec![call(
            "elsewhere.main",
            Vec::new(),
            true,
        )])]);
        let types = TypeRegistry::new();
        let mut analyzer = IndirectParamsAnalyzer::new(&set, &types);

        assert!(analyzer.analyze("caller").may_have_external);
    }
}
