// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pass orchestration for the weft template compiler.
//!
//! `compile` takes a parsed fileset plus the caller's type and function
//! registries and runs name resolution, expression type resolution,
//! simplification, and cross-template indirect parameter analysis, in that
//! order. Errors from every file are converted to diagnostics and reported
//! together; compilation of one file never hides errors in another.
//!
//! The core is single-threaded per call. Registries are taken by shared
//! reference and never mutated, so callers may compile independent filesets
//! on separate threads against the same registries.

use std::collections::HashMap;

use weft_ast::FileSet;
use weft_diagnostics::{Diagnostic, ToDiagnostic};
use weft_resolve::ResolvedFile;
use weft_typeck::{CheckOptions, IndirectParams, IndirectParamsAnalyzer, TypedFile};
use weft_types::{FunctionRegistry, TypeRegistry};

/// Knobs for one compilation run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Accept non-bool operands to logical operators, typing the result as
    /// unknown instead of bool.
    pub legacy_truthiness: bool,
    /// Run the simplifier after type checking.
    pub simplify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            legacy_truthiness: false,
            simplify: true,
        }
    }
}

/// Per-file analysis results.
#[derive(Debug)]
pub struct CompiledFile {
    pub resolved: ResolvedFile,
    pub typed: TypedFile,
}

/// The output of a successful compilation.
#[derive(Debug)]
pub struct CompiledFileSet {
    /// Parallel to `FileSet::files`.
    pub files: Vec<CompiledFile>,
    /// Indirect parameters per template name.
    pub indirect_params: HashMap<String, IndirectParams>,
}

/// Compile a fileset: resolve names, type expressions, simplify, and analyze
/// cross-template parameter flow. The fileset's ASTs are updated in place
/// (slot counts, simplified bodies).
pub fn compile(
    fileset: &mut FileSet,
    types: &TypeRegistry,
    functions: &FunctionRegistry,
    options: &CompileOptions,
) -> Result<CompiledFileSet, Vec<Diagnostic>> {
    let check_options = CheckOptions {
        legacy_truthiness: options.legacy_truthiness,
    };

    let mut diagnostics = Vec::new();
    let mut resolved_files = Vec::with_capacity(fileset.files.len());
    for file in fileset.files.iter_mut() {
        let resolved = weft_resolve::resolve_file(file);
        diagnostics.extend(resolved.errors.iter().map(ToDiagnostic::to_diagnostic));
        resolved_files.push(resolved);
    }

    // Type checking still runs over files with resolution errors: undefined
    // names resolve to placeholder symbols, so the walk stays total and all
    // errors surface in one report.
    let mut typed_files = Vec::with_capacity(fileset.files.len());
    for (file, resolved) in fileset.files.iter().zip(&resolved_files) {
        match weft_typeck::check_file(file, resolved, types, functions, &check_options) {
            Ok(typed) => typed_files.push(typed),
            Err(errors) => {
                diagnostics.extend(errors.iter().map(ToDiagnostic::to_diagnostic));
                typed_files.push(TypedFile::default());
            }
        }
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    if options.simplify {
        for (file, resolved) in fileset.files.iter_mut().zip(resolved_files.iter_mut()) {
            weft_simplify::simplify_file(file, resolved, functions);
        }
        // Rewritten trees need fresh type annotations.
        typed_files.clear();
        for (file, resolved) in fileset.files.iter().zip(&resolved_files) {
            match weft_typeck::check_file(file, resolved, types, functions, &check_options) {
                Ok(typed) => typed_files.push(typed),
                Err(errors) => {
                    diagnostics.extend(errors.iter().map(ToDiagnostic::to_diagnostic));
                }
            }
        }
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }
    }

    let indirect_params = IndirectParamsAnalyzer::new(fileset, types).analyze_all();

    Ok(CompiledFileSet {
        files: resolved_files
            .into_iter()
            .zip(typed_files)
            .map(|(resolved, typed)| CompiledFile { resolved, typed })
            .collect(),
        indirect_params,
    })
}
