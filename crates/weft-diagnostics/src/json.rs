// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Produces structured JSON that editors and build tooling can parse. Each
//! diagnostic carries exact line/column locations alongside its labels.

use serde::Serialize;

use weft_ast::LineMap;

use crate::{codes::ErrorCodeRegistry, Diagnostic, LabelStyle, Severity};

/// A complete JSON report for one compiled file.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub file: String,
    /// True when the run produced no errors.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// A labeled span with 1-based line/column endpoints.
#[derive(Debug, Serialize)]
pub struct JsonLabel {
    /// "primary" or "secondary".
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: LineCol,
    pub end: LineCol,
}

#[derive(Debug, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
}

/// Build a report for one file's diagnostics.
pub fn report(file: &str, source: &str, diagnostics: &[Diagnostic]) -> DiagnosticReport {
    let line_map = LineMap::new(source);
    let registry = ErrorCodeRegistry::default();
    let rendered: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|diag| to_json(diag, &line_map, &registry))
        .collect();
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics: rendered,
        error_count,
        warning_count,
    }
}

/// Serialize a report as pretty-printed JSON.
pub fn to_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

fn to_json(diag: &Diagnostic, line_map: &LineMap, registry: &ErrorCodeRegistry) -> JsonDiagnostic {
    let category = diag
        .code
        .as_ref()
        .and_then(|code| registry.get(&code.0))
        .map(|info| info.category.to_string());
    JsonDiagnostic {
        severity: match diag.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
        .to_string(),
        code: diag.code.as_ref().map(|c| c.0.clone()),
        category,
        message: diag.message.clone(),
        labels: diag
            .labels
            .iter()
            .map(|label| {
                let (line, column) = line_map.offset_to_line_col(label.span.start);
                let (end_line, end_column) = line_map.offset_to_line_col(label.span.end);
                JsonLabel {
                    role: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                    message: label.message.clone(),
                    start: LineCol {
                        line,
                        column,
                        byte_offset: label.span.start,
                    },
                    end: LineCol {
                        line: end_line,
                        column: end_column,
                        byte_offset: label.span.end,
                    },
                }
            })
            .collect(),
        notes: diag.notes.clone(),
        help: diag.help.clone(),
    }
}
