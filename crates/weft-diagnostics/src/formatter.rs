// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! Produces multi-line, color-coded output:
//!
//! ```text
//! error[E0201]: variable `$x` is already declared
//!   --> greeting.weft:4:8
//!    |
//!  2 |   {let $x: 1 /}
//!    |        -- previous declaration
//!  4 |   {let $x: $y /}
//!    |        ^^ redeclared here
//!    |
//!    = note: a name stays live until its scope closes and cannot be shadowed
//! ```

use colored::Colorize;

use weft_ast::LineMap;

use crate::{Diagnostic, LabelStyle, Severity};

/// Formats diagnostics against one source file.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

struct AnnotatedLine {
    line: u32,
    text: String,
    col_start: u32,
    col_end: u32,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: None,
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let mut annotated = self.annotate(diagnostic);
        annotated.sort_by_key(|a| (a.line, a.col_start));
        if annotated.is_empty() {
            self.format_footer(&mut out, diagnostic, 2);
            return out;
        }

        if let Some(span) = diagnostic.primary_span() {
            let (line, col) = self.line_map.offset_to_line_col(span.start);
            out.push_str(&format!(
                "  {} {}:{}:{}\n",
                "-->".blue(),
                self.file_name.unwrap_or("<source>"),
                line,
                col
            ));
        }

        let max_line = annotated.iter().map(|a| a.line).max().unwrap_or(1);
        let gutter = max_line.to_string().len().max(2);
        out.push_str(&format!("{} {}\n", " ".repeat(gutter + 1), "|".blue()));

        let mut prev: Option<u32> = None;
        for ann in &annotated {
            if let Some(prev) = prev {
                if ann.line > prev + 1 {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter), "...".blue()));
                }
            }
            if prev != Some(ann.line) {
                out.push_str(&format!(
                    "{:>width$} {} {}\n",
                    ann.line.to_string().blue().bold(),
                    "|".blue(),
                    ann.text,
                    width = gutter + 1,
                ));
            }

            let pad = " ".repeat(gutter + 1);
            let lead = " ".repeat(ann.col_start.saturating_sub(1) as usize);
            let width = (ann.col_end.saturating_sub(ann.col_start)).max(1) as usize;
            let underline = match ann.style {
                LabelStyle::Primary => "^".repeat(width).red().bold(),
                LabelStyle::Secondary => "-".repeat(width).blue(),
            };
            let msg = ann.message.as_deref().unwrap_or_default();
            out.push_str(&format!(
                "{} {} {}{} {}\n",
                pad,
                "|".blue(),
                lead,
                underline,
                msg
            ));
            prev = Some(ann.line);
        }

        out.push_str(&format!("{} {}\n", " ".repeat(gutter + 1), "|".blue()));
        self.format_footer(&mut out, diagnostic, gutter);
        out
    }

    fn annotate(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        diagnostic
            .labels
            .iter()
            .filter_map(|label| {
                let (line, col_start) = self.line_map.offset_to_line_col(label.span.start);
                let (end_line, col_end) = self.line_map.offset_to_line_col(label.span.end);
                let text = self.line_map.line_text(self.source, line)?.to_string();
                // multi-line spans underline to the end of the first line
                let col_end = if end_line == line {
                    col_end
                } else {
                    text.len() as u32 + 1
                };
                Some(AnnotatedLine {
                    line,
                    text,
                    col_start,
                    col_end,
                    style: label.style,
                    message: label.message.clone(),
                })
            })
            .collect()
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };
        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code.0.clone().red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter: usize) {
        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }
        if let Some(help) = &diagnostic.help {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter + 1),
                "=".cyan(),
                "help".green().bold(),
                help
            ));
        }
    }
}
