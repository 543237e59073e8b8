//! Shared data models for rewrite results, diagnostics, and scan reports.

pub mod rules;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
/// Anomalies the engine reports instead of failing.
pub enum DiagnosticKind {
    /// A named symbol of a deprecated module has no rule.
    UnresolvedSymbol,
    /// Resolved specifiers would bind one local name to two different imports.
    AmbiguousMerge,
    /// A deprecated-module import whose specifier list cannot be parsed.
    MalformedDeclaration,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::UnresolvedSymbol => "unresolved-symbol",
            DiagnosticKind::AmbiguousMerge => "ambiguous-merge",
            DiagnosticKind::MalformedDeclaration => "malformed-declaration",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A single engine diagnostic, located by 1-based line.
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of rewriting one file's text.
pub struct RewriteResult {
    pub changed: bool,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl RewriteResult {
    pub fn unchanged(text: &str) -> Self {
        RewriteResult {
            changed: false,
            text: text.to_string(),
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
/// A deprecated import found by `relocate scan`.
pub struct Issue {
    pub file: String,
    pub line: usize,
    pub module: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
/// A diagnostic tagged with the file it came from.
pub struct FileDiagnostic {
    pub file: String,
    #[serde(flatten)]
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Default, Serialize)]
/// Aggregated scan summary used by printers.
pub struct Summary {
    pub files: usize,
    pub imports: usize,
    pub diagnostics: usize,
}

#[derive(Debug, Default, Serialize)]
/// Scan results container.
pub struct ScanResult {
    pub issues: Vec<Issue>,
    pub diagnostics: Vec<FileDiagnostic>,
    pub summary: Summary,
}
