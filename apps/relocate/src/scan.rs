//! Read-only report of deprecated imports.
//!
//! Lists every declaration that still names a deprecated module, together
//! with the diagnostics a rewrite would produce, without touching any file.

use crate::driver::{discover, display_path};
use crate::engine::lexer::Mask;
use crate::engine::locator::locate;
use crate::engine::Engine;
use crate::models::{FileDiagnostic, Issue, ScanResult, Summary};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Issues and diagnostics found in one text.
pub fn scan_text(file: &str, text: &str, engine: &Engine) -> (Vec<Issue>, Vec<FileDiagnostic>) {
    let mask = Mask::new(text);
    let located = locate(text, &mask, |m| engine.is_deprecated(m));
    let issues = located
        .matches()
        .map(|d| Issue {
            file: file.to_string(),
            line: d.line,
            module: d.module.clone(),
            symbols: d.symbols(),
        })
        .collect();
    let diagnostics = engine
        .rewrite(text)
        .diagnostics
        .into_iter()
        .map(|diagnostic| FileDiagnostic {
            file: file.to_string(),
            diagnostic,
        })
        .collect();
    (issues, diagnostics)
}

/// Scan all discovered files. Returns the result and any I/O or pattern errors.
pub fn run_scan(
    root: &Path,
    engine: &Engine,
    include: &[String],
    exclude: &[String],
) -> (ScanResult, Vec<String>) {
    let (targets, mut errors) = discover(root, include, exclude);
    let per_file: Vec<Result<(Vec<Issue>, Vec<FileDiagnostic>), String>> = targets
        .par_iter()
        .map(|path| -> Result<(Vec<Issue>, Vec<FileDiagnostic>), String> {
            let file = display_path(root, path);
            let data =
                fs::read_to_string(path).map_err(|e| format!("failed to read {file}: {e}"))?;
            Ok(scan_text(&file, &data, engine))
        })
        .collect();

    let mut result = ScanResult::default();
    let mut files = 0usize;
    for r in per_file {
        match r {
            Ok((mut issues, mut diags)) => {
                files += 1;
                result.issues.append(&mut issues);
                result.diagnostics.append(&mut diags);
            }
            Err(e) => errors.push(e),
        }
    }
    // Deterministic ordering by file then line
    result
        .issues
        .sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
    result.diagnostics.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.diagnostic.line.cmp(&b.diagnostic.line))
    });
    result.summary = Summary {
        files,
        imports: result.issues.len(),
        diagnostics: result.diagnostics.len(),
    };
    (result, errors)
}
