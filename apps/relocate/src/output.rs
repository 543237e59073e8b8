//! Output rendering for rewrite, scan, and rules commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields and a top-level summary.

use crate::driver::RunReport;
use crate::models::rules::RuleTable;
use crate::models::{FileDiagnostic, ScanResult};
use crate::utils::{build_naive_diff, error_prefix, use_colors, warn_prefix};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("{} {}", error_prefix(), e),
    }
}

fn print_errors(errors: &[String]) {
    for e in errors {
        eprintln!("{} {}", error_prefix(), e);
    }
}

fn print_diagnostics(diags: &[FileDiagnostic], color: bool) {
    for d in diags {
        let kind = if color {
            format!("⟦{}⟧", d.diagnostic.kind).yellow().bold().to_string()
        } else {
            format!("⟦{}⟧", d.diagnostic.kind)
        };
        let loc = format!("{}:{}", d.file, d.diagnostic.line);
        let loc = if color { loc.bold().to_string() } else { loc };
        println!("▲ {} {} — {}", kind, loc, d.diagnostic.message);
    }
}

/// Print rewrite results. When `write` is false, previews and diffs can be
/// emitted; otherwise only file statuses are shown. Diagnostics come last.
pub fn print_rewrite(report: &RunReport, output: &str, write: bool, diff: bool) {
    match output {
        "json" => print_json(&compose_rewrite_json(report, write, diff)),
        _ => {
            let color = use_colors(output);
            for r in report.files.iter().filter(|r| r.changed) {
                if write {
                    if color {
                        println!("{} {}", "✏️  rewritten:".green().bold(), r.file.bold());
                    } else {
                        println!("✏️  rewritten: {}", r.file);
                    }
                } else if diff {
                    let body = build_naive_diff(r.original.as_deref(), r.preview.as_deref())
                        .or_else(|| r.preview.clone())
                        .unwrap_or_default();
                    if color {
                        println!("{} {}\n{}", "---".cyan().bold(), r.file.bold(), body);
                    } else {
                        println!("--- {}\n{}", r.file, body);
                    }
                } else if color {
                    println!("{} {}", "would rewrite:".cyan().bold(), r.file.bold());
                } else {
                    println!("would rewrite: {}", r.file);
                }
            }
            let diags = report.diagnostics();
            print_diagnostics(&diags, color);
            let summary = format!(
                "— Summary — changed={} files={} diagnostics={}",
                report.changed(),
                report.files.len(),
                diags.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
    print_errors(&report.errors);
}

/// Print scan results in the requested format.
pub fn print_scan(res: &ScanResult, output: &str, errors: &[String]) {
    match output {
        "json" => print_json(&compose_scan_json(res)),
        _ => {
            let color = use_colors(output);
            for is in &res.issues {
                let loc = format!("{}:{}", is.file, is.line);
                let (loc, module) = if color {
                    (loc.bold().to_string(), is.module.cyan().to_string())
                } else {
                    (loc, is.module.clone())
                };
                println!("◆ {} ❲{}❳ {}", loc, module, is.symbols.join(", "));
            }
            print_diagnostics(&res.diagnostics, color);
            let summary = format!(
                "— Summary — imports={} diagnostics={} files={}",
                res.summary.imports, res.summary.diagnostics, res.summary.files
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
    print_errors(errors);
}

/// Print the loaded Mapping Table.
pub fn print_rules(table: &RuleTable, output: &str) {
    match output {
        "json" => match serde_json::to_value(table) {
            Ok(v) => print_json(&v),
            Err(e) => eprintln!("{} {}", error_prefix(), e),
        },
        _ => {
            let color = use_colors(output);
            for m in &table.modules {
                if color {
                    println!("{}", m.deprecated.bold());
                } else {
                    println!("{}", m.deprecated);
                }
                for s in &m.symbols {
                    let mut line = format!("  {} -> {}", s.name, s.to);
                    if let Some(r) = &s.rename {
                        line.push_str(&format!(" (as {r}{})", if s.rebind { ", rebind" } else { "" }));
                    }
                    println!("{line}");
                }
            }
            for cs in &table.call_sites {
                let guard = match (&cs.from, &cs.to) {
                    (Some(f), Some(t)) if cs.requires_imports_changed => format!(" [{f} -> {t}]"),
                    _ => String::new(),
                };
                println!(
                    "call-site {} (priority {}){}: {} => {}",
                    cs.id, cs.priority, guard, cs.pattern, cs.replacement
                );
            }
            if table.modules.is_empty() && table.call_sites.is_empty() {
                eprintln!("{} rules file defines no modules or call-site rules", warn_prefix());
            }
        }
    }
}

/// Compose rewrite JSON object (pure) for testing/snapshot purposes.
pub fn compose_rewrite_json(report: &RunReport, write: bool, diff: bool) -> JsonVal {
    let items: Vec<_> = report
        .files
        .iter()
        .filter(|r| r.changed || !r.diagnostics.is_empty())
        .map(|r| {
            json!({
                "file": r.file,
                "changed": r.changed,
                "wrote": r.wrote,
                "preview": if !write { r.preview.as_ref() } else { None },
                "diff": if diff && !write { build_naive_diff(r.original.as_deref(), r.preview.as_deref()) } else { None },
                "diagnostics": r.diagnostics,
            })
        })
        .collect();
    let summary = json!({
        "changed": report.changed(),
        "total": report.files.len(),
        "wrote": report.files.iter().filter(|r| r.wrote).count(),
        "diagnostics": report.files.iter().map(|r| r.diagnostics.len()).sum::<usize>(),
        "errors": report.errors.len(),
    });
    json!({"results": items, "summary": summary, "errors": report.errors})
}

/// Compose scan JSON object (pure) for testing/snapshot purposes.
pub fn compose_scan_json(res: &ScanResult) -> JsonVal {
    serde_json::to_value(res).unwrap_or(JsonVal::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::FileOutcome;
    use crate::models::{Diagnostic, DiagnosticKind, Issue, Summary};

    fn report() -> RunReport {
        RunReport {
            files: vec![
                FileOutcome {
                    file: "a.ts".into(),
                    changed: true,
                    wrote: false,
                    preview: Some("import { X } from 'x';\n".into()),
                    original: Some("import { X } from 'old';\n".into()),
                    diagnostics: vec![],
                },
                FileOutcome {
                    file: "b.ts".into(),
                    changed: false,
                    wrote: false,
                    preview: None,
                    original: None,
                    diagnostics: vec![Diagnostic {
                        kind: DiagnosticKind::UnresolvedSymbol,
                        module: "old".into(),
                        symbol: Some("Y".into()),
                        line: 3,
                        message: "no rule".into(),
                    }],
                },
                FileOutcome {
                    file: "c.ts".into(),
                    changed: false,
                    wrote: false,
                    preview: None,
                    original: None,
                    diagnostics: vec![],
                },
            ],
            errors: vec![],
        }
    }

    #[test]
    fn test_compose_rewrite_json_preview_and_diff() {
        let out = compose_rewrite_json(&report(), false, true);
        assert_eq!(out["summary"]["changed"], 1);
        assert_eq!(out["summary"]["total"], 3);
        assert_eq!(out["summary"]["wrote"], 0);
        assert_eq!(out["summary"]["diagnostics"], 1);
        // unchanged files without diagnostics are omitted
        assert_eq!(out["results"].as_array().unwrap().len(), 2);
        assert!(out["results"][0]["preview"].is_string());
        assert!(out["results"][0]["diff"].is_string());
        assert_eq!(out["results"][1]["diagnostics"][0]["kind"], "UnresolvedSymbol");
        assert_eq!(out["results"][1]["diagnostics"][0]["symbol"], "Y");
    }

    #[test]
    fn test_compose_rewrite_json_write_mode() {
        let mut r = report();
        r.files[0].wrote = true;
        r.files[0].preview = None;
        let out = compose_rewrite_json(&r, true, false);
        assert_eq!(out["summary"]["wrote"], 1);
        assert!(out["results"][0]["preview"].is_null());
        assert!(out["results"][0]["diff"].is_null());
    }

    #[test]
    fn test_compose_scan_json_shape() {
        let res = ScanResult {
            issues: vec![Issue {
                file: "p.ts".into(),
                line: 1,
                module: "old".into(),
                symbols: vec!["A".into()],
            }],
            diagnostics: vec![],
            summary: Summary {
                files: 1,
                imports: 1,
                diagnostics: 0,
            },
        };
        let out = compose_scan_json(&res);
        assert_eq!(out["summary"]["imports"], 1);
        assert_eq!(out["issues"][0]["module"], "old");
    }
}
