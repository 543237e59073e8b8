//! Declaration Synthesizer: turns classified matches into text edits.
//!
//! One declaration is emitted per (destination module, type-only) pair for
//! the whole file, at the first declaration that contributes to it. An
//! existing plain import of the destination is reused as the merge target
//! when it comes first, and folded into the new declaration otherwise.
//!
//! Every emitted declaration names either a destination module or the
//! deprecated module with only unresolved symbols left, so running the
//! engine again finds nothing to resolve.

use super::classifier::Classification;
use super::locator::{ImportDecl, Specifier, Style};
use crate::models::{Diagnostic, DiagnosticKind};
use log::debug;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Replace `range` of the source with `text`.
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

type GroupKey = (String, bool);

struct GroupPlan {
    key: GroupKey,
    owner: usize,
    default_binding: Option<String>,
    specifiers: Vec<Specifier>,
    /// Existing destination import that appears after the owner.
    folded: Option<usize>,
}

impl GroupPlan {
    fn push(&mut self, spec: Specifier) {
        if !self.specifiers.contains(&spec) {
            self.specifiers.push(spec);
        }
    }
}

/// Plan the edits for one file.
///
/// `classified` pairs a declaration index with its classification and must be
/// in file order. Returns non-overlapping edits plus `AmbiguousMerge`
/// diagnostics for declarations that were left unmodified.
pub fn synthesize(
    src: &str,
    decls: &[ImportDecl],
    classified: Vec<(usize, Classification)>,
) -> (Vec<Edit>, Vec<Diagnostic>) {
    let newline = if src.contains("\r\n") { "\r\n" } else { "\n" };
    let mut diagnostics = Vec::new();

    // local name -> (module, imported) for bindings that stay in place
    let mut bindings: HashMap<String, (String, String)> = HashMap::new();
    let mut anchors: HashMap<GroupKey, usize> = HashMap::new();
    for (idx, d) in decls.iter().enumerate().filter(|(_, d)| !d.deprecated) {
        if let Some(name) = &d.default_binding {
            bindings.insert(name.clone(), (d.module.clone(), "default".into()));
        }
        if let Some(ns) = &d.namespace {
            bindings.insert(ns.clone(), (d.module.clone(), "*".into()));
        }
        for s in d.specifiers() {
            bindings.insert(s.local.clone(), (d.module.clone(), s.imported.clone()));
        }
        // `import type D, { x }` is not valid, so a default-only anchor
        // must be a value import.
        let default_only = d.named.is_none() && d.default_binding.is_some() && !d.type_only;
        if d.namespace.is_none() && (d.named.is_some() || default_only) {
            anchors.entry((d.module.clone(), d.type_only)).or_insert(idx);
        }
    }

    let mut groups: Vec<GroupPlan> = Vec::new();
    let mut accepted: Vec<(usize, Vec<Specifier>)> = Vec::new();
    for (idx, cls) in classified {
        if !cls.resolved_any() {
            continue;
        }
        let decl = &decls[idx];
        let mut pending: HashMap<&str, (String, String)> = HashMap::new();
        let mut conflicts: Vec<&str> = Vec::new();
        for g in &cls.groups {
            for s in &g.specifiers {
                let target = (g.module.clone(), s.imported.clone());
                let existing = bindings.get(&s.local).or_else(|| pending.get(s.local.as_str()));
                match existing {
                    Some(bound) if *bound != target => conflicts.push(&s.local),
                    _ => {
                        pending.insert(&s.local, target);
                    }
                }
            }
        }
        if !conflicts.is_empty() {
            for local in conflicts {
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::AmbiguousMerge,
                    module: decl.module.clone(),
                    symbol: Some(local.to_string()),
                    line: decl.line,
                    message: format!(
                        "'{local}' would be bound to two different imports; declaration left unchanged"
                    ),
                });
            }
            continue;
        }
        for (local, target) in pending {
            bindings.insert(local.to_string(), target);
        }

        for g in cls.groups {
            let key = (g.module.clone(), g.type_only);
            let pos = match groups.iter().position(|p| p.key == key) {
                Some(pos) => pos,
                None => {
                    let mut plan = GroupPlan {
                        key: key.clone(),
                        owner: idx,
                        default_binding: None,
                        specifiers: Vec::new(),
                        folded: None,
                    };
                    if let Some(&a) = anchors.get(&key) {
                        let anchor_decl = &decls[a];
                        plan.default_binding = anchor_decl.default_binding.clone();
                        if a < idx {
                            plan.owner = a;
                            plan.specifiers = anchor_decl.specifiers().to_vec();
                        } else {
                            plan.folded = Some(a);
                        }
                    }
                    groups.push(plan);
                    groups.len() - 1
                }
            };
            let plan = &mut groups[pos];
            for s in g.specifiers {
                plan.push(s);
            }
        }
        accepted.push((idx, cls.residual));
    }

    for plan in groups.iter_mut() {
        if let Some(a) = plan.folded {
            for s in decls[a].specifiers() {
                plan.push(s.clone());
            }
        }
    }

    let mut edits = Vec::new();
    for (idx, residual) in accepted {
        let decl = &decls[idx];
        let mut lines: Vec<String> = groups
            .iter()
            .filter(|p| p.owner == idx)
            .map(|p| render_group(p, &decl.style, newline))
            .collect();
        if !residual.is_empty() || decl.default_binding.is_some() {
            lines.push(render(
                &decl.module,
                decl.type_only,
                decl.default_binding.as_deref(),
                &residual,
                &decl.style,
                newline,
            ));
        }
        debug!(
            "line {}: '{}' -> {} declaration(s)",
            decl.line,
            decl.module,
            lines.len()
        );
        edits.push(if lines.is_empty() {
            removal(src, &decl.span)
        } else {
            Edit {
                range: decl.span.clone(),
                text: lines.join(&format!("{newline}{}", decl.style.indent)),
            }
        });
    }
    for plan in &groups {
        if !decls[plan.owner].deprecated {
            let anchor = &decls[plan.owner];
            edits.push(Edit {
                range: anchor.span.clone(),
                text: render_group(plan, &anchor.style, newline),
            });
        }
        if let Some(a) = plan.folded {
            edits.push(removal(src, &decls[a].span));
        }
    }
    edits.sort_by_key(|e| e.range.start);
    (edits, diagnostics)
}

fn render_group(plan: &GroupPlan, style: &Style, newline: &str) -> String {
    render(
        &plan.key.0,
        plan.key.1,
        plan.default_binding.as_deref(),
        &plan.specifiers,
        style,
        newline,
    )
}

/// Render one import declaration in the given layout.
pub fn render(
    module: &str,
    type_only: bool,
    default_binding: Option<&str>,
    specs: &[Specifier],
    style: &Style,
    newline: &str,
) -> String {
    let mut out = String::from("import ");
    if type_only {
        out.push_str("type ");
    }
    if let Some(d) = default_binding {
        out.push_str(d);
        if !specs.is_empty() {
            out.push_str(", ");
        }
    }
    if !specs.is_empty() || default_binding.is_none() {
        if style.multiline && !specs.is_empty() {
            out.push('{');
            for (i, s) in specs.iter().enumerate() {
                out.push_str(newline);
                out.push_str(&style.indent);
                out.push_str("  ");
                out.push_str(&s.render());
                if i + 1 < specs.len() || style.trailing_comma {
                    out.push(',');
                }
            }
            out.push_str(newline);
            out.push_str(&style.indent);
            out.push('}');
        } else {
            let list: Vec<String> = specs.iter().map(Specifier::render).collect();
            out.push_str("{ ");
            out.push_str(&list.join(", "));
            out.push_str(" }");
        }
    }
    out.push_str(" from ");
    out.push(style.quote);
    out.push_str(module);
    out.push(style.quote);
    if style.semicolon {
        out.push(';');
    }
    out
}

/// Edit deleting a whole statement, including its own line when it has one.
fn removal(src: &str, span: &Range<usize>) -> Edit {
    let line_start = src[..span.start].rfind('\n').map_or(0, |p| p + 1);
    let owns_line_start = src[line_start..span.start]
        .chars()
        .all(|c| c == ' ' || c == '\t');
    let rest = &src[span.end..];
    let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let after = &rest[trailing..];
    let line_break = if after.starts_with("\r\n") {
        2
    } else if after.starts_with('\n') {
        1
    } else {
        0
    };
    if owns_line_start && (line_break > 0 || after.is_empty()) {
        Edit {
            range: line_start..span.end + trailing + line_break,
            text: String::new(),
        }
    } else {
        Edit {
            range: span.clone(),
            text: String::new(),
        }
    }
}

/// Apply non-overlapping edits sorted by start offset.
pub fn apply(src: &str, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;
    for e in edits {
        if e.range.start < cursor {
            continue;
        }
        out.push_str(&src[cursor..e.range.start]);
        out.push_str(&e.text);
        cursor = e.range.end;
    }
    out.push_str(&src[cursor..]);
    out
}
