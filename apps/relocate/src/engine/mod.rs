//! The rewrite engine.
//!
//! `rewrite` runs Locator -> Classifier -> Synthesizer -> Call-Site Rewriter
//! over one file's text and reports the new text with any diagnostics. The
//! engine keeps no state between calls; an `Engine` is immutable once built
//! and can be shared by reference across threads.

pub mod callsite;
pub mod classifier;
pub mod lexer;
pub mod locator;
pub mod synthesizer;

use crate::models::RewriteResult;
use callsite::{rewrite_call_sites, CallSiteRewrite};
use classifier::{classify, ModuleRules};
use lexer::Mask;
use locator::locate;
use log::debug;
use std::collections::HashMap;

/// Compiled Mapping Table. Build it with `crate::rules::compile`.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    modules: HashMap<String, ModuleRules>,
    call_sites: Vec<CallSiteRewrite>,
}

impl Engine {
    /// `call_sites` are sorted by descending priority; ties keep their order.
    pub fn new(modules: Vec<ModuleRules>, mut call_sites: Vec<CallSiteRewrite>) -> Self {
        call_sites.sort_by_key(|r| std::cmp::Reverse(r.priority));
        Engine {
            modules: modules
                .into_iter()
                .map(|m| (m.deprecated.clone(), m))
                .collect(),
            call_sites,
        }
    }

    pub fn is_deprecated(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    pub fn module(&self, module: &str) -> Option<&ModuleRules> {
        self.modules.get(module)
    }

    pub fn call_sites(&self) -> &[CallSiteRewrite] {
        &self.call_sites
    }

    /// Rewrite one file's text.
    pub fn rewrite(&self, text: &str) -> RewriteResult {
        rewrite(text, self)
    }
}

/// Rewrite one file's text against `engine`. Never fails; anomalies become
/// diagnostics and the affected declarations are left as they were.
pub fn rewrite(text: &str, engine: &Engine) -> RewriteResult {
    let mut result = RewriteResult::unchanged(text);

    let mask = Mask::new(text);
    let located = locate(text, &mask, |m| engine.is_deprecated(m));
    result.diagnostics.extend(located.diagnostics.iter().cloned());

    let mut classified = Vec::new();
    for (idx, decl) in located.declarations.iter().enumerate() {
        if !decl.deprecated {
            continue;
        }
        let Some(rules) = engine.module(&decl.module) else {
            continue;
        };
        let mut cls = classify(decl, rules);
        result.diagnostics.append(&mut cls.diagnostics);
        classified.push((idx, cls));
    }

    let (edits, mut merge_diags) =
        synthesizer::synthesize(text, &located.declarations, classified);
    result.diagnostics.append(&mut merge_diags);
    let imports_done = if edits.is_empty() {
        text.to_string()
    } else {
        synthesizer::apply(text, &edits)
    };

    let out = if engine.call_sites.is_empty() {
        imports_done
    } else {
        let mask = Mask::new(&imports_done);
        let decls = locate(&imports_done, &mask, |_| false).declarations;
        rewrite_call_sites(&imports_done, &mask, &decls, &engine.call_sites)
            .unwrap_or(imports_done)
    };

    result.diagnostics.sort_by_key(|d| d.line);
    result.changed = out != text;
    if result.changed {
        debug!(
            "{} import edit(s), {} diagnostic(s)",
            edits.len(),
            result.diagnostics.len()
        );
        result.text = out;
    }
    result
}
