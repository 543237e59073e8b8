//! Call-Site Rewriter: regex substitutions for API usages whose calling
//! convention changed along with their import.
//!
//! A match only counts when it starts in live code and stays clear of import
//! declarations. Rules are tried in priority order; a span claimed by an
//! earlier rule is off limits to later ones, and every replacement is
//! computed against the pass input so no rule ever sees another's output.

use super::lexer::Mask;
use super::locator::ImportDecl;
use super::synthesizer::{apply, Edit};
use log::debug;
use regex::Regex;
use std::ops::Range;

#[derive(Debug, Clone)]
/// A validated, compiled call-site rule.
pub struct CallSiteRewrite {
    pub id: String,
    pub regex: Regex,
    pub replacement: String,
    pub requires_imports_changed: bool,
    pub from: Option<String>,
    pub symbols: Vec<String>,
    pub to: Option<String>,
    pub priority: i32,
}

impl CallSiteRewrite {
    /// Whether the import state of the file allows this rule to fire.
    ///
    /// Guarded rules need the destination module imported and no remaining
    /// import of the guarded symbols from the deprecated module.
    pub fn enabled(&self, decls: &[ImportDecl]) -> bool {
        if !self.requires_imports_changed {
            return true;
        }
        let still_old = self.from.as_deref().is_some_and(|from| {
            decls.iter().filter(|d| d.module == from).any(|d| {
                self.symbols.is_empty() || self.symbols.iter().any(|s| d.imports_symbol(Some(s)))
            })
        });
        let has_new = self
            .to
            .as_deref()
            .map_or(true, |to| decls.iter().any(|d| d.module == to));
        !still_old && has_new
    }
}

/// Apply `rules` (already in priority order) to `src`. Returns `None` when
/// nothing matched.
pub fn rewrite_call_sites(
    src: &str,
    mask: &Mask,
    decls: &[ImportDecl],
    rules: &[CallSiteRewrite],
) -> Option<String> {
    let mut claimed: Vec<Range<usize>> = decls.iter().map(|d| d.span.clone()).collect();
    let mut edits: Vec<Edit> = Vec::new();
    for rule in rules {
        if !rule.enabled(decls) {
            debug!("call-site rule '{}' skipped: imports not migrated", rule.id);
            continue;
        }
        for caps in rule.regex.captures_iter(src) {
            let Some(m) = caps.get(0) else { continue };
            let range = m.range();
            if range.is_empty() || !mask.is_code(range.start) {
                continue;
            }
            if claimed.iter().any(|c| overlaps(c, &range)) {
                continue;
            }
            let mut text = String::new();
            caps.expand(&rule.replacement, &mut text);
            debug!("call-site rule '{}' rewrites {:?}", rule.id, m.as_str());
            claimed.push(range.clone());
            edits.push(Edit { range, text });
        }
    }
    if edits.is_empty() {
        return None;
    }
    edits.sort_by_key(|e| e.range.start);
    Some(apply(src, &edits))
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::locator::locate;
    use pretty_assertions::assert_eq;

    fn rule(id: &str, pattern: &str, replacement: &str, guarded: bool) -> CallSiteRewrite {
        CallSiteRewrite {
            id: id.into(),
            regex: Regex::new(pattern).unwrap(),
            replacement: replacement.into(),
            requires_imports_changed: guarded,
            from: guarded.then(|| "old-router".to_string()),
            symbols: vec!["useRouterLike".into()],
            to: guarded.then(|| "new-nav".to_string()),
            priority: 0,
        }
    }

    fn run(src: &str, rules: &[CallSiteRewrite]) -> Option<String> {
        let mask = Mask::new(src);
        let decls = locate(src, &mask, |_| false).declarations;
        rewrite_call_sites(src, &mask, &decls, rules)
    }

    #[test]
    fn test_guarded_rule_fires_after_import_migration() {
        let src = "import { useNavLike } from 'new-nav';\nconst r = useRouterLike(); r.goBack();\n";
        let rules = vec![
            rule("hook", r"\buseRouterLike\(\)", "useNavLike()", true),
            rule("back", r"\b([A-Za-z_$][\w$]*)\.goBack\(\)", "${1}(-1)", true),
        ];
        assert_eq!(
            run(src, &rules).as_deref(),
            Some("import { useNavLike } from 'new-nav';\nconst r = useNavLike(); r(-1);\n")
        );
    }

    #[test]
    fn test_guarded_rule_waits_for_import() {
        let src = "import { useRouterLike } from 'old-router';\nconst r = useRouterLike(); r.goBack();\n";
        let rules = vec![rule("back", r"\b(\w+)\.goBack\(\)", "${1}(-1)", true)];
        assert_eq!(run(src, &rules), None);
        // no destination import either
        let bare = "const r = useRouterLike(); r.goBack();\n";
        assert_eq!(run(bare, &rules), None);
    }

    #[test]
    fn test_earlier_rule_claims_span() {
        let src = "h.replace('/a'); h.push('/b');\n";
        let rules = vec![
            rule("replace", r"\b(\w+)\.replace\(([^()]*)\)", "${1}(${2}, { replace: true })", false),
            rule("any-call", r"\b(\w+)\.(\w+)\(([^()]*)\)", "${1}(${3})", false),
        ];
        assert_eq!(
            run(src, &rules).as_deref(),
            Some("h('/a', { replace: true }); h('/b');\n")
        );
    }

    #[test]
    fn test_comments_strings_and_imports_untouched() {
        let src = "import { goBack } from 'x';\n// r.goBack()\nconst s = 'r.goBack()';\nr.goBack();\n";
        let rules = vec![rule("back", r"\b(\w+)\.goBack\(\)", "${1}(-1)", false)];
        assert_eq!(
            run(src, &rules).as_deref(),
            Some("import { goBack } from 'x';\n// r.goBack()\nconst s = 'r.goBack()';\nr(-1);\n")
        );
    }
}
