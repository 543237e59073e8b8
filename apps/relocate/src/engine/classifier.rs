//! Symbol Classifier: resolves each named specifier of a deprecated import
//! against that module's rule set.
//!
//! Resolved specifiers are grouped by destination module in first-occurrence
//! order. Unknown names stay behind on the original module and are reported.

use super::locator::{ImportDecl, Specifier};
use crate::models::rules::SymbolRule;
use crate::models::{Diagnostic, DiagnosticKind};
use std::collections::HashMap;

/// Symbol rules of one deprecated module, keyed by exported name.
#[derive(Debug, Clone)]
pub struct ModuleRules {
    pub deprecated: String,
    pub symbols: HashMap<String, SymbolRule>,
}

impl ModuleRules {
    pub fn get(&self, name: &str) -> Option<&SymbolRule> {
        self.symbols.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Specifiers bound for one destination module.
pub struct SymbolGroup {
    pub module: String,
    pub type_only: bool,
    pub specifiers: Vec<Specifier>,
}

#[derive(Debug, Default)]
pub struct Classification {
    pub groups: Vec<SymbolGroup>,
    /// Specifiers without a rule; they stay on the deprecated module.
    pub residual: Vec<Specifier>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Classification {
    pub fn resolved_any(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Resolve the named specifiers of `decl`.
///
/// Declarations without named specifiers (default, namespace, side-effect)
/// short-circuit to an empty classification.
pub fn classify(decl: &ImportDecl, rules: &ModuleRules) -> Classification {
    let mut out = Classification::default();
    for spec in decl.specifiers() {
        let Some(rule) = rules.get(&spec.imported) else {
            out.residual.push(spec.clone());
            out.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnresolvedSymbol,
                module: decl.module.clone(),
                symbol: Some(spec.imported.clone()),
                line: decl.line,
                message: format!(
                    "no rule for '{}' from '{}'; import kept on the original module",
                    spec.imported, decl.module
                ),
            });
            continue;
        };
        let resolved = resolve(spec, rule);
        match out
            .groups
            .iter_mut()
            .find(|g| g.module == rule.to && g.type_only == decl.type_only)
        {
            Some(group) => group.specifiers.push(resolved),
            None => out.groups.push(SymbolGroup {
                module: rule.to.clone(),
                type_only: decl.type_only,
                specifiers: vec![resolved],
            }),
        }
    }
    out
}

/// Destination specifier for `spec`. The local binding survives unless the
/// rule asks to rebind an un-aliased import to its new name.
fn resolve(spec: &Specifier, rule: &SymbolRule) -> Specifier {
    let imported = rule.exported_name();
    let aliased = spec.local != spec.imported;
    let local = if rule.rebind && !aliased {
        imported
    } else {
        spec.local.as_str()
    };
    Specifier::new(imported, local, spec.type_only)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::lexer::Mask;
    use crate::engine::locator::locate;
    use pretty_assertions::assert_eq;

    fn rule(name: &str, to: &str, rename: Option<&str>, rebind: bool) -> SymbolRule {
        SymbolRule {
            name: name.into(),
            to: to.into(),
            rename: rename.map(str::to_string),
            rebind,
        }
    }

    fn rules() -> ModuleRules {
        let list = vec![
            rule("Alpha", "modA", None, false),
            rule("Beta", "modB", None, false),
            rule("Alpha2", "modA", None, false),
            rule("Drawer", "sheet", Some("Sheet"), false),
            rule("useOld", "nav", Some("useNew"), true),
        ];
        ModuleRules {
            deprecated: "old-pkg".into(),
            symbols: list.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    fn classify_src(src: &str) -> Classification {
        let mask = Mask::new(src);
        let found = locate(src, &mask, |m| m == "old-pkg");
        let decl = found.matches().next().expect("one match");
        classify(decl, &rules())
    }

    fn rendered(g: &SymbolGroup) -> Vec<String> {
        g.specifiers.iter().map(Specifier::render).collect()
    }

    #[test]
    fn test_groups_follow_first_occurrence() {
        let cls = classify_src("import { Beta, Alpha, Alpha2 } from 'old-pkg';");
        let modules: Vec<&str> = cls.groups.iter().map(|g| g.module.as_str()).collect();
        assert_eq!(modules, vec!["modB", "modA"]);
        assert_eq!(rendered(&cls.groups[1]), vec!["Alpha", "Alpha2"]);
        assert!(cls.residual.is_empty());
        assert!(cls.diagnostics.is_empty());
    }

    #[test]
    fn test_rename_is_aliased_back_to_local_name() {
        let cls = classify_src("import { Drawer, Drawer as Panel } from 'old-pkg';");
        assert_eq!(rendered(&cls.groups[0]), vec!["Sheet as Drawer", "Sheet as Panel"]);
    }

    #[test]
    fn test_rebind_uses_new_name_unless_aliased() {
        let cls = classify_src("import { useOld, useOld as h } from 'old-pkg';");
        assert_eq!(rendered(&cls.groups[0]), vec!["useNew", "useNew as h"]);
    }

    #[test]
    fn test_unknown_symbol_is_residual_with_diagnostic() {
        let cls = classify_src("import { Alpha, Gamma as G } from 'old-pkg';");
        assert_eq!(cls.groups.len(), 1);
        assert_eq!(cls.residual, vec![Specifier::new("Gamma", "G", false)]);
        assert_eq!(cls.diagnostics.len(), 1);
        assert_eq!(cls.diagnostics[0].kind, DiagnosticKind::UnresolvedSymbol);
        assert_eq!(cls.diagnostics[0].symbol.as_deref(), Some("Gamma"));
    }

    #[test]
    fn test_default_only_short_circuits() {
        let cls = classify_src("import Old from 'old-pkg';");
        assert!(!cls.resolved_any());
        assert!(cls.residual.is_empty());
        assert!(cls.diagnostics.is_empty());
    }

    #[test]
    fn test_type_only_declaration_groups_are_type_only() {
        let cls = classify_src("import type { Alpha } from 'old-pkg';");
        assert!(cls.groups[0].type_only);
    }
}
