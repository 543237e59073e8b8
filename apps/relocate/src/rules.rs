//! Loading, validating, and compiling the Mapping Table.
//!
//! Rules files are TOML unless the extension is `.yaml`/`.yml`. Validation
//! enforces the table's invariants up front so the engine can assume them:
//! one rule per symbol, destinations that are never themselves deprecated,
//! and well-formed call-site patterns and guards.

use crate::engine::callsite::CallSiteRewrite;
use crate::engine::classifier::ModuleRules;
use crate::engine::Engine;
use crate::error::LoadError;
use crate::models::rules::RuleTable;
use log::debug;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Read a rules file from disk.
pub fn load_rules(path: &Path) -> Result<RuleTable, LoadError> {
    let s = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&s).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&s).map_err(|source| LoadError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Validate and compile a table into an `Engine`.
pub fn compile(table: &RuleTable) -> Result<Engine, LoadError> {
    let deprecated: HashSet<&str> = table.modules.iter().map(|m| m.deprecated.as_str()).collect();
    if deprecated.len() != table.modules.len() {
        let mut seen = HashSet::new();
        for m in &table.modules {
            if !seen.insert(m.deprecated.as_str()) {
                return Err(LoadError::DuplicateModule(m.deprecated.clone()));
            }
        }
    }

    let mut modules = Vec::with_capacity(table.modules.len());
    for m in &table.modules {
        let mut symbols = HashMap::new();
        for rule in &m.symbols {
            if deprecated.contains(rule.to.as_str()) {
                return Err(LoadError::ChainedDestination {
                    module: m.deprecated.clone(),
                    symbol: rule.name.clone(),
                    destination: rule.to.clone(),
                });
            }
            if symbols.insert(rule.name.clone(), rule.clone()).is_some() {
                return Err(LoadError::DuplicateSymbol {
                    module: m.deprecated.clone(),
                    symbol: rule.name.clone(),
                });
            }
        }
        modules.push(ModuleRules {
            deprecated: m.deprecated.clone(),
            symbols,
        });
    }

    let mut call_sites = Vec::with_capacity(table.call_sites.len());
    for cs in &table.call_sites {
        if cs.requires_imports_changed && (cs.from.is_none() || cs.to.is_none()) {
            return Err(LoadError::MissingGuard(cs.id.clone()));
        }
        let regex = Regex::new(&cs.pattern).map_err(|source| LoadError::InvalidPattern {
            id: cs.id.clone(),
            source,
        })?;
        call_sites.push(CallSiteRewrite {
            id: cs.id.clone(),
            regex,
            replacement: cs.replacement.clone(),
            requires_imports_changed: cs.requires_imports_changed,
            from: cs.from.clone(),
            symbols: cs.symbols.clone(),
            to: cs.to.clone(),
            priority: cs.priority,
        });
    }

    debug!(
        "compiled {} module rule set(s), {} call-site rule(s)",
        modules.len(),
        call_sites.len()
    );
    Ok(Engine::new(modules, call_sites))
}

/// Load and compile in one step.
pub fn load_engine(path: &Path) -> Result<Engine, LoadError> {
    compile(&load_rules(path)?)
}
