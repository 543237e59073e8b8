//! Mapping Table schema as stored on disk (TOML or YAML).
//!
//! Key components:
//! - `modules`: one `ModuleRuleSet` per deprecated module, listing every
//!   symbol it used to export and where that symbol lives now.
//! - `call_sites`: ordered textual rewrites tied to an API substitution.
//!
//! These structs are plain deserialization targets. Validation and regex
//! compilation happen in `crate::rules`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
/// Root of a rules file.
pub struct RuleTable {
    #[serde(default)]
    pub modules: Vec<ModuleRuleSet>,
    #[serde(default)]
    pub call_sites: Vec<CallSiteRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
/// All symbol relocations for one deprecated module.
pub struct ModuleRuleSet {
    pub deprecated: String,
    #[serde(default)]
    pub symbols: Vec<SymbolRule>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
/// Destination of a single exported symbol.
pub struct SymbolRule {
    pub name: String,
    pub to: String,
    /// Name the destination module exports the symbol under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    /// Bind the renamed symbol directly instead of aliasing it back to the
    /// old local name. Only meaningful together with call-site rules that
    /// rename the usages.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub rebind: bool,
}

impl SymbolRule {
    /// Name imported from the destination module.
    pub fn exported_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
/// Textual rewrite of an API usage.
pub struct CallSiteRule {
    pub id: String,
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub requires_imports_changed: bool,
    /// Deprecated module that must no longer be imported for the rule to fire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Restricts the `from` guard to these imported symbols.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,
    /// Destination module that must be imported for the rule to fire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default)]
    pub priority: i32,
}
