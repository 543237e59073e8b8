//! Configuration discovery and effective settings resolution.
//!
//! Relocate reads `relocate.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `rules`: none (must be configured)
//! - `output`: `human`
//! - `include`: JS/TS sources (`**/*.{js,jsx,mjs,cjs,ts,tsx,mts,cts}`)
//! - `exclude`: `node_modules`, `dist`, `build`
//! - `rewrite.write|diff|check|strict`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::LoadError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INCLUDE: &[&str] = &[
    "**/*.js", "**/*.jsx", "**/*.mjs", "**/*.cjs", "**/*.ts", "**/*.tsx", "**/*.mts", "**/*.cts",
];
pub const DEFAULT_EXCLUDE: &[&str] = &["**/node_modules/**", "**/dist/**", "**/build/**"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Rewrite-related configuration section under `[rewrite]`.
pub struct RewriteCfg {
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    /// Fail the run when any diagnostic is produced.
    pub strict: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `relocate.toml|yaml`.
pub struct RelocateConfig {
    pub rules: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    pub rewrite: Option<RewriteCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// Rules file, resolved against `repo_root`.
    pub rules: Option<PathBuf>,
    pub output: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub write: bool,
    pub diff: bool,
    pub check: bool,
    pub strict: bool,
}

impl Effective {
    pub fn rules_path(&self) -> Result<&Path, LoadError> {
        self.rules.as_deref().ok_or(LoadError::RulesNotConfigured)
    }
}

const CONFIG_NAMES: [&str; 3] = ["relocate.toml", "relocate.yaml", "relocate.yml"];

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `relocate.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `RelocateConfig` from `relocate.toml` or `relocate.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<RelocateConfig>, LoadError> {
    let toml_path = root.join("relocate.toml");
    if toml_path.exists() {
        let s = read(&toml_path)?;
        let cfg = toml::from_str(&s).map_err(|source| LoadError::Toml {
            path: toml_path.clone(),
            source,
        })?;
        return Ok(Some(cfg));
    }
    for yml in ["relocate.yaml", "relocate.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = read(&p)?;
            let cfg = serde_yaml::from_str(&s).map_err(|source| LoadError::Yaml {
                path: p.clone(),
                source,
            })?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_rules: Option<&str>,
    cli_output: Option<&str>,
    cli_write: Option<bool>,
    cli_diff: Option<bool>,
    cli_check: Option<bool>,
    cli_strict: Option<bool>,
) -> Result<Effective, LoadError> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root)?.unwrap_or_default();
    let rewrite = cfg.rewrite.unwrap_or_default();

    let rules = cli_rules
        .map(|s| s.to_string())
        .or(cfg.rules)
        .map(|s| repo_root.join(s));

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let include = cfg
        .include
        .unwrap_or_else(|| DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect());
    let exclude = cfg
        .exclude
        .unwrap_or_else(|| DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect());

    Ok(Effective {
        rules,
        output,
        include,
        exclude,
        write: cli_write.or(rewrite.write).unwrap_or(false),
        diff: cli_diff.or(rewrite.diff).unwrap_or(false),
        check: cli_check.or(rewrite.check).unwrap_or(false),
        strict: cli_strict.or(rewrite.strict).unwrap_or(false),
        repo_root,
    })
}
