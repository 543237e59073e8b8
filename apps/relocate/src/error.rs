//! Errors raised while loading configuration and rules files.
//!
//! The rewrite engine itself never returns these; it reports problems in
//! source files as diagnostics.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid TOML: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{} is not valid YAML: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("module '{0}' is listed more than once")]
    DuplicateModule(String),
    #[error("symbol '{symbol}' of '{module}' has more than one rule")]
    DuplicateSymbol { module: String, symbol: String },
    #[error("symbol '{symbol}' of '{module}' maps to '{destination}', which is itself deprecated")]
    ChainedDestination {
        module: String,
        symbol: String,
        destination: String,
    },
    #[error("call-site rule '{id}' has an invalid pattern: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
    #[error("call-site rule '{0}' requires imports changed but does not name both `from` and `to`")]
    MissingGuard(String),
    #[error("rules are not configured; pass --rules or set `rules` in relocate.toml")]
    RulesNotConfigured,
}
