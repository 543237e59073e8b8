//! Relocate core library.
//!
//! This crate rewrites JS/TS import declarations that name deprecated
//! modules so that every symbol is imported from its new module, then
//! applies the call-site rewrites tied to those moves.
//!
//! High-level modules:
//! - `engine`: the pure text-to-text rewrite engine (`rewrite`).
//! - `rules`: loading, validating, and compiling the mapping table.
//! - `config`: Discovery and effective configuration resolution.
//! - `driver`: File enumeration, parallel rewrite, and write-back.
//! - `scan`: Read-only report of deprecated imports.
//! - `models`: Rules schema, diagnostics, and result structs.
//! - `output`: Human/JSON printers.
//! - `cli`: CLI argument parsing (binary uses this).
pub mod cli;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod rules;
pub mod scan;
pub mod utils;

pub use engine::{rewrite, Engine};
pub use models::{Diagnostic, DiagnosticKind, RewriteResult};
