//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "relocate",
    version,
    about = "Relocate imports and call-sites after a dependency migration",
    long_about = "Relocate — rewrites import declarations that name deprecated modules so each symbol is imported from its new home, and applies the call-site rewrites tied to those moves.\n\nConfiguration precedence: CLI > relocate.toml > defaults.",
    after_help = "Examples:\n  relocate scan --rules migrations/ui.toml\n  relocate rewrite --rules migrations/ui.toml --diff\n  relocate rewrite --write\n  relocate rules --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for rewriting, scanning, and inspecting rules.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current relocate version."
    )]
    Version,
    /// Rewrite imports and call-sites
    #[command(
        about = "Rewrite deprecated imports",
        long_about = "Rewrite import declarations of deprecated modules and apply call-site rules. Without --write nothing is changed on disk. When --diff or --check is set, write is disabled.",
        after_help = "Examples:\n  relocate rewrite --rules migrations/ui.toml --diff\n  relocate rewrite --write --strict"
    )]
    Rewrite {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the rules file (TOML or YAML)")]
        rules: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Write changes to files")]
        write: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show diffs for changed files (implies write=false)")]
        diff: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if changes would occur (implies write=false)")]
        check: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any diagnostic is reported")]
        strict: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// List deprecated imports
    #[command(
        about = "Scan for deprecated imports",
        long_about = "List every import declaration that still names a deprecated module, with the diagnostics a rewrite would report. Never writes.",
        after_help = "Examples:\n  relocate scan --rules migrations/ui.toml\n  relocate scan --output json"
    )]
    Scan {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the rules file (TOML or YAML)")]
        rules: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any diagnostic is reported")]
        strict: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Validate and print the rules file
    #[command(
        about = "Show loaded rules",
        long_about = "Load and validate the rules file, then print the mapping table and call-site rules."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Path to the rules file (TOML or YAML)")]
        rules: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
