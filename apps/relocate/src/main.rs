//! Relocate CLI binary entry point.
//! Delegates to the library for rewrite/scan/rules and prints results.

use clap::Parser;
use log::info;
use relocate::cli::{Cli, Commands};
use relocate::config::{self, Effective};
use relocate::engine::Engine;
use relocate::error::LoadError;
use relocate::utils::{error_prefix, note_prefix};
use relocate::{driver, output, rules, scan};
use std::process::exit;

fn main() {
    let cli = Cli::parse();
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rewrite {
            repo_root,
            rules,
            write,
            diff,
            check,
            strict,
            output,
        } => {
            let eff = or_exit(config::resolve_effective(
                repo_root.as_deref(),
                rules.as_deref(),
                output.as_deref(),
                if write { Some(true) } else { None },
                if diff { Some(true) } else { None },
                if check { Some(true) } else { None },
                if strict { Some(true) } else { None },
            ));
            let engine = load_engine(&eff);
            // CLI/config precedence at runtime:
            // - If diff or check is enabled, force write=false for this run.
            // - Otherwise respect write.
            let eff_write = if eff.diff || eff.check { false } else { eff.write };
            let report = driver::run_rewrite(
                &eff.repo_root,
                &engine,
                &eff.include,
                &eff.exclude,
                eff_write,
                eff.diff,
            );
            output::print_rewrite(&report, &eff.output, eff_write, eff.diff);
            if !eff_write && !eff.check && eff.output != "json" && report.changed() > 0 {
                eprintln!("{} dry run; pass --write to apply changes", note_prefix());
            }
            info!(
                "{} of {} file(s) changed",
                report.changed(),
                report.files.len()
            );
            if !report.errors.is_empty() {
                exit(2);
            }
            if eff.check && report.changed() > 0 {
                exit(1);
            }
            if eff.strict && report.files.iter().any(|f| !f.diagnostics.is_empty()) {
                exit(1);
            }
        }
        Commands::Scan {
            repo_root,
            rules,
            strict,
            output,
        } => {
            let eff = or_exit(config::resolve_effective(
                repo_root.as_deref(),
                rules.as_deref(),
                output.as_deref(),
                None,
                None,
                None,
                if strict { Some(true) } else { None },
            ));
            let engine = load_engine(&eff);
            let (result, errors) =
                scan::run_scan(&eff.repo_root, &engine, &eff.include, &eff.exclude);
            output::print_scan(&result, &eff.output, &errors);
            if !errors.is_empty() {
                exit(2);
            }
            if eff.strict && result.summary.diagnostics > 0 {
                exit(1);
            }
        }
        Commands::Rules {
            repo_root,
            rules: rules_arg,
            output,
        } => {
            let eff = or_exit(config::resolve_effective(
                repo_root.as_deref(),
                rules_arg.as_deref(),
                output.as_deref(),
                None,
                None,
                None,
                None,
            ));
            let path = or_exit(eff.rules_path());
            let table = or_exit(rules::load_rules(path));
            or_exit(rules::compile(&table));
            output::print_rules(&table, &eff.output);
        }
    }
}

/// Load and compile the rules named by `eff`, exiting with status 2 on failure.
fn load_engine(eff: &Effective) -> Engine {
    let path = or_exit(eff.rules_path());
    or_exit(rules::load_engine(path))
}

fn or_exit<T>(res: Result<T, LoadError>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            exit(2);
        }
    }
}
