//! File-level driver around the rewrite engine.
//!
//! Enumerates candidate files from include/exclude globs, rewrites them in
//! parallel, writes back only files whose text changed, and gathers every
//! diagnostic for reporting at the end of the run. Read or write failures on
//! one file are collected as errors and never stop the others.

use crate::engine::Engine;
use crate::models::{Diagnostic, FileDiagnostic};
use glob::Pattern;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file outcome of a rewrite run.
pub struct FileOutcome {
    pub file: String,
    pub changed: bool,
    pub wrote: bool,
    pub preview: Option<String>,
    pub original: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything a rewrite run produced, sorted by file path.
#[derive(Default)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn changed(&self) -> usize {
        self.files.iter().filter(|f| f.changed).count()
    }

    /// All diagnostics tagged with their file, in file order.
    pub fn diagnostics(&self) -> Vec<FileDiagnostic> {
        self.files
            .iter()
            .flat_map(|f| {
                f.diagnostics.iter().map(|d| FileDiagnostic {
                    file: f.file.clone(),
                    diagnostic: d.clone(),
                })
            })
            .collect()
    }
}

/// Collect files under `root` matching any `include` glob and no `exclude`
/// glob. Returns sorted, de-duplicated paths plus messages for bad patterns.
pub fn discover(root: &Path, include: &[String], exclude: &[String]) -> (Vec<PathBuf>, Vec<String>) {
    let mut errors = Vec::new();
    let excludes: Vec<Pattern> = exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pat) => Some(pat),
            Err(e) => {
                errors.push(format!("bad exclude pattern '{p}': {e}"));
                None
            }
        })
        .collect();

    let mut targets: BTreeSet<PathBuf> = BTreeSet::new();
    for pat in include {
        let abs_glob = root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                errors.push(format!("bad include pattern '{pat}': {e}"));
                continue;
            }
        };
        for path in entries.flatten() {
            if !path.is_file() {
                continue;
            }
            let rel = display_path(root, &path);
            if excludes.iter().any(|ex| ex.matches(&rel)) {
                continue;
            }
            targets.insert(path);
        }
    }
    (targets.into_iter().collect(), errors)
}

/// `path` relative to `root` when possible, for display and exclude matching.
pub fn display_path(root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Rewrite every discovered file.
///
/// When `write` is false and `capture_old` is true, changed files carry a
/// preview of the new text and the original for diffing.
pub fn run_rewrite(
    root: &Path,
    engine: &Engine,
    include: &[String],
    exclude: &[String],
    write: bool,
    capture_old: bool,
) -> RunReport {
    let (targets, mut errors) = discover(root, include, exclude);
    info!("rewriting {} candidate file(s)", targets.len());

    let results: Vec<Result<FileOutcome, String>> = targets
        .par_iter()
        .map(|path| rewrite_file(root, engine, path, write, capture_old))
        .collect();

    let mut files = Vec::with_capacity(results.len());
    for r in results {
        match r {
            Ok(outcome) => files.push(outcome),
            Err(e) => errors.push(e),
        }
    }
    files.sort_by(|a, b| a.file.cmp(&b.file));
    RunReport { files, errors }
}

fn rewrite_file(
    root: &Path,
    engine: &Engine,
    path: &Path,
    write: bool,
    capture_old: bool,
) -> Result<FileOutcome, String> {
    let file = display_path(root, path);
    let data = fs::read_to_string(path).map_err(|e| {
        warn!("skipping {file}: {e}");
        format!("failed to read {file}: {e}")
    })?;
    let result = engine.rewrite(&data);
    let mut wrote = false;
    if result.changed && write {
        fs::write(path, &result.text).map_err(|e| format!("failed to write {file}: {e}"))?;
        info!("rewrote {file}");
        wrote = true;
    }
    let preview = (result.changed && !write).then(|| result.text.clone());
    let original = (result.changed && capture_old).then_some(data);
    Ok(FileOutcome {
        file,
        changed: result.changed,
        wrote,
        preview,
        original,
        diagnostics: result.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiagnosticKind;
    use tempfile::tempdir;

    fn engine() -> Engine {
        crate::rules::compile(
            &toml::from_str(
                r#"
[[modules]]
deprecated = "old-pkg"
[[modules.symbols]]
name = "Alpha"
to = "modA"
"#,
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn include() -> Vec<String> {
        crate::config::DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect()
    }

    fn exclude() -> Vec<String> {
        crate::config::DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("node_modules/old-pkg")).unwrap();
        fs::write(root.join("src/a.tsx"), "import { Alpha } from 'old-pkg';\n").unwrap();
        fs::write(root.join("src/b.ts"), "import { Gamma } from 'old-pkg';\n").unwrap();
        fs::write(root.join("src/c.js"), "export const c = 1;\n").unwrap();
        fs::write(root.join("src/readme.md"), "import { Alpha } from 'old-pkg';\n").unwrap();
        fs::write(
            root.join("node_modules/old-pkg/index.js"),
            "import { Alpha } from 'old-pkg';\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_discover_honors_include_and_exclude() {
        let dir = tree();
        let (files, errors) = discover(dir.path(), &include(), &exclude());
        assert!(errors.is_empty());
        let rel: Vec<String> = files.iter().map(|p| display_path(dir.path(), p)).collect();
        assert_eq!(rel, vec!["src/a.tsx", "src/b.ts", "src/c.js"]);
    }

    #[test]
    fn test_dry_run_previews_without_writing() {
        let dir = tree();
        let report = run_rewrite(dir.path(), &engine(), &include(), &exclude(), false, true);
        assert!(report.errors.is_empty());
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.changed(), 1);
        let a = &report.files[0];
        assert_eq!(a.file, "src/a.tsx");
        assert!(!a.wrote);
        assert_eq!(a.preview.as_deref(), Some("import { Alpha } from 'modA';\n"));
        assert_eq!(a.original.as_deref(), Some("import { Alpha } from 'old-pkg';\n"));
        let on_disk = fs::read_to_string(dir.path().join("src/a.tsx")).unwrap();
        assert_eq!(on_disk, "import { Alpha } from 'old-pkg';\n");
    }

    #[test]
    fn test_write_only_touches_changed_files_and_collects_diagnostics() {
        let dir = tree();
        let report = run_rewrite(dir.path(), &engine(), &include(), &exclude(), true, false);
        let on_disk = fs::read_to_string(dir.path().join("src/a.tsx")).unwrap();
        assert_eq!(on_disk, "import { Alpha } from 'modA';\n");
        assert!(report.files[0].wrote);
        assert!(!report.files[1].wrote);
        assert!(report.files[0].preview.is_none());

        let diags = report.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].file, "src/b.ts");
        assert_eq!(diags[0].diagnostic.kind, DiagnosticKind::UnresolvedSymbol);

        // second run finds nothing left to change
        let again = run_rewrite(dir.path(), &engine(), &include(), &exclude(), true, false);
        assert_eq!(again.changed(), 0);
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let dir = tree();
        let (_, errors) = discover(dir.path(), &["src/[".to_string()], &[]);
        assert_eq!(errors.len(), 1);
    }
}
