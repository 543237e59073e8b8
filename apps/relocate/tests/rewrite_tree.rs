use relocate::models::DiagnosticKind;
use relocate::{config, driver, rules, scan};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const RULES_YAML: &str = r#"
modules:
  - deprecated: old-pkg
    symbols:
      - name: Alpha
        to: modA
      - name: Beta
        to: modB
call_sites: []
"#;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

#[test]
fn rewrite_tree_end_to_end_is_idempotent() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "relocate.toml",
        "rules = \"migrations/ui.yaml\"\ninclude = [\"src/**/*.ts\"]\n[rewrite]\nwrite = true\n",
    );
    write(root, "migrations/ui.yaml", RULES_YAML);
    write(
        root,
        "src/app.ts",
        "import { Alpha, Beta, Gamma } from 'old-pkg';\nAlpha(Beta, Gamma);\n",
    );
    write(root, "src/clean.ts", "import { x } from 'fine';\n");
    write(root, "src/vendor/node_modules/dep.ts", "import { Alpha } from 'old-pkg';\n");

    let eff = config::resolve_effective(root.to_str(), None, None, None, None, None, None).unwrap();
    assert!(eff.write);
    let engine = rules::load_engine(eff.rules_path().unwrap()).unwrap();

    let (before, errors) = scan::run_scan(&eff.repo_root, &engine, &eff.include, &eff.exclude);
    assert!(errors.is_empty());
    assert_eq!(before.summary.imports, 1);
    assert_eq!(before.issues[0].file, "src/app.ts");

    let report = driver::run_rewrite(&eff.repo_root, &engine, &eff.include, &eff.exclude, true, false);
    assert!(report.errors.is_empty());
    assert_eq!(report.changed(), 1);

    let app = fs::read_to_string(root.join("src/app.ts")).unwrap();
    assert!(app.contains("import { Alpha } from 'modA';"));
    assert!(app.contains("import { Beta } from 'modB';"));
    assert!(app.contains("import { Gamma } from 'old-pkg';"));
    assert!(app.ends_with("Alpha(Beta, Gamma);\n"));

    let diags = report.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].file, "src/app.ts");
    assert_eq!(diags[0].diagnostic.kind, DiagnosticKind::UnresolvedSymbol);

    // Excluded and clean files are never touched.
    assert_eq!(
        fs::read_to_string(root.join("src/vendor/node_modules/dep.ts")).unwrap(),
        "import { Alpha } from 'old-pkg';\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("src/clean.ts")).unwrap(),
        "import { x } from 'fine';\n"
    );

    let again = driver::run_rewrite(&eff.repo_root, &engine, &eff.include, &eff.exclude, true, false);
    assert_eq!(again.changed(), 0);
    assert_eq!(fs::read_to_string(root.join("src/app.ts")).unwrap(), app);
}

#[test]
fn missing_rules_is_a_load_error() {
    let dir = tempdir().unwrap();
    // Stop root detection here so an ancestor relocate.toml cannot leak in.
    fs::create_dir(dir.path().join(".git")).unwrap();
    let eff =
        config::resolve_effective(dir.path().to_str(), None, None, None, None, None, None).unwrap();
    assert_eq!(eff.repo_root, dir.path());
    assert!(eff.rules_path().is_err());
}
