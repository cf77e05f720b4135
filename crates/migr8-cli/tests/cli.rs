//! End-to-end tests of the `migr8` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn migr8() -> Command {
    let mut cmd = Command::cargo_bin("migr8").unwrap();
    cmd.env("NO_COLOR", "1").env("CI", "1").env_remove("RUST_LOG");
    cmd
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, contents) in files {
        let path = temp.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    temp
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

const SCOPE_SOURCE: &str = "import { configureScope } from '@sentry/browser';\nconfigureScope(scope => scope.setTag('a', 'a'));\n";
const SCOPE_MIGRATED: &str = "import { getCurrentScope } from '@sentry/browser';\ngetCurrentScope().setTag('a', 'a');\n";

#[test]
fn list_prints_catalogue() {
    migr8()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("add-migration-comments"))
        .stdout(predicate::str::contains("Tracing Config v7>v8"))
        .stdout(predicate::str::contains("node-instrument-file"));
}

#[test]
fn run_migrates_files() {
    // No package.json, so the manifest rules have nothing to install.
    let temp = project(&[("src/scope.js", SCOPE_SOURCE), ("src/util.js", "export const x = 1;\n")]);

    migr8()
        .args(["run", "--all", "--sdk", "@sentry/browser", "--skip-git-checks", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Migrating @sentry/browser"));

    assert_eq!(read(temp.path(), "src/scope.js"), SCOPE_MIGRATED);
    assert_eq!(read(temp.path(), "src/util.js"), "export const x = 1;\n");
}

#[test]
fn dry_run_writes_nothing() {
    let temp = project(&[("src/scope.js", SCOPE_SOURCE)]);

    migr8()
        .args(["--rule", "configure-scope", "--sdk", "@sentry/browser", "--dry-run", "--skip-git-checks", "--cwd"])
        .arg(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 file would change"));

    assert_eq!(read(temp.path(), "src/scope.js"), SCOPE_SOURCE);
}

#[test]
fn config_file_ignores_and_selects() {
    let temp = project(&[
        (
            ".migr8rc.json",
            r#"{ "sdk": "@sentry/browser", "skipGitChecks": true, "rules": ["configure-scope"], "ignorePatterns": ["**/legacy/**"] }"#,
        ),
        ("src/scope.js", SCOPE_SOURCE),
        ("src/legacy/scope.js", SCOPE_SOURCE),
    ]);

    migr8().arg("--cwd").arg(temp.path()).assert().success();

    assert_eq!(read(temp.path(), "src/scope.js"), SCOPE_MIGRATED);
    assert_eq!(read(temp.path(), "src/legacy/scope.js"), SCOPE_SOURCE);
}

#[test]
fn unknown_rule_fails_with_hint() {
    let temp = project(&[]);
    migr8()
        .args(["--rule", "does-not-exist", "--skip-git-checks", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule 'does-not-exist'"))
        .stderr(predicate::str::contains("migr8 list"));
}

#[test]
fn unknown_config_key_fails() {
    let temp = project(&[(".migr8rc.json", r#"{ "filePattern": ["src/**"] }"#)]);
    migr8()
        .args(["--all", "--skip-git-checks", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn migrated_project_needs_yes() {
    let temp = project(&[
        ("package.json", r#"{ "dependencies": { "@sentry/browser": "^8.1.0" } }"#),
        ("src/scope.js", SCOPE_SOURCE),
    ]);

    migr8()
        .args(["--rule", "configure-scope", "--skip-git-checks", "--cwd"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert_eq!(read(temp.path(), "src/scope.js"), SCOPE_SOURCE);

    migr8()
        .args(["--rule", "configure-scope", "--skip-git-checks", "--yes", "--cwd"])
        .arg(temp.path())
        .assert()
        .success();
    assert_eq!(read(temp.path(), "src/scope.js"), SCOPE_MIGRATED);
}

#[test]
fn verbose_and_quiet_conflict() {
    migr8().args(["-v", "-q", "list"]).assert().failure();
}
