//! End-to-end runs of the `featgraph` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn featgraph() -> Command {
    Command::new(env!("CARGO_BIN_EXE_featgraph"))
}

fn clean_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "public/servlet-4.0/com.example.servlet-4.0.feature",
        "symbolicName=com.example.servlet-4.0\nvisibility=public\nsingleton=true\nIBM-ShortName: servlet-4.0\nkind=ga\nedition=core\n",
    );
    write(
        root,
        "public/servlet-4.0/resources/l10n/com.example.servlet-4.0.properties",
        "description=Servlet 4.0\n",
    );
    write(
        root,
        "private/com.example.servlet.internal-4.0.feature",
        "symbolicName=com.example.servlet.internal-4.0\nkind=ga\nedition=core\n",
    );
    temp
}

fn conflicting_tree() -> TempDir {
    let temp = clean_tree();
    let root = temp.path();
    write(
        root,
        "public/a-1.0/com.example.a-1.0.feature",
        "symbolicName=com.example.a-1.0\nvisibility=public\nIBM-ShortName: a-1.0\nkind=ga\nedition=core\n-features=com.example.b-1.0\n",
    );
    write(
        root,
        "public/a-1.0/resources/l10n/com.example.a-1.0.properties",
        "",
    );
    write(
        root,
        "private/com.example.b-1.0.feature",
        "symbolicName=com.example.b-1.0\nkind=beta\nedition=core\n",
    );
    temp
}

#[test]
fn check_on_clean_tree_succeeds() {
    let temp = clean_tree();
    featgraph()
        .arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 features checked, no findings"));
}

#[test]
fn check_reports_conflicts_and_fails() {
    let temp = conflicting_tree();
    featgraph()
        .arg("check")
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[kind-conflict] com.example.a-1.0"));
}

#[test]
fn check_json_lists_findings() {
    let temp = conflicting_tree();
    let output = featgraph()
        .args(["check", "--format", "json"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["features"], 4);
    assert_eq!(summary["counts"]["kind-conflict"], 1);
}

#[test]
fn conflicts_text_names_the_violator() {
    let temp = conflicting_tree();
    featgraph()
        .arg("conflicts")
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "com.example.a-1.0 -> com.example.b-1.0 (kind)",
        ));
}

#[test]
fn conflicts_merged_on_clean_tree() {
    let temp = clean_tree();
    featgraph()
        .args(["conflicts", "--merged"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout("no conflicts\n");
}

#[test]
fn cohorts_lists_public_versions() {
    let temp = clean_tree();
    featgraph()
        .arg("cohorts")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example.servlet: 4.0"));
}

#[test]
fn show_prints_feature_details() {
    let temp = clean_tree();
    featgraph()
        .arg("show")
        .arg(temp.path())
        .args(["--feature", "com.example.servlet-4.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("visibility:   public"))
        .stdout(predicate::str::contains("short name:   servlet-4.0"));
}

#[test]
fn show_unknown_feature_exits_with_not_found() {
    let temp = clean_tree();
    featgraph()
        .arg("show")
        .arg(temp.path())
        .args(["--feature", "com.example.nothing-1.0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Feature not found: com.example.nothing-1.0"));
}

#[test]
fn duplicate_feature_exits_with_code_three() {
    let temp = clean_tree();
    write(
        temp.path(),
        "private/copy/com.example.servlet.internal-4.0.feature",
        "symbolicName=com.example.servlet.internal-4.0\n",
    );
    featgraph()
        .arg("check")
        .arg(temp.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("com.example.servlet.internal-4.0"));
}

#[test]
fn invalid_config_exits_with_code_five() {
    let temp = clean_tree();
    write(temp.path(), "featgraph.toml", "disabled_rules = 7\n");
    featgraph()
        .arg("check")
        .arg(temp.path())
        .assert()
        .code(5);
}

#[test]
fn disabled_rule_is_not_reported() {
    let temp = conflicting_tree();
    let config = temp.path().join("custom.toml");
    fs::write(&config, "disabled_rules = [\"kind-conflict\"]\n").unwrap();
    featgraph()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(temp.path())
        .assert()
        .success();
}

#[test]
fn missing_roots_is_a_usage_error() {
    featgraph().arg("check").assert().failure();
}
