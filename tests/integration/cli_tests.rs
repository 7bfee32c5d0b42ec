//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn sdkguard() -> Command {
    Command::cargo_bin("sdkguard").expect("binary builds")
}

fn write_file(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "Main.java",
        r#"
        class Main {
            void unguarded(Context ctx) {
                ctx.getDrawable(0);
            }
            void guarded(Context ctx) {
                if (Build.VERSION.SDK_INT >= 21) {
                    ctx.getDrawable(0);
                }
            }
        }
        "#,
    );
    dir
}

#[test]
fn test_help() {
    sdkguard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unguarded Android API call"));
}

#[test]
fn test_version() {
    sdkguard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_json_output_reports_unguarded_call() {
    let project = sample_project();
    sdkguard()
        .arg(project.path())
        .args(["--min-sdk", "19", "--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("getDrawable"))
        .stdout(predicate::str::contains("\"total\": 1"));
}

#[test]
fn test_min_sdk_clears_findings() {
    let project = sample_project();
    sdkguard()
        .arg(project.path())
        .args(["--min-sdk", "21", "--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 0"));
}

#[test]
fn test_json_output_to_file() {
    let project = sample_project();
    let out = project.path().join("report.json");
    sdkguard()
        .arg(project.path())
        .args(["--min-sdk", "19", "--format", "json", "--quiet"])
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report = std::fs::read_to_string(out).unwrap();
    assert!(report.contains("getDrawable"));
    assert!(report.contains("API001") || report.contains("\"requirement\": 21"));
}

#[test]
fn test_empty_project() {
    let dir = TempDir::new().unwrap();
    sdkguard()
        .arg(dir.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("No Kotlin or Java files found"));
}

#[test]
fn test_config_file_sets_min_sdk() {
    let project = sample_project();
    write_file(project.path(), "sdkguard.toml", "min_sdk = 21\n");
    sdkguard()
        .arg(project.path())
        .args(["--format", "json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 0"));
}

#[test]
fn test_compact_format() {
    let project = sample_project();
    sdkguard()
        .arg(project.path())
        .args(["--min-sdk", "19", "--compact", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API001"));
}
