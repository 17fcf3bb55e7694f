//! Command-line behavior through the built binary.

use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::{depwright, write_file};

const PROJECT: &str = r#"{
    "version": "0.3.0",
    "dependencies": {
        "zlib": { "name": "zlib", "version": "1.2.11", "repository": "madler/zlib" },
        "png": { "name": "libpng", "version": "1.6.37", "repository": "glennrp/libpng", "requires": ["zlib"] },
        "cxxopts": { "name": "cxxopts", "version": "2.2.0", "repository": "jarro2783/cxxopts",
                     "files": "include/cxxopts.hpp" }
    }
}"#;

const PRESETS: &str = r#"
[preset.mixin_tests]
build-tests = true

[preset.dev]
mixins = ["mixin_tests"]
build-variant = "debug"

[preset.Release]
build-variant = "release"
"#;

fn project_root() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_file(&temp.path().join("util/project.json"), PROJECT).unwrap();
    temp
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    depwright(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("configure"))
        .stdout(predicate::str::contains("preset"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_status_reports_missing_dependencies() {
    let temp = project_root();
    depwright(temp.path())
        .args(["status", "--source-root"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cxxopts"))
        .stdout(predicate::str::contains("not installed"))
        .stdout(predicate::str::contains("3 of 3 dependencies need installing"));
}

#[test]
fn test_status_tree_shows_prerequisites() {
    let temp = project_root();
    depwright(temp.path())
        .args(["status", "--tree", "--source-root"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("png\n└── zlib"));
}

#[test]
fn test_missing_project_file_fails() {
    let temp = TempDir::new().unwrap();
    depwright(temp.path())
        .args(["status", "--source-root"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("project.json"));
}

#[test]
fn test_show_presets_sorted() {
    let temp = TempDir::new().unwrap();
    let presets = write_file(&temp.path().join("presets.toml"), PRESETS).unwrap();
    depwright(temp.path())
        .args(["preset", "--show-presets", "--preset-file"])
        .arg(&presets)
        .assert()
        .success()
        .stdout("dev\nmixin_tests\nRelease\n");
}

#[test]
fn test_expand_invocation_prints_command() {
    let temp = TempDir::new().unwrap();
    let presets = write_file(&temp.path().join("presets.toml"), PRESETS).unwrap();
    depwright(temp.path())
        .args(["preset", "--preset", "dev", "--dry-run", "--expand-invocation", "--preset-file"])
        .arg(&presets)
        .assert()
        .success()
        .stdout(predicate::str::contains("Using preset 'dev', which expands to"))
        .stdout(predicate::str::contains("configure --dry-run --build-tests --build-variant=debug"));
}

#[test]
fn test_unknown_preset_fails() {
    let temp = TempDir::new().unwrap();
    let presets = write_file(&temp.path().join("presets.toml"), PRESETS).unwrap();
    depwright(temp.path())
        .args(["preset", "--preset", "nightly", "--expand-invocation", "--preset-file"])
        .arg(&presets)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Preset 'nightly' not found"));
}

#[test]
fn test_preset_without_name_fails() {
    let temp = TempDir::new().unwrap();
    let presets = write_file(&temp.path().join("presets.toml"), PRESETS).unwrap();
    depwright(temp.path())
        .args(["preset", "--preset-file"])
        .arg(&presets)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No preset specified"));
}

#[test]
fn test_configure_dry_run_changes_nothing() {
    let temp = TempDir::new().unwrap();
    write_file(
        &temp.path().join("util/project.json"),
        r#"{"dependencies": {"glm": {"name": "GLM", "version": "0.9.9.8", "repository": "g-truc/glm"}}}"#,
    )
    .unwrap();

    depwright(temp.path())
        .args(["configure", "--dry-run", "--cmake-generator", "make", "--source-root"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("cmake -S"))
        .stdout(predicate::str::contains("'Unix Makefiles'"))
        .stdout(predicate::str::contains("Dry run: 1 would be installed, 0 up to date"));

    assert!(!temp.path().join("build").exists());
}

#[test]
fn test_bootstrap_alias() {
    let temp = TempDir::new().unwrap();
    depwright(temp.path())
        .args(["bootstrap", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}
