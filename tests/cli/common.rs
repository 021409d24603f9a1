//! Cross-cutting CLI tests (help, version, error handling)

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help() {
    cargo_bin_cmd!("gfmtok")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gfmtok splits GitHub Flavored Markdown"));
}

#[test]
fn test_version() {
    cargo_bin_cmd!("gfmtok")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_subcommand() {
    cargo_bin_cmd!("gfmtok")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_subcommand() {
    cargo_bin_cmd!("gfmtok")
        .arg("invalid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_missing_file_is_an_io_error() {
    cargo_bin_cmd!("gfmtok")
        .args(["parse", "does-not-exist.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_explicit_config() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_file = temp_dir.path().join("broken.toml");
    std::fs::write(&config_file, "[extensions]\ntables = \"yes\"\n").unwrap();

    cargo_bin_cmd!("gfmtok")
        .args(["render", "--config", config_file.to_str().unwrap()])
        .write_stdin("text\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid config"));
}
