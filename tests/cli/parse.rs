//! Parse subcommand tests

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_parse_stdin() {
    cargo_bin_cmd!("gfmtok")
        .arg("parse")
        .write_stdin("> abc\n> def\n")
        .assert()
        .success()
        .stdout(
            "[block-quote(1,1)::> \\n> ]\n\
             [para(1,3):]\n\
             [text(1,3):abc\\ndef::\\n]\n\
             [end-para:::true]\n\
             [end-block-quote:::true]\n\
             [BLANK(3,1):]\n",
        );
}

#[test]
fn test_parse_file() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("test.md");
    fs::write(&test_file, "# Heading\n\n- item\n").unwrap();

    cargo_bin_cmd!("gfmtok")
        .args(["parse", test_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[atx(1,1):1:0:]"))
        .stdout(predicate::str::contains("[ulist(3,1):-::2:"))
        .stdout(predicate::str::contains("[end-ulist:::true]"));
}

#[test]
fn test_parse_json() {
    let output = cargo_bin_cmd!("gfmtok")
        .args(["parse", "--json"])
        .write_stdin("[foo]: /url\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let tokens = value["tokens"].as_array().unwrap();
    assert_eq!(tokens[0]["type"], "link-reference-definition");
    assert_eq!(tokens[0]["link_destination"], "/url");
    assert_eq!(value["link_definitions"]["foo"]["destination"], "/url");
}

#[test]
fn test_parse_with_config_in_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let docs = temp_dir.path().join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(
        temp_dir.path().join(".gfmtok.toml"),
        "[extensions]\ntables = false\n",
    )
    .unwrap();
    let test_file = docs.join("table.md");
    fs::write(&test_file, "a | b\n--|--\n").unwrap();

    cargo_bin_cmd!("gfmtok")
        .args(["parse", test_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[para(1,1):]"))
        .stdout(predicate::str::contains("[table(").not());
}

#[test]
fn test_parse_front_matter_with_explicit_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("custom.toml");
    fs::write(&config_file, "[extensions]\nfront_matter = true\n").unwrap();

    cargo_bin_cmd!("gfmtok")
        .args(["parse", "--config", config_file.to_str().unwrap()])
        .write_stdin("---\ntitle: x\n---\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[front-matter(1,1):---:---:"));
}
