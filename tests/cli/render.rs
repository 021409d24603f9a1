//! Render subcommand tests

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_render_stdin() {
    cargo_bin_cmd!("gfmtok")
        .arg("render")
        .write_stdin("# Title\n\n> quoted <b>\n")
        .assert()
        .success()
        .stdout("<h1>Title</h1>\n<blockquote>\n<p>quoted &lt;b&gt;</p>\n</blockquote>\n");
}

#[test]
fn test_render_file_with_crlf() {
    let temp_dir = TempDir::new().unwrap();
    let test_file = temp_dir.path().join("list.md");
    fs::write(&test_file, "- a\r\n- b\r\n").unwrap();

    cargo_bin_cmd!("gfmtok")
        .args(["render", test_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout("<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
}

#[test]
fn test_render_table_disabled_by_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("gfmtok.toml");
    fs::write(&config_file, "[extensions]\ntables = false\n").unwrap();
    let test_file = temp_dir.path().join("table.md");
    fs::write(&test_file, "a | b\n--|--\n").unwrap();

    cargo_bin_cmd!("gfmtok")
        .args(["render", test_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout("<p>a | b\n--|--</p>\n");
}
