//! Integration tests for the jqview CLI binary.

use std::io::Write;

use assert_cmd::Command;
use tempfile::NamedTempFile;

fn jqview() -> Command {
    Command::cargo_bin("jqview").expect("binary not built")
}

#[test]
fn test_filter_over_stdin() {
    jqview()
        .arg(".[].fruit")
        .write_stdin(r#"[{"fruit":"mango"},{"fruit":"banana"}]"#)
        .assert()
        .success()
        .stdout("\"mango\"\n\"banana\"\n");
}

#[test]
fn test_default_filter_is_identity() {
    jqview()
        .write_stdin("{\"a\": 1}")
        .assert()
        .success()
        .stdout("{\n  \"a\": 1\n}\n");
}

#[test]
fn test_file_input() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"count": 3}}"#).expect("write temp file");

    jqview()
        .arg(".count")
        .arg(file.path())
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_colors_flag_emits_html() {
    let output = jqview()
        .arg("--colors")
        .arg(".")
        .write_stdin("[1]")
        .output()
        .expect("run binary");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.starts_with("<div"));
    assert!(stdout.contains("&nbsp;&nbsp;1</span>"));
}

#[test]
fn test_parse_error_shown_as_output() {
    // Errors are folded into the display string, not process failures.
    jqview()
        .arg(".")
        .write_stdin("not json")
        .assert()
        .success()
        .stdout(predicates::str::starts_with("invalid JSON"));
}

#[test]
fn test_filter_error_shown_as_output() {
    jqview()
        .arg(".foo[")
        .write_stdin("{}")
        .assert()
        .success()
        .stdout(predicates::str::starts_with("invalid filter"));
}

#[test]
fn test_missing_file_fails() {
    jqview()
        .arg(".")
        .arg("/nonexistent/input.json")
        .assert()
        .failure();
}
