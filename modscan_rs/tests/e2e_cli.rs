//! End-to-end CLI tests for the modscan binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn modscan() -> Command {
    cargo_bin_cmd!("modscan")
}

fn write_module(dir: &Path, name: &str, imports: &[&str]) {
    let mut content = String::new();
    for import in imports {
        content.push_str("import ");
        content.push_str(import);
        content.push('\n');
    }
    fs::write(dir.join(format!("{name}.mod")), content).expect("write module interface");
}

#[test]
fn shows_help() {
    modscan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("modscan"))
        .stdout(predicate::str::contains("--batch"));
}

#[test]
fn shows_version() {
    modscan()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn scans_a_single_invocation() {
    let tmp = TempDir::new().expect("tmp dir");
    write_module(tmp.path(), "App", &["Core"]);
    write_module(tmp.path(), "Core", &[]);

    modscan()
        .args([
            "--",
            "-module-name",
            "App",
            "-I",
            tmp.path().to_str().expect("utf8 path"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"App\""))
        .stdout(predicate::str::contains("\"Core\""));
}

#[test]
fn rejects_an_empty_invocation() {
    modscan()
        .arg("--")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no invocation arguments"));
}

#[test]
fn unknown_options_exit_with_usage_hint() {
    modscan()
        .arg("--bogus")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown option"));
}

#[test]
fn writes_the_payload_to_a_file() {
    let tmp = TempDir::new().expect("tmp dir");
    write_module(tmp.path(), "App", &[]);
    let out = tmp.path().join("graph.json");

    modscan()
        .args([
            "--output",
            out.to_str().expect("utf8 path"),
            "--",
            "-module-name",
            "App",
            "-I",
            tmp.path().to_str().expect("utf8 path"),
        ])
        .assert()
        .success();

    let payload = fs::read_to_string(&out).expect("payload written");
    assert!(payload.contains("\"App\""));
}

#[test]
fn resolves_a_batch_request_file() {
    let tmp = TempDir::new().expect("tmp dir");
    write_module(tmp.path(), "A", &["Shared"]);
    write_module(tmp.path(), "B", &["Shared"]);
    write_module(tmp.path(), "Shared", &[]);
    let out_a = tmp.path().join("a.json");
    let out_b = tmp.path().join("b.json");

    let requests = serde_json::json!([
        {
            "name": "A",
            "command": ["-module-name", "A"],
            "output_path": out_a.to_str().expect("utf8 path"),
        },
        {
            "name": "B",
            "command": ["-module-name", "B"],
            "output_path": out_b.to_str().expect("utf8 path"),
        },
    ]);
    let batch_file = tmp.path().join("requests.json");
    fs::write(&batch_file, requests.to_string()).expect("write batch file");

    modscan()
        .args([
            "--batch",
            batch_file.to_str().expect("utf8 path"),
            "--verbose",
            "--",
            "-module-name",
            "batch",
            "-I",
            tmp.path().to_str().expect("utf8 path"),
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 batch inputs"));

    let payload_a = fs::read_to_string(&out_a).expect("a.json written");
    assert!(payload_a.contains("\"main_module\": \"A\""));
    let payload_b = fs::read_to_string(&out_b).expect("b.json written");
    assert!(payload_b.contains("\"main_module\": \"B\""));
}
