use assert_cmd::Command as AssertCommand;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Temp workspace with input files, an output folder and an isolated config home
struct TestFixture {
    temp_dir: TempDir,
    config_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        TestFixture {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        }
    }

    fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn out_dir(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }

    fn read_output(&self, name: &str) -> String {
        fs::read_to_string(self.out_dir().join(name))
            .unwrap_or_else(|e| panic!("missing output {name}: {e}"))
    }

    fn run(&self, a: &Path, b: &Path, extra: &[&str]) -> Output {
        let exe = env!("CARGO_BIN_EXE_auditcheck");
        Command::new(exe)
            .arg("--a")
            .arg(a)
            .arg("--b")
            .arg(b)
            .arg("--out")
            .arg(self.out_dir())
            .args(extra)
            .env("XDG_CONFIG_HOME", self.config_dir.path())
            .env("APPDATA", self.config_dir.path())
            .env("HOME", self.config_dir.path())
            .env("RUST_LOG", "off")
            .output()
            .expect("failed to run auditcheck")
    }
}

#[test]
fn test_writes_all_outputs() {
    let fx = TestFixture::new();
    let a = fx.create_file("system_a.csv", "id,name\n1,Bob\n2,Ann\n");
    let b = fx.create_file("system_b.csv", "id,name\n2,Ann\n3,Cid\n");

    let output = fx.run(&a, &b, &["--keys", "id", "--compare", "name"]);
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Reconciliation complete."));

    assert_eq!(fx.read_output("missing_in_b.csv"), "id,name\n1,Bob\n");
    assert_eq!(fx.read_output("missing_in_a.csv"), "id,name\n3,Cid\n");
    assert_eq!(fx.read_output("mismatches.csv"), "id,name,name_b\n");
    assert_eq!(fx.read_output("duplicates_a.csv"), "id,name\n");
    assert_eq!(fx.read_output("duplicates_b.csv"), "id,name\n");

    let summary = fx.read_output("summary.txt");
    assert!(summary.starts_with("rows_a: 2\nrows_b: 2\n"));
    assert!(summary.contains("missing_in_b: 1\n"));
    assert!(summary.contains("missing_in_a: 1\n"));
    assert!(summary.contains("mismatches: 0\n"));
    assert!(summary.contains("keys: id\n"));
    assert!(summary.contains("compare_cols: name\n"));

    let report = fx.read_output("report.html");
    assert!(report.contains("Reconciliation: system_a.csv vs system_b.csv"));
}

#[test]
fn test_casefold_flag() {
    let fx = TestFixture::new();
    let a = fx.create_file("a.csv", "id,name\n1, bob \n");
    let b = fx.create_file("b.csv", "id,name\n1,Bob\n");

    let output = fx.run(&a, &b, &["--keys", "id", "--casefold", "--no-html"]);
    assert!(output.status.success());

    assert_eq!(fx.read_output("mismatches.csv"), "id,name,name_b\n");
    assert!(!fx.out_dir().join("report.html").exists());
}

#[test]
fn test_mismatch_without_casefold() {
    let fx = TestFixture::new();
    let a = fx.create_file("a.csv", "id,name\n1,bob\n");
    let b = fx.create_file("b.csv", "id,name\n1,Bob\n");

    let output = fx.run(&a, &b, &["--keys", "id"]);
    assert!(output.status.success());

    assert_eq!(fx.read_output("mismatches.csv"), "id,name,name_b\n1,bob,Bob\n");
}

#[test]
fn test_json_summary() {
    let fx = TestFixture::new();
    let a = fx.create_file("a.csv", "id,name\n1,Bob\n1,Bobby\n2,Ann\n");
    let b = fx.create_file("b.csv", "id,name\n1,Bob\n2,Anne\n");

    let output = fx.run(&a, &b, &["--keys", "id", "--json"]);
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("invalid json output");
    assert_eq!(report["rows_a"], 3);
    assert_eq!(report["duplicates_a"], 2);
    assert_eq!(report["mismatches"], 1);
    assert_eq!(report["keys"], serde_json::json!(["id"]));
    assert_eq!(report["compare_cols"], serde_json::json!(["name"]));
}

#[test]
fn test_invalid_key_exits_non_zero_without_output() {
    let fx = TestFixture::new();
    let a = fx.create_file("a.csv", "id,name\n1,Bob\n");
    let b = fx.create_file("b.csv", "code,name\n1,Bob\n");

    let output = fx.run(&a, &b, &["--keys", "id"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid key column 'id'"), "stderr: {stderr}");
    assert!(!fx.out_dir().exists());
}

#[test]
fn test_unsupported_format_exits_non_zero() {
    let fx = TestFixture::new();
    let a = fx.create_file("a.csv", "id\n1\n");
    let b = fx.create_file("b.txt", "id\n1\n");

    let output = fx.run(&a, &b, &["--keys", "id"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported file type"), "stderr: {stderr}");
}

#[test]
fn test_missing_arguments_rejected() {
    AssertCommand::cargo_bin("auditcheck")
        .unwrap()
        .args(["--a", "a.csv"])
        .assert()
        .failure();
}

#[test]
fn test_help_lists_flags() {
    let assert = AssertCommand::cargo_bin("auditcheck")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("--keys"));
    assert!(stdout.contains("--compare"));
    assert!(stdout.contains("--casefold"));
}
