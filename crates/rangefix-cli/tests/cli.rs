// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! End-to-end runs of the `rangefix` binary against temporary Go trees.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const COUNTING: &str = "package main\n\nfunc main() {\n\tfor i := 0; i < 10; i++ {\n\t\tprintln(i)\n\t}\n}\n";
const RANGED: &str = "package main\n\nfunc main() {\n\tfor i := range 10 {\n\t\tprintln(i)\n\t}\n}\n";
const PLAIN: &str = "package main\n\nfunc f() {\n\tfor i := 1; i < 10; i++ {\n\t}\n}\n";

fn rangefix(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rangefix"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run rangefix")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn rewrites_files_in_place() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.go"), COUNTING).unwrap();

    let out = rangefix(&["main.go"], dir.path());
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(fs::read_to_string(dir.path().join("main.go")).unwrap(), RANGED);
    assert!(stdout(&out).contains("updated main.go (1 loop)"), "{}", stdout(&out));
    assert!(stderr(&out).contains("updating"), "{}", stderr(&out));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.go"), COUNTING).unwrap();

    let out = rangefix(&["--dry-run", "main.go"], dir.path());
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("main.go")).unwrap(), COUNTING);
    assert!(stdout(&out).contains("would update main.go"), "{}", stdout(&out));
    assert!(stderr(&out).contains("would have updated"), "{}", stderr(&out));
}

#[test]
fn directories_are_walked() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::create_dir_all(root.join("vendor/dep")).unwrap();
    fs::write(root.join("pkg/a.go"), COUNTING).unwrap();
    fs::write(root.join("pkg/b.go"), PLAIN).unwrap();
    fs::write(root.join("vendor/dep/c.go"), COUNTING).unwrap();

    let out = rangefix(&["."], root);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(fs::read_to_string(root.join("pkg/a.go")).unwrap(), RANGED);
    assert_eq!(fs::read_to_string(root.join("pkg/b.go")).unwrap(), PLAIN);
    assert_eq!(fs::read_to_string(root.join("vendor/dep/c.go")).unwrap(), COUNTING);
    assert!(stdout(&out).contains("2 files checked, 1 changed, 0 failed"), "{}", stdout(&out));
}

#[test]
fn syntax_error_fails_with_location() {
    let dir = tempfile::tempdir().unwrap();
    let broken = "package main\n\nfunc main() {\n\tx := \n}\n";
    fs::write(dir.path().join("bad.go"), broken).unwrap();
    fs::write(dir.path().join("good.go"), COUNTING).unwrap();

    let out = rangefix(&["bad.go", "good.go"], dir.path());
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("error:"), "{}", stderr(&out));
    assert!(stderr(&out).contains("bad.go:"), "{}", stderr(&out));
    assert_eq!(fs::read_to_string(dir.path().join("bad.go")).unwrap(), broken);
    assert_eq!(fs::read_to_string(dir.path().join("good.go")).unwrap(), RANGED);
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = rangefix(&["nope.go"], dir.path());
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn usage_error_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let out = rangefix(&[], dir.path());
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn json_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.go"), COUNTING).unwrap();
    fs::write(dir.path().join("b.go"), PLAIN).unwrap();

    let out = rangefix(&["--json", "-n", "a.go", "b.go"], dir.path());
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["files"][0]["path"], "a.go");
    assert_eq!(report["files"][0]["status"], "would_update");
    assert_eq!(report["files"][0]["rewrites"], 1);
    assert_eq!(report["files"][1]["status"], "unchanged");
    assert_eq!(report["summary"]["changed"], 1);
    assert_eq!(report["summary"]["failed"], 0);
}

#[test]
fn strict_flag_keeps_mutating_loops() {
    let dir = tempfile::tempdir().unwrap();
    let src = "package main\n\nfunc main() {\n\tfor i := 0; i < 10; i++ {\n\t\ti++\n\t}\n}\n";
    fs::write(dir.path().join("main.go"), src).unwrap();

    let out = rangefix(&["--strict", "main.go"], dir.path());
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("main.go")).unwrap(), src);

    let out = rangefix(&["main.go"], dir.path());
    assert!(out.status.success());
    assert!(fs::read_to_string(dir.path().join("main.go")).unwrap().contains("for i := range 10 {"));
}

#[test]
fn quiet_suppresses_info_logs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.go"), PLAIN).unwrap();

    let out = rangefix(&["-q", "main.go"], dir.path());
    assert!(out.status.success());
    assert!(!stderr(&out).contains("no updates needed"), "{}", stderr(&out));

    let out = rangefix(&["main.go"], dir.path());
    assert!(stderr(&out).contains("no updates needed"), "{}", stderr(&out));
}
