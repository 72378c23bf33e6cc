//! End-to-end tests for the `ip-reputation-scan` binary.

use assert_cmd::Command;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn scan(args: &[&Path]) -> (String, Option<i32>) {
    let output = Command::cargo_bin("ip-reputation-scan")
        .unwrap()
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap();

    (String::from_utf8(output.stdout).unwrap(), output.status.code())
}

#[test]
fn test_no_arguments_prints_usage() {
    let (stdout, code) = scan(&[]);
    assert_eq!(code, Some(1));
    assert!(stdout.starts_with("Usage: ip-reputation-scan <logfile1>"));
}

#[test]
fn test_scenario_output() {
    let dir = TempDir::new().unwrap();
    let log = write_file(&dir, "auth.log", "alert from 203.0.113.42 and 192.168.1.10\n");

    let (stdout, code) = scan(&[&log]);
    assert_eq!(code, Some(0));
    assert_eq!(
        stdout,
        "[BLOCKED] IP 203.0.113.42 (China, Tor Exit Node) has been blocked.\n"
    );
}

#[test]
fn test_each_address_reported_once() {
    let dir = TempDir::new().unwrap();
    let first = write_file(
        &dir,
        "first.log",
        "198.51.100.17 failed login\n198.51.100.17 failed login\n",
    );
    let second = write_file(&dir, "second.log", "198.51.100.17 again\n45.83.64.12 port scan\n");

    let (stdout, code) = scan(&[&first, &second]);
    assert_eq!(code, Some(0));
    assert_eq!(
        stdout,
        "[BLOCKED] IP 198.51.100.17 (Russia) has been blocked.\n\
         [BLOCKED] IP 45.83.64.12 (North Korea) has been blocked.\n"
    );
}

#[test]
fn test_missing_source_is_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    let valid = write_file(&dir, "valid.log", "GET / from 45.83.64.12\n");
    let missing = dir.path().join("missing.log");

    let (stdout, code) = scan(&[&valid, &missing]);
    assert_eq!(code, Some(0));
    assert_eq!(
        stdout,
        format!(
            "[BLOCKED] IP 45.83.64.12 (North Korea) has been blocked.\n\
             [ERROR] Log file not found: {}\n",
            missing.display()
        )
    );
}

#[test]
fn test_config_blocklist_and_allowlist() {
    let dir = TempDir::new().unwrap();
    let blocklist = write_file(&dir, "blocklist.txt", "10.9.8.7\n");
    let config = write_file(
        &dir,
        "config.yaml",
        &format!(
            "policy:\n  allowlist: [\"198.51.100.17\"]\nblocklists:\n  - name: local\n    path: {}\n",
            blocklist.display()
        ),
    );
    let log = write_file(&dir, "app.log", "10.9.8.7 198.51.100.17\n");

    let output = Command::cargo_bin("ip-reputation-scan")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .arg(&log)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "[BLOCKED] IP 10.9.8.7 (suspicious activity) has been blocked.\n"
    );
}

#[test]
fn test_print_config() {
    let output = Command::cargo_bin("ip-reputation-scan")
        .unwrap()
        .arg("--print-config")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .contains("blocked_countries"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "bad.yaml", "policy:\n  allowlist: [\"nope\"]\n");

    let output = Command::cargo_bin("ip-reputation-scan")
        .unwrap()
        .arg("--config")
        .arg(&config)
        .arg("--validate")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
