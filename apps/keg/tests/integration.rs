//! Integration tests for keg CLI

use std::path::Path;
use std::process::{Command, Output};

const BINARY: &[u8] = b"#!/bin/sh\necho oxidux 0.4.0\n";

fn keg(prefix: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_keg"))
        .args(args)
        .env("KEG_PREFIX", prefix)
        .env("KEG_RETRIES", "0")
        .env_remove("RUST_LOG")
        .env_remove("KEG_BIN_DIR")
        .env_remove("KEG_FORMULA_DIR")
        .env_remove("KEG_STATE_DB")
        .env_remove("KEG_CACHE_DIR")
        .env("HOME", prefix)
        .env_remove("XDG_CONFIG_HOME")
        .output()
        .expect("Failed to execute keg")
}

fn write_formula(dir: &Path, sha256: &str) -> std::path::PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join("oxidux.toml");
    std::fs::write(
        &path,
        format!(
            r#"
name = "oxidux"
desc = "Reverse proxy and process manager for web app development."
homepage = "https://github.com/jonmast/oxidux"
version = "0.4.0"

[platforms.osx]
url = "https://github.com/jonmast/oxidux/releases/download/v{{version}}/oxidux-v{{version}}-osx"
sha256 = "{sha256}"

[platforms.linux]
url = "https://github.com/jonmast/oxidux/releases/download/v{{version}}/oxidux-v{{version}}-linux"
sha256 = "{sha256}"
"#
        ),
    )
    .unwrap();
    path
}

fn host_tag() -> Option<&'static str> {
    match std::env::consts::OS {
        "macos" => Some("osx"),
        "linux" => Some("linux"),
        _ => None,
    }
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("--version")
        .output()
        .expect("Failed to execute keg");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("keg"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("--help")
        .output()
        .expect("Failed to execute keg");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Formula-driven installer"));
    assert!(stdout.contains("install"));
    assert!(stdout.contains("verify"));
    assert!(stdout.contains("platform"));
}

#[test]
fn test_cli_invalid_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_keg"))
        .arg("invalid-command")
        .output()
        .expect("Failed to execute keg");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_install_requires_formula() {
    let temp = tempfile::tempdir().unwrap();
    let output = keg(temp.path(), &["install"]);
    assert!(!output.status.success());
}

#[test]
fn test_platform_json() {
    let temp = tempfile::tempdir().unwrap();
    let output = keg(temp.path(), &["--json", "platform"]);

    let Some(tag) = host_tag() else {
        assert!(!output.status.success());
        return;
    };
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type"], "PlatformReport");
    assert_eq!(json["data"]["tag"], tag);
}

#[test]
fn test_lint_valid_and_invalid() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_formula(&temp.path().join("work"), &"ab".repeat(32));

    let output = keg(temp.path(), &["--json", "lint", path.to_str().unwrap()]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["artifacts"].as_array().unwrap().len(), 2);

    let bad = write_formula(&temp.path().join("bad"), "not-a-checksum");
    let output = keg(temp.path(), &["lint", bad.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("formula.invalid"));
}

#[test]
fn test_install_list_verify_uninstall() {
    let Some(tag) = host_tag() else {
        return;
    };
    let temp = tempfile::tempdir().unwrap();
    let prefix = temp.path();
    let staging = prefix.join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    std::fs::write(staging.join(format!("oxidux-v0.4.0-{tag}")), BINARY).unwrap();

    write_formula(&prefix.join("formula"), &sha256_of(BINARY));

    let output = keg(
        prefix,
        &["--color", "never", "install", "oxidux", "--from", staging.to_str().unwrap()],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let installed = prefix.join("bin").join("oxidux");
    assert_eq!(std::fs::read(&installed).unwrap(), BINARY);

    let output = keg(prefix, &["--json", "list"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"][0]["name"], "oxidux");
    assert_eq!(json["data"][0]["version"], "0.4.0");

    let output = keg(prefix, &["verify"]);
    assert!(output.status.success());

    std::fs::write(&installed, b"tampered").unwrap();
    let output = keg(prefix, &["verify", "oxidux"]);
    assert!(!output.status.success());

    let output = keg(prefix, &["uninstall", "oxidux"]);
    assert!(output.status.success());
    assert!(!installed.exists());
}

#[test]
fn test_install_checksum_mismatch_places_nothing() {
    let Some(tag) = host_tag() else {
        return;
    };
    let temp = tempfile::tempdir().unwrap();
    let prefix = temp.path();
    let staging = prefix.join("staging");
    std::fs::create_dir_all(&staging).unwrap();
    std::fs::write(staging.join(format!("oxidux-v0.4.0-{tag}")), BINARY).unwrap();
    write_formula(&prefix.join("formula"), &"00".repeat(32));

    let output = keg(
        prefix,
        &["install", "oxidux", "--from", staging.to_str().unwrap()],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("network.checksum_mismatch"));
    assert!(!prefix.join("bin").join("oxidux").exists());
}

/// Digest computed with the same hasher the installer uses
fn sha256_of(data: &[u8]) -> String {
    keg_hash::Checksum::from_data(data).to_hex()
}
