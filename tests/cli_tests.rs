//! CLI integration tests
//!
//! These avoid the record/play flows that need real audio hardware; the
//! store-backed commands run against temp directories.

use std::path::Path;
use std::process::Command;

fn geodrop_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_geodrop"))
}

/// Write a one-drop metadata file plus its audio file into `dir`
fn seed_store(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let metadata = r#"[
  {
    "id": "a1b2c3d4-0000-4000-8000-000000000000",
    "coordinate": { "latitude": 37.3349, "longitude": -122.00902 },
    "audio_filename": "a1b2c3d4-0000-4000-8000-000000000000.flac",
    "owner": "Alice",
    "created_at": "2026-08-30T12:34:00Z",
    "notes": "hi"
  }
]"#;
    std::fs::write(dir.join("drops.json"), metadata).unwrap();
    std::fs::write(
        dir.join("a1b2c3d4-0000-4000-8000-000000000000.flac"),
        b"fLaC",
    )
    .unwrap();
}

#[test]
fn help_output() {
    let output = geodrop_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("record"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("play"));
    assert!(stdout.contains("nearby"));
    assert!(stdout.contains("config"));
}

#[test]
fn version_output() {
    let output = geodrop_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("geodrop"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_help() {
    let output = geodrop_bin()
        .args(["config", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("init"));
    assert!(stdout.contains("set"));
    assert!(stdout.contains("get"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("path"));
}

#[test]
fn config_path_command() {
    let tmp = tempfile::tempdir().unwrap();
    let output = geodrop_bin()
        .env("XDG_CONFIG_HOME", tmp.path())
        .args(["config", "path"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("geodrop"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_set_then_get() {
    let tmp = tempfile::tempdir().unwrap();

    let set = geodrop_bin()
        .env("XDG_CONFIG_HOME", tmp.path())
        .args(["config", "set", "owner", "Alice"])
        .output()
        .expect("Failed to execute command");
    assert!(set.status.success());

    let get = geodrop_bin()
        .env("XDG_CONFIG_HOME", tmp.path())
        .args(["config", "get", "owner"])
        .output()
        .expect("Failed to execute command");
    assert!(get.status.success());
    let stdout = String::from_utf8_lossy(&get.stdout);
    assert_eq!(stdout.trim(), "Alice");
}

#[test]
fn config_get_unknown_key() {
    let output = geodrop_bin()
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_rejects_bad_latitude() {
    let tmp = tempfile::tempdir().unwrap();
    let output = geodrop_bin()
        .env("XDG_CONFIG_HOME", tmp.path())
        .args(["config", "set", "latitude", "not-a-number"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("number"),
        "Expected error about numeric value, got: {}",
        stderr
    );
}

#[test]
fn list_empty_store() {
    let tmp = tempfile::tempdir().unwrap();
    let output = geodrop_bin()
        .args(["list", "--data-dir"])
        .arg(tmp.path().join("drops"))
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No drops yet"));
}

#[test]
fn list_seeded_store() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("drops");
    seed_store(&dir);

    let output = geodrop_bin()
        .args(["list", "--data-dir"])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("a1b2c3d4"));
    assert!(stdout.contains("Alice"));
    assert!(stdout.contains("\"hi\""));
}

#[test]
fn nearby_finds_seeded_drop() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("drops");
    seed_store(&dir);

    let output = geodrop_bin()
        .args([
            "nearby",
            "--lat",
            "37.3349",
            "--lon",
            "-122.00902",
            "--data-dir",
        ])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Alice"));
    assert!(stdout.contains("0m away"));
}

#[test]
fn nearby_excludes_distant_drops() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("drops");
    seed_store(&dir);

    // ~5.5km north of the seeded drop
    let output = geodrop_bin()
        .args([
            "nearby",
            "--lat",
            "37.3849",
            "--lon",
            "-122.00902",
            "--data-dir",
        ])
        .arg(&dir)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No drops within"));
}

#[test]
fn play_unknown_id_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let output = geodrop_bin()
        .args(["play", "deadbeef", "--data-dir"])
        .arg(tmp.path().join("drops"))
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No drop matching"));
}

#[test]
fn record_without_position_fails_fast() {
    let tmp = tempfile::tempdir().unwrap();
    let output = geodrop_bin()
        .env("XDG_CONFIG_HOME", tmp.path())
        .args(["record", "--data-dir"])
        .arg(tmp.path().join("drops"))
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No position available"),
        "Expected error about missing position, got: {}",
        stderr
    );
}
