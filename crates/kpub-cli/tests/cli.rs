//! End-to-end runs of the `kpub` binary against a temporary database

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn kpub(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("kpub.yaml");
    if !config.exists() {
        std::fs::write(&config, "prepend: keck\nmissions: [keck]\nsciences: [planets]\n").unwrap();
    }
    Command::new(env!("CARGO_BIN_EXE_kpub"))
        .current_dir(dir)
        .arg("-f")
        .arg(dir.join("test.db"))
        .arg("-c")
        .arg(&config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run kpub")
}

#[test]
fn list_empty_database() {
    let dir = TempDir::new().unwrap();
    let out = kpub(dir.path(), &["list"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("# Keck publications"));
    assert!(stdout.contains("0 publications."));
    assert!(dir.path().join("test.db").exists());
}

#[test]
fn export_empty_database() {
    let dir = TempDir::new().unwrap();
    let out = kpub(dir.path(), &["export"]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn save_writes_lists_and_overview() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("site");
    let out = kpub(dir.path(), &["list", "--save", "-o", out_dir.to_str().unwrap()]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    for name in ["kpub.md", "kpub-keck-by-month.md", "kpub-planets.md", "publications.md"] {
        assert!(out_dir.join(name).exists(), "{name} missing");
    }
}

#[test]
fn update_rejects_bad_month() {
    let dir = TempDir::new().unwrap();
    let out = kpub(dir.path(), &["update", "2020-13"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid month"));
}

#[test]
fn config_shows_settings() {
    let dir = TempDir::new().unwrap();
    let out = kpub(dir.path(), &["config"]);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Missions"));
    assert!(stderr.contains("keck"));
}
