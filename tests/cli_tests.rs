//! End-to-End CLI Tests for dotlink
//!
//! These tests verify the complete CLI behavior by running the binary
//! and checking outputs and file system changes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

struct Workspace {
    _temp_dir: TempDir,
    packages: PathBuf,
    home: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let packages = temp_dir.path().join("dotfiles");
        let home = temp_dir.path().join("home");
        fs::create_dir_all(&packages).unwrap();
        fs::create_dir_all(&home).unwrap();
        Self {
            _temp_dir: temp_dir,
            packages,
            home,
        }
    }

    fn package(&self, name: &str, manifest: serde_json::Value, files: &[&str]) -> PathBuf {
        let root = self.packages.join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("dotlink.json"), manifest.to_string()).unwrap();
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("{name}:{file}")).unwrap();
        }
        root
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("dotlink").unwrap();
        cmd.current_dir(&self.packages)
            .env("HOME", &self.home)
            .env("NO_COLOR", "1");
        cmd
    }
}

fn is_link(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

// =============================================================================
// INSTALL COMMAND TESTS
// =============================================================================

#[test]
#[cfg(unix)]
fn test_cli_install_named_package() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc"]);

    ws.cmd()
        .args(["install", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Install complete"))
        .stdout(predicate::str::contains("Linked: 1"));

    assert!(is_link(&ws.home.join(".zshrc")));
}

#[test]
#[cfg(unix)]
fn test_cli_install_is_idempotent() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc", ".zprofile"]);

    ws.cmd().args(["install", "zsh"]).assert().success();
    ws.cmd()
        .args(["install", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked: 0"))
        .stdout(predicate::str::contains("Already linked: 2"));
}

#[test]
#[cfg(unix)]
fn test_cli_install_uses_target_dir() {
    let ws = Workspace::new();
    let target = ws.home.join(".config");
    fs::create_dir_all(&target).unwrap();
    ws.package(
        "nvim",
        json!({"targetDir": ["{{home}}/missing", "{{home}}/.config"]}),
        &["nvim/init.lua"],
    );

    ws.cmd().args(["install", "nvim"]).assert().success();

    assert!(is_link(&target.join("nvim")));
    assert!(!ws.home.join("missing").exists());
}

#[test]
#[cfg(unix)]
fn test_cli_install_creates_target_dir_when_requested() {
    let ws = Workspace::new();
    ws.package(
        "app",
        json!({"targetDir": ["{{home}}/.app"], "createTargetDirIfNeeded": true}),
        &["config"],
    );

    ws.cmd().args(["install", "app"]).assert().success();

    assert!(is_link(&ws.home.join(".app/config")));
}

#[test]
fn test_cli_install_dry_run_reports_target_dir_creation() {
    let ws = Workspace::new();
    ws.package(
        "app",
        json!({"targetDir": ["{{home}}/.app"], "createTargetDirIfNeeded": true}),
        &["config"],
    );

    ws.cmd()
        .args(["--dry-run", "install", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would create directory"));

    assert!(!ws.home.join(".app").exists());
}

#[test]
fn test_cli_install_dry_run() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc"]);

    ws.cmd()
        .args(["--dry-run", "install", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry-run"))
        .stdout(predicate::str::contains("Would link"));

    assert!(!ws.home.join(".zshrc").exists());
}

#[test]
fn test_cli_install_conflict_skipped_without_terminal() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc"]);
    fs::write(ws.home.join(".zshrc"), "mine").unwrap();

    ws.cmd()
        .args(["install", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped existing"));

    assert_eq!(fs::read_to_string(ws.home.join(".zshrc")).unwrap(), "mine");
}

#[test]
#[cfg(unix)]
fn test_cli_install_conflict_backup() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc"]);
    fs::write(ws.home.join(".zshrc"), "mine").unwrap();

    ws.cmd()
        .args(["install", "zsh", "--on-conflict", "backup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backed up: 1"));

    assert!(is_link(&ws.home.join(".zshrc")));
    assert_eq!(
        fs::read_to_string(ws.home.join(".zshrc.backup")).unwrap(),
        "mine"
    );
}

#[test]
#[cfg(unix)]
fn test_cli_install_all_packages() {
    let ws = Workspace::new();
    ws.package("git", json!({}), &[".gitconfig"]);
    ws.package("zsh", json!({}), &[".zshrc"]);
    fs::create_dir_all(ws.packages.join("not-a-package")).unwrap();

    ws.cmd()
        .args(["--yes", "install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Packages: git, zsh"));

    assert!(is_link(&ws.home.join(".gitconfig")));
    assert!(is_link(&ws.home.join(".zshrc")));
}

#[test]
#[cfg(unix)]
fn test_cli_bulk_install_skips_unsupported_packages() {
    let ws = Workspace::new();
    ws.package("plan9", json!({"platforms": ["plan9"]}), &[".profile"]);
    ws.package(
        "needs-tool",
        json!({"requiresOnPath": ["definitely-not-a-real-executable-xyz"]}),
        &[".toolrc"],
    );
    ws.package("zsh", json!({}), &[".zshrc"]);

    ws.cmd()
        .args(["--yes", "install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping plan9"))
        .stdout(predicate::str::contains("Skipping needs-tool"))
        .stdout(predicate::str::contains("Packages skipped: 2"));

    assert!(!ws.home.join(".profile").exists());
    assert!(!ws.home.join(".toolrc").exists());
    assert!(is_link(&ws.home.join(".zshrc")));
}

#[test]
#[cfg(unix)]
fn test_cli_named_package_bypasses_gating() {
    let ws = Workspace::new();
    ws.package("plan9", json!({"platforms": ["plan9"]}), &[".profile"]);

    ws.cmd().args(["install", "plan9"]).assert().success();

    assert!(is_link(&ws.home.join(".profile")));
}

#[test]
fn test_cli_install_unknown_package_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["install", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown package: nope"));
}

#[test]
fn test_cli_install_missing_manifest_fails() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.packages.join("bare")).unwrap();

    ws.cmd()
        .args(["install", "bare"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No manifest found"));
}

#[test]
fn test_cli_missing_target_dir_aborts_command() {
    let ws = Workspace::new();
    ws.package("broken", json!({"targetDir": ["{{home}}/nowhere"]}), &["file"]);
    ws.package("zsh", json!({}), &[".zshrc"]);

    ws.cmd()
        .args(["--yes", "install"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No target directory found"));

    // Packages after the failing one are never reached
    assert!(!ws.home.join(".zshrc").exists());
}

#[test]
fn test_cli_install_without_packages() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages found"));
}

// =============================================================================
// UNINSTALL COMMAND TESTS
// =============================================================================

#[test]
#[cfg(unix)]
fn test_cli_uninstall_round_trip() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc", ".config/zsh/aliases"]);
    fs::write(ws.home.join(".keep"), "mine").unwrap();

    ws.cmd().args(["install", "zsh"]).assert().success();
    ws.cmd()
        .args(["uninstall", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed: 2"));

    let remaining: Vec<_> = fs::read_dir(&ws.home)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(remaining, vec![".keep"]);
}

#[test]
fn test_cli_uninstall_leaves_unmanaged_files() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc"]);
    fs::write(ws.home.join(".zshrc"), "mine").unwrap();

    ws.cmd()
        .args(["uninstall", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not managed by zsh"))
        .stdout(predicate::str::contains("Not managed: 1"));

    assert_eq!(fs::read_to_string(ws.home.join(".zshrc")).unwrap(), "mine");
}

// =============================================================================
// STATUS AND LIST COMMAND TESTS
// =============================================================================

#[test]
#[cfg(unix)]
fn test_cli_status_json() {
    let ws = Workspace::new();
    ws.package(
        "zsh",
        json!({"ignoredFiles": ["README.md"]}),
        &[".zshrc", "README.md"],
    );
    ws.cmd().args(["install", "zsh"]).assert().success();

    let output = ws.cmd().args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = report[0]["entries"].as_array().unwrap();
    let states: Vec<_> = entries.iter().map(|e| e["state"].as_str().unwrap()).collect();
    assert_eq!(states, vec!["linked", "ignored"]);
    assert_eq!(report[0]["package"], "zsh");
}

#[test]
fn test_cli_status_json_with_missing_target_dir() {
    let ws = Workspace::new();
    ws.package(
        "app",
        json!({"targetDir": ["{{home}}/.app"], "createTargetDirIfNeeded": true}),
        &["config"],
    );

    let output = ws.cmd().args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report[0]["package"], "app");
    assert_eq!(report[0]["entries"][0]["state"], "missing");
    assert!(!ws.home.join(".app").exists());
}

#[test]
fn test_cli_status_reports_conflicts() {
    let ws = Workspace::new();
    ws.package("zsh", json!({}), &[".zshrc"]);
    fs::write(ws.home.join(".zshrc"), "mine").unwrap();

    ws.cmd()
        .args(["status", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Conflict"))
        .stdout(predicate::str::contains("1 conflicts found"));
}

#[test]
fn test_cli_list_packages() {
    let ws = Workspace::new();
    ws.package("git", json!({"description": "Git settings"}), &[]);
    ws.package("plan9", json!({"platforms": ["plan9"]}), &[]);

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("git - Git settings"))
        .stdout(predicate::str::contains("platform"));
}
