#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper to create a test git repository
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    Command::new("git")
        .args(["init"])
        .current_dir(&repo_path)
        .output()
        .expect("Failed to init git repo");

    Command::new("git")
        .args(["config", "user.name", "Test User"])
        .current_dir(&repo_path)
        .output()
        .expect("Failed to set git user.name");

    Command::new("git")
        .args(["config", "user.email", "test@example.com"])
        .current_dir(&repo_path)
        .output()
        .expect("Failed to set git user.email");

    (temp_dir, repo_path)
}

/// Write a dev-config.toml into `dir` and return its path
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("dev-config.toml");
    fs::write(&path, contents).expect("Failed to write config");
    path
}

/// Write a local override next to an existing dev-config.toml
pub fn write_local_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("dev-config.local.toml");
    fs::write(&path, contents).expect("Failed to write local config");
    path
}

/// Write a guardrails baseline file into `dir` and return its path
pub fn write_baseline(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("package-baseline.toml");
    fs::write(&path, contents).expect("Failed to write baseline");
    path
}

/// Baseline with every tool supported and all requirements declared
pub fn full_baseline() -> &'static str {
    r#"
        [tool_configuration.uv]
        [tool_configuration.pip]
        [tool_configuration.poetry]
        [tool_configuration.pipenv]

        [baseline_requirements]
        python_package_management = "configured_tool"
        venv_management = "tool_managed"
        filesystem_operations = "git_preferred"
        temporary_files = "secure_mktemp"
        development_environment = "devcontainer_isolated"
    "#
}
