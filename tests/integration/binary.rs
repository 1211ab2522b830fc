//! Runs of the compiled `arc-updater` executable.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::VERSION_PATH;

fn updater(install_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("arc-updater").unwrap();
    cmd.arg("--install-dir")
        .arg(install_dir)
        .arg("--no-progress")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("arc-updater")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--install-dir"))
        .stdout(predicate::str::contains("--no-progress"));
}

#[test]
fn test_empty_install_exits_with_failure() {
    let temp = TempDir::new().unwrap();

    updater(temp.path())
        .arg("--verbose")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Version file not found"))
        .stderr(predicate::str::contains("Executable not found"));
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.json"), "{ not json").unwrap();

    updater(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Using defaults"));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_up_to_date_install_launches_application() {
    use std::os::unix::fs::PermissionsExt;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VERSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["1.0.0"])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let exe = temp.path().join("arc_companion.exe");
    std::fs::write(&exe, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(temp.path().join("arc_companion_version.txt"), "1.0.0\n").unwrap();
    std::fs::write(
        temp.path().join("config.json"),
        json!({ "update_server": server.uri(), "connection_timeout_seconds": 5 }).to_string(),
    )
    .unwrap();

    let install_dir = temp.path().to_path_buf();
    // The mock server lives on this runtime; run the blocking child elsewhere.
    tokio::task::spawn_blocking(move || {
        updater(&install_dir)
            .assert()
            .code(0)
            .stderr(predicate::str::contains("No new version available"));
    })
    .await
    .unwrap();
}
