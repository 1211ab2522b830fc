//! Verification against a checksum listing published by the update server.

use arc_updater::core::UpdateError;
use arc_updater::test_utils::{ZipEntry, zip_bytes};
use arc_updater::update::{PipelineContext, Stage, UpdateOutcome};
use sha2::{Digest, Sha256};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{CHECKSUM_PATH, TestInstall};

async fn serve_listing(install: &TestInstall, listing: String) {
    Mock::given(method("GET"))
        .and(path(CHECKSUM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .expect(1)
        .mount(&install.server)
        .await;
}

fn package() -> Vec<u8> {
    zip_bytes(&[
        ZipEntry::file("arc_companion.exe", b"new binary"),
        ZipEntry::file("arc_companion_version.txt", b"1.1.0"),
    ])
}

#[tokio::test]
async fn test_matching_checksum_applies_update() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    let body = package();
    let digest = hex::encode(Sha256::digest(&body));
    install.serve_package(body, 1).await;
    serve_listing(&install, format!("{digest}  arc_companion_update.zip\n")).await;

    let mut config = install.config();
    config.checksum_endpoint = Some("sha256sums.txt".to_string());
    let report = install.run(config, PipelineContext::headless()).await;

    match &report.outcome {
        UpdateOutcome::Applied { sha256, .. } => assert_eq!(sha256.as_deref(), Some(digest.as_str())),
        other => panic!("expected Applied, got {other:?}"),
    }
    assert_eq!(install.read("arc_companion.exe"), b"new binary");
}

#[tokio::test]
async fn test_checksum_mismatch_rejects_package() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    install.serve_package(package(), 1).await;
    serve_listing(&install, format!("{}  arc_companion_update.zip\n", "ab".repeat(32))).await;

    let mut config = install.config();
    config.checksum_endpoint = Some("sha256sums.txt".to_string());
    let report = install.run(config, PipelineContext::headless()).await;

    match &report.outcome {
        UpdateOutcome::Failed { phase, cause } => {
            assert_eq!(*phase, Stage::Downloading);
            assert!(matches!(**cause, UpdateError::ChecksumMismatch { .. }));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(install.read("arc_companion.exe"), b"old binary");
    assert!(!install.layout.package_path().exists());
    assert_eq!(install.launcher.launched().len(), 1);
}

#[tokio::test]
async fn test_checksum_verified_even_with_streaming_hash_disabled() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    install.serve_package(package(), 1).await;
    serve_listing(&install, "00".repeat(32)).await;

    let mut config = install.config();
    config.hash_verification_enabled = false;
    config.checksum_endpoint = Some("sha256sums.txt".to_string());
    let report = install.run(config, PipelineContext::headless()).await;

    match &report.outcome {
        UpdateOutcome::Failed { cause, .. } => {
            assert!(matches!(**cause, UpdateError::ChecksumMismatch { .. }));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_checksum_endpoint_only_logs_digest() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    install.serve_package(package(), 1).await;

    let report = install.run_default().await;

    assert!(report.outcome.is_applied());
    assert_eq!(install.read("arc_companion_version.txt"), b"1.1.0");
}
