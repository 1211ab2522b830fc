//! Failure paths: every one of them must still end in a launch.

use arc_updater::core::UpdateError;
use arc_updater::test_utils::{RecordingObserver, ZipEntry, zip_bytes};
use arc_updater::update::{PipelineContext, PipelinePhase, Stage, UpdateOutcome};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{DOWNLOAD_PATH, TestInstall, VERSION_PATH, failed_at};

fn failure(outcome: &UpdateOutcome) -> (Stage, &UpdateError) {
    match outcome {
        UpdateOutcome::Failed { phase, cause } => (*phase, cause.as_ref()),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_version_marker_skips_straight_to_launch() {
    let install = TestInstall::without_marker().await;
    install.serve_version("1.1.0").await;
    install.serve_package(zip_bytes(&[ZipEntry::file("x", b"x")]), 0).await;

    let report = install.run_default().await;

    assert_eq!(
        report.history,
        vec![
            PipelinePhase::CheckingVersion,
            failed_at(Stage::CheckingVersion),
            PipelinePhase::Launching
        ]
    );
    let (_, cause) = failure(&report.outcome);
    assert!(matches!(cause, UpdateError::MissingLocalState { .. }));
    assert_eq!(install.launcher.launched().len(), 1);
}

#[tokio::test]
async fn test_server_errors_mean_no_update() {
    for response in [
        ResponseTemplate::new(500),
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
        ResponseTemplate::new(200).set_body_json(serde_json::json!([])),
        ResponseTemplate::new(200).set_body_json(serde_json::json!([1, 1, 0])),
    ] {
        let install = TestInstall::new("1.0.0").await;
        Mock::given(method("GET"))
            .and(path(VERSION_PATH))
            .respond_with(response)
            .mount(&install.server)
            .await;
        install.serve_package(zip_bytes(&[ZipEntry::file("x", b"x")]), 0).await;

        let report = install.run_default().await;

        assert_eq!(
            report.history,
            vec![PipelinePhase::CheckingVersion, PipelinePhase::NoUpdate, PipelinePhase::Launching]
        );
        assert_eq!(install.launcher.launched().len(), 1);
    }
}

#[tokio::test]
async fn test_version_check_timeout_means_no_update() {
    let install = TestInstall::new("1.0.0").await;
    Mock::given(method("GET"))
        .and(path(VERSION_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!(["1.1.0"]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&install.server)
        .await;

    let mut config = install.config();
    config.connection_timeout_seconds = 1;
    let report = install.run(config, PipelineContext::headless()).await;

    assert!(matches!(report.outcome, UpdateOutcome::NoUpdate));
    assert_eq!(install.launcher.launched().len(), 1);
}

#[tokio::test]
async fn test_download_http_error_fails_download() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&install.server)
        .await;

    let report = install.run_default().await;

    let (stage, cause) = failure(&report.outcome);
    assert_eq!(stage, Stage::Downloading);
    assert!(matches!(cause, UpdateError::Network { .. }));
    assert!(!report.history.contains(&PipelinePhase::Extracting));
    assert_eq!(install.launcher.launched().len(), 1);
}

#[tokio::test]
async fn test_corrupt_package_is_discarded() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    install.serve_package(b"PK\x03\x04 truncated".to_vec(), 1).await;

    let report = install.run_default().await;

    let (stage, cause) = failure(&report.outcome);
    assert_eq!(stage, Stage::Extracting);
    assert!(matches!(cause, UpdateError::Archive(_)));
    assert!(!install.layout.package_path().exists());
    assert_eq!(install.read("arc_companion.exe"), b"old binary");
}

#[tokio::test]
async fn test_cancelled_context_skips_download_and_still_launches() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    install
        .serve_package(zip_bytes(&[ZipEntry::file("arc_companion.exe", b"new binary")]), 0)
        .await;

    let observer = Arc::new(RecordingObserver::default());
    let context = PipelineContext::new(observer.clone());
    context.cancel();

    let report = install.run(install.config(), context).await;

    let (stage, cause) = failure(&report.outcome);
    assert_eq!(stage, Stage::Downloading);
    assert!(matches!(cause, UpdateError::Cancelled));
    assert_eq!(install.read("arc_companion.exe"), b"old binary");
    assert!(!install.layout.package_path().exists());
    assert!(observer.finished());
    assert_eq!(observer.phases().last(), Some(&PipelinePhase::Launching));
    assert_eq!(install.launcher.launched().len(), 1);
}

#[tokio::test]
async fn test_missing_executable_is_reported_not_raised() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.0.0").await;
    std::fs::remove_file(install.layout.executable_path()).unwrap();

    let report = install.run_default().await;

    assert_eq!(report.history.last(), Some(&PipelinePhase::Launching));
    assert_eq!(report.exit_code(), 1);
}
