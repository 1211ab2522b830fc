//! The four reference runs of the pipeline.

use arc_updater::core::{ExtractError, UpdateError};
use arc_updater::test_utils::{ZipEntry, zip_bytes};
use arc_updater::update::{PipelineContext, PipelinePhase, Stage, UpdateOutcome};
use std::path::PathBuf;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{DOWNLOAD_PATH, TestInstall, failed_at, files_under};

#[tokio::test]
async fn test_matching_version_launches_without_download() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.0.0").await;
    install.serve_package(zip_bytes(&[ZipEntry::file("x", b"x")]), 0).await;

    let report = install.run_default().await;

    assert_eq!(
        report.history,
        vec![PipelinePhase::CheckingVersion, PipelinePhase::NoUpdate, PipelinePhase::Launching]
    );
    assert!(matches!(report.outcome, UpdateOutcome::NoUpdate));
    assert_eq!(install.read("arc_companion.exe"), b"old binary");
    assert_eq!(install.launcher.launched(), vec![install.layout.executable_path()]);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_new_version_is_downloaded_extracted_and_launched() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    install
        .serve_package(
            zip_bytes(&[
                ZipEntry::dir("assets/"),
                ZipEntry::file("arc_companion.exe", b"new binary"),
                ZipEntry::file("arc_companion_version.txt", b"1.1.0"),
                ZipEntry::file("assets/icons/app.ico", &[0u8, 0, 1, 0, 1, 0]),
            ]),
            1,
        )
        .await;

    let report = install.run_default().await;

    assert_eq!(
        report.history,
        vec![
            PipelinePhase::CheckingVersion,
            PipelinePhase::Downloading,
            PipelinePhase::Extracting,
            PipelinePhase::Launching
        ]
    );
    assert!(report.outcome.is_applied());
    assert_eq!(install.read("arc_companion.exe"), b"new binary");
    assert_eq!(install.read("arc_companion_version.txt"), b"1.1.0");
    assert_eq!(install.read("assets/icons/app.ico"), [0u8, 0, 1, 0, 1, 0]);
    assert!(!install.layout.package_path().exists(), "package must be removed");
    assert_eq!(install.launcher.launched().len(), 1);
}

#[tokio::test]
async fn test_traversal_entry_writes_nothing_and_still_launches() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;
    install
        .serve_package(
            zip_bytes(&[
                ZipEntry::file("arc_companion.exe", b"new binary"),
                ZipEntry::file("../../../etc/passthrough", b"payload"),
            ]),
            1,
        )
        .await;

    let report = install.run_default().await;

    match &report.outcome {
        UpdateOutcome::Failed { phase, cause } => {
            assert_eq!(*phase, Stage::Extracting);
            assert!(matches!(
                **cause,
                UpdateError::Archive(ExtractError::UnsafePath { ref entry }) if entry == "../../../etc/passthrough"
            ));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(report.history.last(), Some(&PipelinePhase::Launching));

    assert_eq!(install.read("arc_companion.exe"), b"old binary");
    assert_eq!(
        files_under(&install.outside()),
        vec![
            PathBuf::from("install/arc_companion.exe"),
            PathBuf::from("install/arc_companion_version.txt"),
        ]
    );
    assert_eq!(install.launcher.launched().len(), 1);
}

#[tokio::test]
async fn test_oversized_package_aborts_before_extraction() {
    let install = TestInstall::new("1.0.0").await;
    install.serve_version("1.1.0").await;

    // 1 MB cap, 10 MB declared
    let mut config = install.config();
    config.max_download_size_mb = 1;
    Mock::given(method("GET"))
        .and(path(DOWNLOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 10 * 1024 * 1024]))
        .mount(&install.server)
        .await;

    let report = install.run(config, PipelineContext::headless()).await;

    assert_eq!(
        report.history,
        vec![
            PipelinePhase::CheckingVersion,
            PipelinePhase::Downloading,
            failed_at(Stage::Downloading),
            PipelinePhase::Launching
        ]
    );
    match &report.outcome {
        UpdateOutcome::Failed { cause, .. } => assert!(matches!(
            **cause,
            UpdateError::PackageTooLarge {
                declared: 10_485_760,
                limit: 1_048_576
            }
        )),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(!install.layout.package_path().exists(), "no package file may be created");
    assert_eq!(install.read("arc_companion.exe"), b"old binary");
    assert_eq!(install.launcher.launched().len(), 1);
}
