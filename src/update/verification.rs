use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::constants::DOWNLOAD_CHUNK_SIZE;
use crate::core::DownloadError;

/// Checksum helpers for downloaded update packages.
///
/// The streaming downloader already computes the package digest while the
/// bytes arrive. This verifier compares that digest with one published by the
/// update server, when the server publishes one at all:
///
/// - No `checksum_endpoint` configured: the digest is only logged.
/// - Endpoint configured but no entry for the package: logged, skipped.
/// - Entry found and different: the update is rejected.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Compute the hex SHA-256 of a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the file cannot be read.
    pub async fn compute_sha256(file_path: &Path) -> Result<String, DownloadError> {
        debug!("Computing SHA256 checksum for: {}", file_path.display());

        let mut file = fs::File::open(file_path).await?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; DOWNLOAD_CHUNK_SIZE * 64];
        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(hex::encode(hasher.finalize()))
    }

    /// Compare a computed digest with an expected one.
    ///
    /// Comparison is case-insensitive and ignores a `sha256:` prefix on either side.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ChecksumMismatch`] when they differ.
    pub fn verify_digest(actual: &str, expected: &str) -> Result<(), DownloadError> {
        if normalize(actual) != normalize(expected) {
            return Err(DownloadError::ChecksumMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }

        info!("Checksum verification successful");
        Ok(())
    }

    /// Download and parse a checksum listing, returning the entry for `file_name`.
    ///
    /// The listing is either a single bare digest or `sha256sum` output:
    ///
    /// ```text
    /// 9f86d081884c7d65...  arc_companion_update.zip
    /// ```
    ///
    /// A non-success status yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] when the listing cannot be fetched.
    pub async fn fetch_expected_checksum(
        client: &Client,
        checksums_url: &str,
        file_name: &str,
    ) -> Result<Option<String>, DownloadError> {
        debug!("Fetching checksums from: {checksums_url}");

        let response = client
            .get(checksums_url)
            .send()
            .await
            .map_err(|e| DownloadError::network("checksum fetch", e))?;

        if !response.status().is_success() {
            warn!("Failed to fetch checksums file: HTTP {}", response.status());
            return Ok(None);
        }

        let content = response
            .text()
            .await
            .map_err(|e| DownloadError::network("checksum fetch", e))?;

        let checksum = parse_checksum_listing(&content, file_name);
        if checksum.is_none() {
            warn!("No checksum found for {file_name}");
        }
        Ok(checksum)
    }
}

/// Finds the digest for `file_name` in a checksum listing.
pub fn parse_checksum_listing(content: &str, file_name: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    if let [single] = lines.as_slice() {
        if !single.contains(char::is_whitespace) {
            return Some(single.to_string());
        }
    }

    lines.iter().find_map(|line| {
        let mut parts = line.split_whitespace();
        let checksum = parts.next()?;
        // sha256sum marks binary mode with a leading '*'
        let name = parts.next()?.trim_start_matches('*');
        (name == file_name || name.ends_with(&format!("/{file_name}")))
            .then(|| checksum.to_string())
    })
}

fn normalize(checksum: &str) -> String {
    checksum.trim().trim_start_matches("sha256:").to_ascii_lowercase()
}
