use reqwest::{Client, Response};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::constants::{BYTES_PER_MB, DOWNLOAD_CHUNK_SIZE};
use crate::core::DownloadError;

/// Progress of a running download.
///
/// Emitted after every chunk written to the sink; `bytes_downloaded` never
/// decreases and the last value equals the total bytes written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes written to the sink so far
    pub bytes_downloaded: u64,
    /// Declared `content-length`, if the server sent one
    pub bytes_total: Option<u64>,
}

impl DownloadProgress {
    /// Completed fraction in `0.0..=1.0`, or `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.bytes_total {
            Some(total) if total > 0 => {
                Some((self.bytes_downloaded as f64 / total as f64).min(1.0))
            }
            _ => None,
        }
    }

    /// Downloaded size in megabytes.
    pub fn megabytes_downloaded(&self) -> f64 {
        self.bytes_downloaded as f64 / BYTES_PER_MB as f64
    }

    /// Declared size in megabytes.
    pub fn megabytes_total(&self) -> Option<f64> {
        self.bytes_total.map(|total| total as f64 / BYTES_PER_MB as f64)
    }

    /// Human-readable progress text, e.g. `Updating: 1.50 MB / 3.00 MB`.
    pub fn describe(&self) -> String {
        match self.megabytes_total() {
            Some(total) => {
                format!("Updating: {:.2} MB / {:.2} MB", self.megabytes_downloaded(), total)
            }
            None => format!("Updating: {:.2} MB", self.megabytes_downloaded()),
        }
    }
}

/// Outcome of a completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Total bytes written to the sink
    pub bytes_written: u64,
    /// Hex SHA-256 of the written bytes, when hash verification is enabled
    pub sha256: Option<String>,
}

/// Streams the update package from the server into a sink.
///
/// The download is split into two steps so the caller only creates its sink
/// once the package has passed the pre-flight size guard:
///
/// 1. [`StreamingDownloader::open`] sends the request, checks the status and
///    rejects a declared `content-length` above the cap.
/// 2. [`PendingDownload::write_to`] streams the body in 1 KiB chunks, feeding
///    the digest and reporting progress after each one.
///
/// [`StreamingDownloader::download`] does both in one call.
///
/// # Size Guard
///
/// An oversized `content-length` aborts before any body byte is read. A body
/// that outgrows the cap without declaring it (missing or lying header) is
/// aborted as soon as the excess arrives; nothing beyond the cap is written.
///
/// # Examples
///
/// ```rust,no_run
/// use arc_updater::config::UpdateConfig;
/// use arc_updater::update::{StreamingDownloader, build_http_client};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = UpdateConfig::default();
/// let downloader = StreamingDownloader::new(build_http_client(&config)?, true);
///
/// let mut sink = Vec::new();
/// let summary = downloader
///     .download(
///         &config.download_url(),
///         &mut sink,
///         |progress| println!("{}", progress.describe()),
///         config.max_package_size_bytes(),
///     )
///     .await?;
/// println!("{} bytes, sha256 {:?}", summary.bytes_written, summary.sha256);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StreamingDownloader {
    client: Client,
    hash_verification: bool,
    cancel: CancellationToken,
}

impl StreamingDownloader {
    /// Creates a downloader; `hash_verification` enables the running SHA-256.
    pub fn new(client: Client, hash_verification: bool) -> Self {
        Self {
            client,
            hash_verification,
            cancel: CancellationToken::new(),
        }
    }

    /// Aborts the body stream between chunks once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Sends the request and applies the pre-flight size guard.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Network`] on transport failure or non-success status
    /// - [`DownloadError::TooLarge`] when `content-length` exceeds `max_bytes`
    pub async fn open(&self, url: &str, max_bytes: u64) -> Result<PendingDownload, DownloadError> {
        debug!("Requesting update package from {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network("download", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::network("download", format!("HTTP {status}")));
        }

        let total = response.content_length();
        match total {
            Some(total) if total > max_bytes => {
                warn!("Update file too large: {total} bytes (max: {max_bytes})");
                return Err(DownloadError::TooLarge {
                    declared: total,
                    limit: max_bytes,
                });
            }
            Some(total) => debug!("Update package is {total} bytes"),
            None => debug!("Update package size unknown"),
        }

        Ok(PendingDownload {
            response,
            total,
            max_bytes,
            hash_verification: self.hash_verification,
            cancel: self.cancel.clone(),
        })
    }

    /// Downloads `url` into `sink`, reporting progress after every chunk.
    ///
    /// # Errors
    ///
    /// See [`StreamingDownloader::open`] and [`PendingDownload::write_to`].
    pub async fn download<W, F>(
        &self,
        url: &str,
        sink: &mut W,
        progress: F,
        max_bytes: u64,
    ) -> Result<DownloadSummary, DownloadError>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(DownloadProgress),
    {
        self.open(url, max_bytes).await?.write_to(sink, progress).await
    }
}

/// A response that passed the pre-flight guard and is ready to stream.
pub struct PendingDownload {
    response: Response,
    total: Option<u64>,
    max_bytes: u64,
    hash_verification: bool,
    cancel: CancellationToken,
}

impl PendingDownload {
    /// Declared `content-length`, if any.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Streams the body into `sink` in 1 KiB chunks.
    ///
    /// `progress` runs on whatever task drives this future; it must not wait on
    /// anything owned by the caller's foreground context.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Network`] when the body stream fails
    /// - [`DownloadError::TooLarge`] when the body exceeds the cap
    /// - [`DownloadError::Cancelled`] when the cancellation token fires
    /// - [`DownloadError::Io`] when writing to the sink fails
    pub async fn write_to<W, F>(
        mut self,
        sink: &mut W,
        mut progress: F,
    ) -> Result<DownloadSummary, DownloadError>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(DownloadProgress),
    {
        let mut stream = ChunkStream {
            hasher: self.hash_verification.then(Sha256::new),
            written: 0,
            total: self.total,
        };
        let mut pending: Vec<u8> = Vec::with_capacity(DOWNLOAD_CHUNK_SIZE);
        let mut received: u64 = 0;

        while let Some(bytes) =
            self.response.chunk().await.map_err(|e| DownloadError::network("download", e))?
        {
            received += bytes.len() as u64;
            if received > self.max_bytes {
                warn!("Update package exceeded {} bytes while streaming", self.max_bytes);
                return Err(DownloadError::TooLarge {
                    declared: received,
                    limit: self.max_bytes,
                });
            }

            let mut rest = &bytes[..];
            while !rest.is_empty() {
                let take = (DOWNLOAD_CHUNK_SIZE - pending.len()).min(rest.len());
                pending.extend_from_slice(&rest[..take]);
                rest = &rest[take..];

                if pending.len() == DOWNLOAD_CHUNK_SIZE {
                    self.check_cancelled(stream.written)?;
                    stream.write(sink, &pending, &mut progress).await?;
                    pending.clear();
                }
            }
        }

        if !pending.is_empty() {
            self.check_cancelled(stream.written)?;
            stream.write(sink, &pending, &mut progress).await?;
        }
        sink.flush().await?;

        let sha256 = stream.hasher.map(|hasher| hex::encode(hasher.finalize()));
        if let Some(digest) = &sha256 {
            info!("Downloaded file SHA256: {digest}");
        }
        info!("Downloaded {} bytes", stream.written);

        Ok(DownloadSummary {
            bytes_written: stream.written,
            sha256,
        })
    }

    fn check_cancelled(&self, downloaded: u64) -> Result<(), DownloadError> {
        if self.cancel.is_cancelled() {
            warn!("Download cancelled after {downloaded} bytes");
            return Err(DownloadError::Cancelled { downloaded });
        }
        Ok(())
    }
}

struct ChunkStream {
    hasher: Option<Sha256>,
    written: u64,
    total: Option<u64>,
}

impl ChunkStream {
    async fn write<W, F>(
        &mut self,
        sink: &mut W,
        chunk: &[u8],
        progress: &mut F,
    ) -> Result<(), DownloadError>
    where
        W: AsyncWrite + Unpin,
        F: FnMut(DownloadProgress),
    {
        sink.write_all(chunk).await?;
        if let Some(hasher) = self.hasher.as_mut() {
            hasher.update(chunk);
        }
        self.written += chunk.len() as u64;
        progress(DownloadProgress {
            bytes_downloaded: self.written,
            bytes_total: self.total,
        });
        Ok(())
    }
}
