use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::core::ExtractError;
use crate::utils::path_validation::{is_confined, normalize_entry_path};

/// One validated entry of the update archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position of the entry inside the archive
    pub index: usize,
    /// Path exactly as declared by the archive
    pub declared_path: String,
    /// Normalized path relative to the extraction root
    pub relative_path: PathBuf,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Unix permission bits recorded in the archive, if any
    pub unix_mode: Option<u32>,
}

/// What an extraction wrote to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Regular files written (new or overwritten)
    pub files_written: usize,
    /// Directory entries created
    pub directories_created: usize,
    /// Whether the source archive was removed afterwards
    pub archive_removed: bool,
}

/// Unpacks update archives over the installation without trusting entry paths.
///
/// Extraction is two-pass. The validation pass reads every entry header and
/// resolves its declared path against the root; a single absolute or escaping
/// entry aborts the whole extraction before anything touches the disk. Only
/// then does the commit pass write the entries.
///
/// Each file is written to a temporary file in its destination directory and
/// renamed into place, so an interrupted run never leaves a half-written file
/// under its final name. Existing files are overwritten.
///
/// This is blocking I/O; the pipeline runs it on a blocking worker.
///
/// # Examples
///
/// ```rust,no_run
/// use arc_updater::update::SafeExtractor;
/// use std::path::Path;
///
/// # fn example() -> Result<(), arc_updater::core::ExtractError> {
/// let report = SafeExtractor::extract_safely(
///     Path::new("arc_companion_update.zip"),
///     Path::new("."),
/// )?;
/// println!("{} files updated", report.files_written);
/// # Ok(())
/// # }
/// ```
pub struct SafeExtractor;

impl SafeExtractor {
    /// Validates and extracts `archive_path` into `destination_root`.
    ///
    /// On success the archive file is removed (best-effort).
    ///
    /// # Errors
    ///
    /// - [`ExtractError::BadArchive`] if the archive cannot be opened or read
    /// - [`ExtractError::UnsafePath`] if any entry escapes the root; nothing is written
    /// - [`ExtractError::Io`] if writing an entry fails
    pub fn extract_safely(
        archive_path: &Path,
        destination_root: &Path,
    ) -> Result<ExtractionReport, ExtractError> {
        debug!(
            "Extracting {} into {}",
            archive_path.display(),
            destination_root.display()
        );

        let file = File::open(archive_path).map_err(|e| bad_archive(archive_path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| bad_archive(archive_path, e))?;

        let entries = Self::validate_entries(&mut archive, archive_path)?;
        let mut report = Self::commit_entries(&mut archive, archive_path, &entries, destination_root)?;

        report.archive_removed = match fs::remove_file(archive_path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not remove {}: {e}", archive_path.display());
                false
            }
        };

        info!(
            "Update extracted successfully ({} files, {} directories)",
            report.files_written, report.directories_created
        );
        Ok(report)
    }

    /// Validation pass: resolves every entry path without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsafePath`] for the first absolute or escaping
    /// entry, or [`ExtractError::BadArchive`] when a header cannot be read.
    pub fn validate_entries<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        archive_path: &Path,
    ) -> Result<Vec<ArchiveEntry>, ExtractError> {
        let mut entries = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index).map_err(|e| bad_archive(archive_path, e))?;
            let declared_path = entry.name().to_string();
            let is_dir = entry.is_dir();

            let relative_path = match normalize_entry_path(&declared_path) {
                Some(path) if !(path.as_os_str().is_empty() && !is_dir) => path,
                _ => {
                    warn!("Suspicious file path in zip: {declared_path}");
                    return Err(ExtractError::UnsafePath {
                        entry: declared_path,
                    });
                }
            };

            entries.push(ArchiveEntry {
                index,
                declared_path,
                relative_path,
                is_dir,
                unix_mode: entry.unix_mode(),
            });
        }

        debug!("Validated {} archive entries", entries.len());
        Ok(entries)
    }

    fn commit_entries<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        archive_path: &Path,
        entries: &[ArchiveEntry],
        destination_root: &Path,
    ) -> Result<ExtractionReport, ExtractError> {
        let mut report = ExtractionReport::default();

        for entry in entries {
            if !is_confined(&entry.relative_path) {
                return Err(ExtractError::UnsafePath {
                    entry: entry.declared_path.clone(),
                });
            }
            let target = destination_root.join(&entry.relative_path);

            if entry.is_dir {
                fs::create_dir_all(&target).map_err(|e| io_error(&target, e))?;
                report.directories_created += 1;
                continue;
            }

            let mut source = archive.by_index(entry.index).map_err(|e| bad_archive(archive_path, e))?;
            write_entry(&mut source, &target, entry.unix_mode)?;
            debug!("Extracted {}", entry.relative_path.display());
            report.files_written += 1;
        }

        Ok(report)
    }
}

fn write_entry(source: &mut impl Read, target: &Path, unix_mode: Option<u32>) -> Result<(), ExtractError> {
    let parent = target.parent().ok_or_else(|| {
        io_error(target, io::Error::new(io::ErrorKind::InvalidInput, "entry has no parent directory"))
    })?;
    fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| io_error(target, e))?;
    io::copy(source, staged.as_file_mut()).map_err(|e| io_error(target, e))?;
    staged.as_file().sync_all().map_err(|e| io_error(target, e))?;

    apply_unix_mode(staged.path(), unix_mode).map_err(|e| io_error(target, e))?;

    staged.persist(target).map_err(|e| io_error(target, e.error))?;
    Ok(())
}

#[cfg(unix)]
fn apply_unix_mode(path: &Path, unix_mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match unix_mode {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_unix_mode(_path: &Path, _unix_mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

fn bad_archive(path: &Path, error: impl std::fmt::Display) -> ExtractError {
    ExtractError::BadArchive {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

fn io_error(path: &Path, source: io::Error) -> ExtractError {
    ExtractError::Io {
        path: path.to_path_buf(),
        source,
    }
}
