//! Path validation for archive entries.
//!
//! Archive entries declare their own relative paths, which makes them the
//! classic vector for path traversal. The helpers here normalize a declared
//! path purely lexically (no file system access) and refuse anything that
//! could land outside the extraction root.

use std::path::{Component, Path, PathBuf};

/// Normalizes an archive entry path relative to the extraction root.
///
/// Backslashes are treated as separators, `.` segments are dropped and `..`
/// segments pop the previous segment. Returns `None` when the path:
///
/// - is absolute (leading `/` or `\`, or a drive prefix such as `C:`)
/// - contains a NUL byte
/// - climbs above the root at any point (`a/../../b`)
///
/// An entry that normalizes to the root itself yields an empty path.
///
/// # Examples
///
/// ```rust
/// use arc_updater::utils::path_validation::normalize_entry_path;
/// use std::path::PathBuf;
///
/// assert_eq!(normalize_entry_path("bin/./app.exe"), Some(PathBuf::from("bin/app.exe")));
/// assert_eq!(normalize_entry_path("bin/../data/x"), Some(PathBuf::from("data/x")));
/// assert_eq!(normalize_entry_path("../../evil.bin"), None);
/// assert_eq!(normalize_entry_path("/etc/passwd"), None);
/// ```
pub fn normalize_entry_path(declared: &str) -> Option<PathBuf> {
    if declared.contains('\0') || has_absolute_form(declared) {
        return None;
    }

    let unified = declared.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.iter().collect())
}

/// Whether a path relative to the extraction root stays beneath it.
///
/// Only plain named segments are accepted. The root itself is never
/// inspected, so it may be spelled with `..` or `.` segments.
pub fn is_confined(relative: &Path) -> bool {
    relative.components().all(|c| matches!(c, Component::Normal(_)))
}

fn has_absolute_form(declared: &str) -> bool {
    if declared.starts_with('/') || declared.starts_with('\\') {
        return true;
    }

    let bytes = declared.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return true;
    }

    Path::new(declared).is_absolute()
        || Path::new(declared).components().any(|c| matches!(c, Component::Prefix(_)))
}
