use std::fmt;

/// Opaque version token.
///
/// Versions are compared for byte equality only. No ordering is assumed:
/// any remote version that differs from the installed one counts as an update,
/// including downgrades and free-form labels.
///
/// # Examples
///
/// ```rust
/// use arc_updater::core::VersionString;
///
/// let local = VersionString::new(" 1.0.0\n");
/// assert_eq!(local.as_str(), "1.0.0");
/// assert_ne!(local, VersionString::new("1.0.0-hotfix"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionString(String);

impl VersionString {
    /// Creates a version token, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// Creates a version token exactly as received, without trimming.
    ///
    /// Used for the server's answer, which is compared byte for byte.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VersionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
