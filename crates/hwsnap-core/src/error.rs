//! Error types shared by every reader in the crate.

use std::path::PathBuf;

/// Errors raised while reading kernel pseudo-files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file the enclosing item cannot do without is absent.
    #[error("required file missing: {}", path.display())]
    Missing { path: PathBuf },

    /// An I/O failure other than plain absence.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File content that does not parse as the expected value.
    #[error("failed to parse {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },
}

impl Error {
    /// True for [`Error::Missing`]. The full-snapshot aggregation skips
    /// items that fail this way; every other error is fatal.
    pub fn is_missing(&self) -> bool {
        matches!(self, Error::Missing { .. })
    }
}
