//! Small helpers for reading kernel pseudo-files.
//!
//! The distinction that matters throughout the crate is absence versus any
//! other failure: a file that is not there may be optional (identity
//! default) or may make the enclosing item unavailable on this system,
//! while permission errors, encoding surprises, and malformed content are
//! always fatal.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// Read a file that must exist, trimming surrounding whitespace.
///
/// Absence maps to [`Error::Missing`], everything else to [`Error::Read`].
pub(crate) fn read_required(path: &Path) -> Result<String, Error> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::Missing {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read an optional file, trimming surrounding whitespace.
///
/// Absence is `Ok(None)`; other I/O failures are still errors.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, Error> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text.trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read a mandatory file's raw bytes. Device-tree properties are
/// NUL-delimited, so they cannot go through the string helpers.
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, Error> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::Missing {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Parse a token from a file, attaching the path to parse failures.
pub(crate) fn parse_value<T>(path: &Path, text: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text.trim().parse().map_err(|e: T::Err| Error::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Read and parse a mandatory single-value file in one step.
pub(crate) fn read_parse<T>(path: &Path) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = read_required(path)?;
    parse_value(path, &text)
}

/// List a directory's entries sorted by file name, for deterministic
/// output. A missing directory maps to [`Error::Missing`].
pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let iter = match std::fs::read_dir(dir) {
        Ok(iter) => iter,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::Missing {
                path: dir.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(Error::Read {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };
    let mut entries = Vec::new();
    for entry in iter {
        let entry = entry.map_err(|e| Error::Read {
            path: dir.to_path_buf(),
            source: e,
        })?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("name");
        std::fs::write(&path, "cpu_thermal\n").unwrap();
        assert_eq!(read_required(&path).unwrap(), "cpu_thermal");
    }

    #[test]
    fn required_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_required(&dir.path().join("name")).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn optional_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            read_optional(&dir.path().join("temp1_label"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn optional_present_is_some() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp1_label");
        std::fs::write(&path, "CPU\n").unwrap();
        assert_eq!(read_optional(&path).unwrap(), Some("CPU".to_string()));
    }

    #[test]
    fn parse_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp1_input");
        std::fs::write(&path, "not a number\n").unwrap();
        let err = read_parse::<i64>(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("temp1_input"));
    }

    #[test]
    fn read_parse_integer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in0_input");
        std::fs::write(&path, "45000\n").unwrap();
        assert_eq!(read_parse::<i64>(&path).unwrap(), 45000);
    }

    #[test]
    fn entries_come_back_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["hwmon2", "hwmon0", "hwmon1"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let names: Vec<_> = sorted_entries(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["hwmon0", "hwmon1", "hwmon2"]);
    }

    #[test]
    fn missing_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = sorted_entries(&dir.path().join("hwmon")).unwrap_err();
        assert!(err.is_missing());
    }
}
