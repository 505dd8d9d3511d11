//! Board identity from the flattened device tree.
//!
//! Single-board computers expose their identity as device-tree properties
//! under `/proc/device-tree`: NUL-delimited strings rather than the usual
//! newline-terminated pseudo-file content.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::Error;
use crate::report::Report;
use crate::sysfs;

const DEVICE_TREE: &str = "/proc/device-tree";

/// Device-tree identity of the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardInfo {
    /// Compatible machine strings, most specific first.
    pub compatible: Vec<String>,
    pub model: String,
    pub serial: String,
}

impl BoardInfo {
    pub fn read() -> Result<BoardInfo, Error> {
        BoardInfo::read_from(Path::new(DEVICE_TREE))
    }

    /// Read the identity properties from an alternate device-tree root.
    /// All three are mandatory; machines without a device tree report the
    /// whole item as missing.
    pub fn read_from(root: &Path) -> Result<BoardInfo, Error> {
        Ok(BoardInfo {
            compatible: read_string_list(&root.join("compatible"))?,
            model: read_string(&root.join("model"))?,
            serial: read_string(&root.join("serial-number"))?,
        })
    }
}

impl fmt::Display for BoardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}, serial {}", self.model, self.serial)?;
        let quoted: Vec<String> = self.compatible.iter().map(|s| format!("{s:?}")).collect();
        write!(f, "compatible: {}", quoted.join(", "))
    }
}

impl Report for BoardInfo {
    fn to_json(&self) -> Value {
        json!(self)
    }
}

/// Read a NUL-terminated device-tree string property.
fn read_string(path: &Path) -> Result<String, Error> {
    let bytes = sysfs::read_bytes(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .trim_matches('\0')
        .to_string())
}

/// Read a NUL-separated device-tree string-list property.
fn read_string_list(path: &Path) -> Result<Vec<String>, Error> {
    let bytes = sysfs::read_bytes(path)?;
    Ok(bytes
        .split(|&b| b == 0)
        .filter(|part| !part.is_empty())
        .map(|part| String::from_utf8_lossy(part).into_owned())
        .collect())
}
