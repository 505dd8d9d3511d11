//! Memory usage from `/proc/meminfo`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde_json::{Value, json};

use crate::error::Error;
use crate::report::Report;
use crate::sysfs;

const MEMINFO: &str = "/proc/meminfo";

/// Keys shown in the human-readable summary, in this order.
const SUMMARY_KEYS: [&str; 5] = ["MemTotal", "MemAvailable", "Buffers", "Cached", "Active"];

/// The kB-valued counters of `/proc/meminfo`.
#[derive(Debug, Clone, PartialEq)]
pub struct Meminfo {
    /// Values in kB, as reported by the kernel.
    pub stats: BTreeMap<String, u64>,
}

impl Meminfo {
    pub fn read() -> Result<Meminfo, Error> {
        Meminfo::read_from(Path::new(MEMINFO))
    }

    /// Parse a meminfo-format file. Only `<key>: <n> kB` lines are kept;
    /// unit-less counters (HugePages and friends) are ignored.
    pub fn read_from(path: &Path) -> Result<Meminfo, Error> {
        let text = sysfs::read_required(path)?;
        let mut stats = BTreeMap::new();
        for line in text.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let Some(value) = rest.trim_start().strip_suffix(" kB") else {
                continue;
            };
            if let Ok(kb) = value.parse::<u64>() {
                stats.insert(key.to_string(), kb);
            }
        }
        Ok(Meminfo { stats })
    }
}

impl fmt::Display for Meminfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let (Some(&total), Some(&available)) =
            (self.stats.get("MemTotal"), self.stats.get("MemAvailable"))
        {
            if total > 0 {
                let used = 1.0 - available as f64 / total as f64;
                lines.push(format!("Memory usage: {:.2}%", used * 100.0));
            }
        }
        for key in SUMMARY_KEYS {
            if let Some(kb) = self.stats.get(key) {
                lines.push(format!("{key}: {} MB", kb / 1024));
            }
        }
        write!(f, "{}", lines.join("\n"))
    }
}

impl Report for Meminfo {
    fn to_json(&self) -> Value {
        json!(self.stats)
    }
}
