//! Time since boot, from `/proc/uptime`.

use std::fmt;
use std::path::Path;

use serde_json::{Value, json};

use crate::error::Error;
use crate::report::Report;
use crate::sysfs;

const UPTIME: &str = "/proc/uptime";

/// Seconds since boot. The second column of `/proc/uptime` (aggregate idle
/// time) is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uptime {
    pub seconds: f64,
}

impl Uptime {
    pub fn read() -> Result<Uptime, Error> {
        Uptime::read_from(Path::new(UPTIME))
    }

    pub fn read_from(path: &Path) -> Result<Uptime, Error> {
        let text = sysfs::read_required(path)?;
        let token = text.split_whitespace().next().ok_or_else(|| Error::Parse {
            path: path.to_path_buf(),
            detail: "empty uptime file".to_string(),
        })?;
        Ok(Uptime {
            seconds: sysfs::parse_value(path, token)?,
        })
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.seconds as u64;
        let days = total / 86_400;
        let hours = total % 86_400 / 3600;
        let minutes = total % 3600 / 60;
        let seconds = total % 60;
        write!(f, "up ")?;
        match days {
            0 => {}
            1 => write!(f, "1 day, ")?,
            n => write!(f, "{n} days, ")?,
        }
        write!(f, "{hours}:{minutes:02}:{seconds:02}")
    }
}

impl Report for Uptime {
    fn to_json(&self) -> Value {
        json!(self.seconds)
    }
}
