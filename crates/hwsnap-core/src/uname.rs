//! Kernel identification via `uname(2)`.

use std::ffi::CStr;
use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use crate::report::Report;

/// Fields of `struct utsname` that identify the running kernel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnameInfo {
    pub system: String,
    pub node: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

impl UnameInfo {
    /// Query the running kernel. `uname(2)` cannot fail when handed a valid
    /// buffer, so a refused call yields the empty default instead of an error.
    pub fn read() -> UnameInfo {
        // SAFETY: utsname is plain old data, so the zeroed pattern is a valid
        // initial value for the out parameter.
        let mut raw: libc::utsname = unsafe { std::mem::zeroed() };
        // SAFETY: the pointer is valid for writes and lives past the call.
        if unsafe { libc::uname(&mut raw) } != 0 {
            return UnameInfo::default();
        }
        UnameInfo {
            system: field(&raw.sysname),
            node: field(&raw.nodename),
            release: field(&raw.release),
            version: field(&raw.version),
            machine: field(&raw.machine),
        }
    }
}

/// Decode one fixed-size utsname field.
fn field(raw: &[libc::c_char]) -> String {
    // SAFETY: the kernel NUL-terminates every utsname field.
    let value = unsafe { CStr::from_ptr(raw.as_ptr()) };
    value.to_string_lossy().into_owned()
}

impl fmt::Display for UnameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            &self.system,
            &self.node,
            &self.release,
            &self.version,
            &self.machine,
        ];
        let joined: Vec<&str> = parts
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect();
        write!(f, "{}", joined.join(" "))
    }
}

impl Report for UnameInfo {
    fn to_json(&self) -> Value {
        json!(self)
    }
}
