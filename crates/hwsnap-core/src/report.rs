//! The report contract and the registry of snapshot items.
//!
//! Every item renders two ways: human-oriented text through [`fmt::Display`]
//! and a machine shape through [`Report::to_json`]. The registry fixes the
//! set of items and their order, so text and JSON output stay congruent.

use std::fmt;

use serde_json::Value;

use crate::board::BoardInfo;
use crate::cpufreq::Cpufreq;
use crate::error::Error;
use crate::hwmon::Hwmon;
use crate::meminfo::Meminfo;
use crate::uname::UnameInfo;
use crate::uptime::Uptime;

/// Closing line of every text snapshot.
pub const FOOTER: &str = "=^.^=";

/// A snapshot item that can render itself as text and as JSON.
pub trait Report: fmt::Display {
    fn to_json(&self) -> Value;
}

/// Parser for one snapshot item.
pub type ParseFn = fn() -> Result<Box<dyn Report>, Error>;

/// Every item in display order.
pub fn all_items() -> Vec<(&'static str, ParseFn)> {
    vec![
        ("uname", read_uname),
        ("system", read_board),
        ("uptime", read_uptime),
        ("cpufreq", read_cpufreq),
        ("memory", read_meminfo),
        ("hwmon", read_hwmon),
    ]
}

/// Parse every item, dropping the ones this machine does not have.
///
/// Absence of an item's source (no device tree, no hwmon class directory)
/// is normal variation between boards and skips the item; any other failure
/// aborts the snapshot.
pub fn read_all() -> Result<Vec<(&'static str, Box<dyn Report>)>, Error> {
    let mut reports = Vec::new();
    for (name, parse) in all_items() {
        match parse() {
            Ok(report) => reports.push((name, report)),
            Err(err) if err.is_missing() => log::debug!("skipping {name}: {err}"),
            Err(err) => return Err(err),
        }
    }
    Ok(reports)
}

fn read_uname() -> Result<Box<dyn Report>, Error> {
    Ok(Box::new(UnameInfo::read()))
}

fn read_board() -> Result<Box<dyn Report>, Error> {
    Ok(Box::new(BoardInfo::read()?))
}

fn read_uptime() -> Result<Box<dyn Report>, Error> {
    Ok(Box::new(Uptime::read()?))
}

fn read_cpufreq() -> Result<Box<dyn Report>, Error> {
    Ok(Box::new(Cpufreq::read()?))
}

fn read_meminfo() -> Result<Box<dyn Report>, Error> {
    Ok(Box::new(Meminfo::read()?))
}

fn read_hwmon() -> Result<Box<dyn Report>, Error> {
    Ok(Box::new(Hwmon::read()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_fixed() {
        let names: Vec<_> = all_items().into_iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            ["uname", "system", "uptime", "cpufreq", "memory", "hwmon"]
        );
    }

    #[test]
    fn snapshot_skips_absent_items() {
        // uname, uptime, and meminfo exist on any Linux machine; items backed
        // by hardware that the test host lacks must be dropped, not fatal.
        let names: Vec<_> = read_all()
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert!(names.contains(&"uname"));
        assert!(names.contains(&"uptime"));
        assert!(names.contains(&"memory"));
    }
}
