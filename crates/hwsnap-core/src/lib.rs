//! # hwsnap-core
//!
//! **Point-in-time hardware telemetry for single-board Linux machines.**
//!
//! `hwsnap-core` reads the kernel's hardware monitoring interfaces and turns
//! them into a snapshot report: every hwmon chip with its voltage, fan,
//! temperature, current, power, energy, humidity, and alarm channels, plus
//! board identity, kernel version, uptime, CPU frequency residency, and
//! memory headroom.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hwsnap_core::report;
//!
//! for (name, item) in report::read_all().unwrap() {
//!     println!("{name}:\n{item}\n");
//! }
//! ```
//!
//! ## Architecture
//!
//! Sysfs files → typed readings → sensors → report items
//!
//! Every sensor value is derived the same way: a mandatory raw integer,
//! optionally shifted by a sibling `_offset` file and multiplied by a
//! sibling `_scale` file. Chips whose drivers need more than the generic
//! sysfs layout (PMIC batteries that park their thermistor on a separate
//! IIO device, firmware alarms with unhelpful labels) go through a small
//! per-driver extension registry in [`hwmon`].
//!
//! Every item implements the [`Report`] trait: text through
//! `fmt::Display`, machine output through `to_json`.

pub mod board;
pub mod cpufreq;
pub mod derive;
pub mod error;
pub mod hwmon;
pub mod meminfo;
pub mod reading;
pub mod report;
mod sysfs;
pub mod uname;
pub mod uptime;

pub use error::Error;
pub use hwmon::{Hwmon, Sensor, SensorKind, SensorValue};
pub use reading::Reading;
pub use report::{FOOTER, Report};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
