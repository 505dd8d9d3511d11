//! hwmon sensor discovery, vendor extensions, and rendering.
//!
//! Every group under `/sys/class/hwmon` is parsed into a generic
//! [`Sensor`]: one value per `<prefix><n>_input` channel file, plus one
//! value per `*_alarm` file. Drivers with known quirks then get a second
//! pass through a vendor extension that can augment or relabel the generic
//! readings, or decline and leave them untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::derive;
use crate::error::Error;
use crate::reading::{Reading, write_float};
use crate::sysfs;

/// hwmon tree root.
const HWMON: &str = "/sys/class/hwmon";

// ---------------------------------------------------------------------------
// Sensor kinds
// ---------------------------------------------------------------------------

/// Sensor classes defined by the hwmon sysfs interface.
///
/// Channel files are named `<prefix><n>_input`. Alarms are the exception:
/// they are discovered by their `_alarm` suffix instead of a prefix.
/// Variant order fixes discovery order within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Voltage,
    Fan,
    FanPwm,
    Temperature,
    Current,
    Power,
    Energy,
    Humidity,
    Alarm,
}

impl SensorKind {
    /// All kinds in discovery order.
    pub const ALL: [SensorKind; 9] = [
        SensorKind::Voltage,
        SensorKind::Fan,
        SensorKind::FanPwm,
        SensorKind::Temperature,
        SensorKind::Current,
        SensorKind::Power,
        SensorKind::Energy,
        SensorKind::Humidity,
        SensorKind::Alarm,
    ];

    /// Channel file prefix: `in` matches `in0_input`, `in1_input`, and so on.
    pub fn prefix(self) -> &'static str {
        match self {
            SensorKind::Voltage => "in",
            SensorKind::Fan => "fan",
            SensorKind::FanPwm => "pwm",
            SensorKind::Temperature => "temp",
            SensorKind::Current => "curr",
            SensorKind::Power => "power",
            SensorKind::Energy => "energy",
            SensorKind::Humidity => "humidity",
            SensorKind::Alarm => "alarm",
        }
    }

    /// Canonical unit of the stored value, if any. A leading `m` marks a
    /// value kept at 1000x the natural unit; display divides it away.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            SensorKind::Voltage => Some("mV"),
            SensorKind::Temperature => Some("m°C"),
            SensorKind::Current => Some("mA"),
            SensorKind::Power => Some("µW"),
            SensorKind::Energy => Some("µJ"),
            SensorKind::Fan | SensorKind::FanPwm | SensorKind::Humidity | SensorKind::Alarm => None,
        }
    }

    /// Lowercase name, used as the default label and the JSON type tag.
    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Voltage => "voltage",
            SensorKind::Fan => "fan",
            SensorKind::FanPwm => "fan_pwm",
            SensorKind::Temperature => "temperature",
            SensorKind::Current => "current",
            SensorKind::Power => "power",
            SensorKind::Energy => "energy",
            SensorKind::Humidity => "humidity",
            SensorKind::Alarm => "alarm",
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor values
// ---------------------------------------------------------------------------

/// One labeled reading within a sensor group.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorValue {
    /// Channel label, if the driver provides one. Alarm values carry the
    /// alarm file name here.
    pub label: Option<String>,
    pub kind: SensorKind,
    pub value: Reading,
}

impl SensorValue {
    /// Structured form: `type` and `value` always, `unit` and `label` only
    /// when present.
    pub fn to_json(&self) -> Value {
        let mut data = Map::new();
        data.insert("type".to_string(), json!(self.kind.name()));
        data.insert("value".to_string(), json!(self.value));
        if let Some(unit) = self.kind.unit() {
            data.insert("unit".to_string(), json!(unit));
        }
        if let Some(label) = &self.label {
            data.insert("label".to_string(), json!(label));
        }
        Value::Object(data)
    }
}

impl fmt::Display for SensorValue {
    /// Milli-scaled values are divided down to the natural unit for
    /// reading; micro-scaled ones (power, energy) are left as stored.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label.as_deref().unwrap_or(self.kind.name());
        match self.kind.unit() {
            Some(unit) => match unit.strip_prefix('m') {
                Some(natural) => {
                    write!(f, "{label}: ")?;
                    write_float(f, self.value.as_f64() / 1000.0)?;
                    write!(f, " {natural}")
                }
                None => write!(f, "{label}: {} {unit}", self.value),
            },
            None => write!(f, "{label}: {}", self.value),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic parse
// ---------------------------------------------------------------------------

/// One hwmon group, keyed by its driver name.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub name: String,
    pub values: Vec<SensorValue>,
}

impl Sensor {
    /// Parse a hwmon group directory, applying the vendor extension
    /// registered for its driver name, if any. An extension that declines
    /// leaves the generic readings in place.
    pub fn parse(dir: &Path) -> Result<Sensor, Error> {
        let sensor = Sensor::parse_generic(dir)?;
        match extension_for(&sensor.name) {
            None => Ok(sensor),
            Some(extend) => match extend(dir, sensor) {
                Ok(extended) => Ok(extended),
                Err(ExtendError::NotSupported(generic)) => {
                    log::debug!(
                        "{}: vendor extension declined, keeping generic readings",
                        generic.name
                    );
                    Ok(generic)
                }
                Err(ExtendError::Fatal(err)) => Err(err),
            },
        }
    }

    /// Parse a group without extension dispatch.
    fn parse_generic(dir: &Path) -> Result<Sensor, Error> {
        let name = sysfs::read_required(&dir.join("name"))?;
        let entries = sysfs::sorted_entries(dir)?;
        let mut values = Vec::new();
        for kind in SensorKind::ALL {
            if kind == SensorKind::Alarm {
                continue;
            }
            for path in &entries {
                let Some(channel) = channel_for(path, kind) else {
                    continue;
                };
                let label = sysfs::read_optional(&dir.join(format!("{channel}_label")))?;
                let value = derive::channel_value(dir, &channel)?;
                values.push(SensorValue { label, kind, value });
            }
        }
        for path in &entries {
            let Some(file_name) = file_name_str(path) else {
                continue;
            };
            if !file_name.ends_with("_alarm") {
                continue;
            }
            values.push(SensorValue {
                label: Some(file_name.to_string()),
                kind: SensorKind::Alarm,
                value: Reading::Int(sysfs::read_parse(path)?),
            });
        }
        Ok(Sensor { name, values })
    }

    /// Structured form: `{"name": ..., "values": [...]}`.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "values": self.values.iter().map(SensorValue::to_json).collect::<Vec<_>>(),
        })
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sensor {}:", self.name)?;
        for value in &self.values {
            write!(f, "\n  {value}")?;
        }
        Ok(())
    }
}

/// Channel id for a `<prefix><n>_input` file of the given kind: the file
/// name up to the first underscore.
fn channel_for(path: &Path, kind: SensorKind) -> Option<String> {
    let name = file_name_str(path)?;
    if !name.starts_with(kind.prefix()) || !name.ends_with("_input") {
        return None;
    }
    let (channel, _) = name.split_once('_')?;
    Some(channel.to_string())
}

fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

// ---------------------------------------------------------------------------
// Vendor extensions
// ---------------------------------------------------------------------------

/// Why a vendor extension did not produce an extended sensor.
#[derive(Debug)]
enum ExtendError {
    /// A topology precondition failed; the untouched generic sensor is
    /// handed back to the caller.
    NotSupported(Sensor),
    /// A real failure inside the extension.
    Fatal(Error),
}

impl From<Error> for ExtendError {
    fn from(err: Error) -> Self {
        ExtendError::Fatal(err)
    }
}

type ExtendFn = fn(&Path, Sensor) -> Result<Sensor, ExtendError>;

/// Vendor extension for a driver name, if one is registered.
fn extension_for(name: &str) -> Option<ExtendFn> {
    match name {
        "axp20x_battery" => Some(extend_axp20x_battery),
        "rpi_volt" => Some(relabel_rpi_volt),
        _ => None,
    }
}

/// Ancestor directory marking the AXP20x battery power supply.
const AXP_POWER_SUPPLY: &str = "axp20x-battery-power-supply";
/// Expected target of the controller's `driver` symlink.
const AXP_DRIVER: &str = "axp20x-rsb";
/// Sibling device exposing the battery temperature ADC.
const AXP_ADC: &str = "axp813-adc";

/// Battery temperature for the AXP20x PMIC (Pinephone and friends).
///
/// The controller reports battery temperature through a sibling IIO ADC
/// rather than hwmon. Walk the resolved hwmon path upward to the
/// power-supply directory, verify the controller's driver, then read the
/// ADC's `in_temp` channel.
fn extend_axp20x_battery(dir: &Path, base: Sensor) -> Result<Sensor, ExtendError> {
    let Ok(resolved) = dir.canonicalize() else {
        return Err(ExtendError::NotSupported(base));
    };
    let mut battery = None;
    for ancestor in resolved.ancestors().skip(1) {
        if ancestor.file_name().is_some_and(|n| n == AXP_POWER_SUPPLY) {
            battery = Some(ancestor);
        }
    }
    let Some(controller) = battery.and_then(Path::parent) else {
        return Err(ExtendError::NotSupported(base));
    };
    let driver_matches = controller
        .join("driver")
        .canonicalize()
        .is_ok_and(|target| target.file_name().is_some_and(|n| n == AXP_DRIVER));
    if !driver_matches {
        return Err(ExtendError::NotSupported(base));
    }
    let Some(iio) = first_iio_device(&controller.join(AXP_ADC)) else {
        return Err(ExtendError::NotSupported(base));
    };

    let value = derive::adc_value(&iio, "in_temp")?;
    let mut values = base.values;
    values.push(SensorValue {
        label: None,
        kind: SensorKind::Temperature,
        value,
    });
    Ok(Sensor {
        name: base.name,
        values,
    })
}

/// First `iio:device*` entry under the ADC directory, if any.
fn first_iio_device(adc: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(adc).ok()?;
    let mut devices: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| file_name_str(p).is_some_and(|n| n.starts_with("iio:device")))
        .collect();
    devices.sort();
    devices.into_iter().next()
}

/// Raspberry Pi firmware low-voltage alarm: replace the cryptic channel
/// label with a readable one. A board claiming this driver without the
/// channel is treated as broken rather than silently left generic.
fn relabel_rpi_volt(dir: &Path, base: Sensor) -> Result<Sensor, ExtendError> {
    const CHANNEL: &str = "in0_lcrit_alarm";
    let mut values = base.values;
    let Some(position) = values
        .iter()
        .position(|v| v.label.as_deref() == Some(CHANNEL))
    else {
        return Err(ExtendError::Fatal(Error::Missing {
            path: dir.join(CHANNEL),
        }));
    };
    let alarm = values.remove(position);
    values.push(SensorValue {
        label: Some("low voltage alarm".to_string()),
        ..alarm
    });
    Ok(Sensor {
        name: base.name,
        values,
    })
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// All hwmon groups on the system.
#[derive(Debug, Clone, PartialEq)]
pub struct Hwmon {
    pub sensors: Vec<Sensor>,
}

impl Hwmon {
    /// Read every group under `/sys/class/hwmon`.
    pub fn read() -> Result<Hwmon, Error> {
        Hwmon::read_from(Path::new(HWMON))
    }

    /// Read every group under an alternate hwmon root, sorted by group
    /// directory name.
    pub fn read_from(root: &Path) -> Result<Hwmon, Error> {
        let mut sensors = Vec::new();
        for dir in sysfs::sorted_entries(root)? {
            sensors.push(Sensor::parse(&dir)?);
        }
        Ok(Hwmon { sensors })
    }
}

impl fmt::Display for Hwmon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for sensor in &self.sensors {
            if !first {
                write!(f, "\n\n")?;
            }
            first = false;
            write!(f, "{sensor}")?;
        }
        Ok(())
    }
}

impl crate::report::Report for Hwmon {
    fn to_json(&self) -> Value {
        Value::Array(self.sensors.iter().map(Sensor::to_json).collect())
    }
}
