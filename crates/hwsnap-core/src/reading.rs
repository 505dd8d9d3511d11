//! Numeric readings that stay integral until a scale is applied.

use std::fmt;

use serde::{Serialize, Serializer};

/// A derived channel reading.
///
/// hwmon and IIO channel files store integers; applying a scale factor
/// promotes the value to floating point. Integer readings keep full
/// precision end to end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Int(i64),
    Float(f64),
}

impl Reading {
    /// The value as `f64`, for display-time unit scaling.
    pub fn as_f64(self) -> f64 {
        match self {
            Reading::Int(v) => v as f64,
            Reading::Float(v) => v,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Reading::Int(v) => write!(f, "{v}"),
            Reading::Float(v) => write_float(f, v),
        }
    }
}

impl Serialize for Reading {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Reading::Int(v) => serializer.serialize_i64(v),
            Reading::Float(v) => serializer.serialize_f64(v),
        }
    }
}

/// Format a float keeping a fractional part, so whole results of unit
/// scaling read `45.0` rather than `45`.
pub(crate) fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_finite() && v.fract() == 0.0 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}
