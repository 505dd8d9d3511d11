//! Raw/offset/scale composition for hwmon and IIO channel files.
//!
//! The kernel exposes calibrated readings as up to three sysfs files per
//! channel: a mandatory raw integer plus optional integer offset and float
//! scale. hwmon names the raw file `<channel>_input`, IIO names it
//! `<item>_raw`; the composition on top is the same for both.

use std::path::Path;

use crate::error::Error;
use crate::reading::Reading;
use crate::sysfs;

/// Apply the optional `<item>_offset` and `<item>_scale` files to a raw
/// integer. Missing files are identity; the result stays integral unless
/// a scale was applied.
fn compose(dir: &Path, item: &str, raw: i64) -> Result<Reading, Error> {
    let mut value = raw;
    let offset_path = dir.join(format!("{item}_offset"));
    if let Some(text) = sysfs::read_optional(&offset_path)? {
        let offset: i64 = sysfs::parse_value(&offset_path, &text)?;
        value += offset;
    }
    let scale_path = dir.join(format!("{item}_scale"));
    match sysfs::read_optional(&scale_path)? {
        Some(text) => {
            let scale: f64 = sysfs::parse_value(&scale_path, &text)?;
            Ok(Reading::Float(value as f64 * scale))
        }
        None => Ok(Reading::Int(value)),
    }
}

/// Derive a reading from an IIO device channel: `<item>_raw` is mandatory,
/// offset and scale are optional.
pub fn adc_value(iio: &Path, item: &str) -> Result<Reading, Error> {
    let raw: i64 = sysfs::read_parse(&iio.join(format!("{item}_raw")))?;
    compose(iio, item, raw)
}

/// Derive a reading from a hwmon channel: `<channel>_input` is mandatory,
/// offset and scale are optional.
pub fn channel_value(hwmon: &Path, channel: &str) -> Result<Reading, Error> {
    let raw: i64 = sysfs::read_parse(&hwmon.join(format!("{channel}_input")))?;
    compose(hwmon, channel, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(files: &[(&str, &str)]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let path = dir.path().to_path_buf();
        (dir, path)
    }

    #[test]
    fn raw_alone_stays_integer() {
        let (_g, dir) = fixture(&[("in_temp_raw", "250\n")]);
        assert_eq!(adc_value(&dir, "in_temp").unwrap(), Reading::Int(250));
    }

    #[test]
    fn offset_is_added_and_stays_integer() {
        let (_g, dir) = fixture(&[("in_temp_raw", "250\n"), ("in_temp_offset", "-13\n")]);
        assert_eq!(adc_value(&dir, "in_temp").unwrap(), Reading::Int(237));
    }

    #[test]
    fn scale_promotes_to_float() {
        let (_g, dir) = fixture(&[
            ("in_temp_raw", "250\n"),
            ("in_temp_offset", "10\n"),
            ("in_temp_scale", "0.5\n"),
        ]);
        assert_eq!(adc_value(&dir, "in_temp").unwrap(), Reading::Float(130.0));
    }

    #[test]
    fn scale_without_offset() {
        let (_g, dir) = fixture(&[("in_temp_raw", "250\n"), ("in_temp_scale", "0.1\n")]);
        assert_eq!(adc_value(&dir, "in_temp").unwrap(), Reading::Float(25.0));
    }

    #[test]
    fn missing_raw_is_fatal() {
        let (_g, dir) = fixture(&[("in_temp_scale", "0.1\n")]);
        let err = adc_value(&dir, "in_temp").unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn malformed_offset_propagates() {
        let (_g, dir) = fixture(&[("in_temp_raw", "250\n"), ("in_temp_offset", "maybe\n")]);
        let err = adc_value(&dir, "in_temp").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn hwmon_channels_use_the_input_suffix() {
        let (_g, dir) = fixture(&[
            ("in0_input", "1000\n"),
            ("in0_offset", "50\n"),
            ("in0_scale", "0.5\n"),
        ]);
        assert_eq!(channel_value(&dir, "in0").unwrap(), Reading::Float(525.0));
    }

    #[test]
    fn hwmon_channel_without_calibration() {
        let (_g, dir) = fixture(&[("temp1_input", "45000\n")]);
        assert_eq!(channel_value(&dir, "temp1").unwrap(), Reading::Int(45000));
    }
}
