//! Decoded Aranet4 advertisement data structures.

use std::fmt;

/// Device-level status flags and firmware version.
///
/// Derived from the first four bytes of the manufacturer payload, which are
/// present in every advertisement frame the device emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    /// Device considers itself disconnected from the Aranet cloud/app.
    pub disconnected: bool,
    /// Calibration progress, 0..=3.
    pub calibration_state: u8,
    /// Firmware update (DFU) in progress.
    pub dfu_active: bool,
    /// Third-party integrations (smart home) enabled.
    pub integrations_active: bool,
    /// Firmware version running on the device.
    pub firmware_version: FirmwareVersion,
}

/// Semantic firmware version, displayed as `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Traffic-light LED shown on the device face.
///
/// Values match the wire encoding; anything else is rejected at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedStatus {
    None = 0,
    Green = 1,
    Amber = 2,
    Red = 3,
    Blue = 4,
}

impl LedStatus {
    /// Wire value of this status, also used as the stored integer column.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for LedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LedStatus::None => "none",
            LedStatus::Green => "green",
            LedStatus::Amber => "amber",
            LedStatus::Red => "red",
            LedStatus::Blue => "blue",
        };
        write!(f, "{name}")
    }
}

/// One sensor reading broadcast by the device.
///
/// Only present when the advertisement carries the scan-response extension;
/// shorter frames still decode to a [`DeviceStatus`] but no reading.
///
/// The device can mark individual measurements invalid (warm-up, sensor
/// fault). Those fields export the sentinel `-1` instead of a physical
/// value:
/// - CO2 in ppm, `-1` when invalid
/// - Temperature in Celsius, `-1` when invalid
/// - Pressure in hPa, `-1` when invalid
/// - Humidity in percent (0-100), `-1` when invalid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// CO2 concentration in ppm.
    pub co2: i32,
    /// Temperature in Celsius, rounded to two decimals.
    pub temperature_c: f64,
    /// Atmospheric pressure in hPa, rounded to two decimals.
    pub pressure_hpa: f64,
    /// Relative humidity in percent.
    pub humidity_pct: i32,
    /// Battery charge in percent.
    pub battery_pct: u8,
    /// LED color currently shown on the device.
    pub led: LedStatus,
    /// Configured measurement interval in seconds.
    pub interval_secs: u16,
    /// Seconds elapsed since the measurement was taken.
    pub since_update_secs: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_version_display() {
        let version = FirmwareVersion {
            major: 1,
            minor: 2,
            patch: 3,
        };
        assert_eq!(format!("{}", version), "1.2.3");
    }

    #[test]
    fn test_led_status_display() {
        assert_eq!(format!("{}", LedStatus::None), "none");
        assert_eq!(format!("{}", LedStatus::Green), "green");
        assert_eq!(format!("{}", LedStatus::Amber), "amber");
        assert_eq!(format!("{}", LedStatus::Red), "red");
        assert_eq!(format!("{}", LedStatus::Blue), "blue");
    }

    #[test]
    fn test_led_status_wire_values() {
        assert_eq!(LedStatus::None.as_u8(), 0);
        assert_eq!(LedStatus::Green.as_u8(), 1);
        assert_eq!(LedStatus::Amber.as_u8(), 2);
        assert_eq!(LedStatus::Red.as_u8(), 3);
        assert_eq!(LedStatus::Blue.as_u8(), 4);
    }
}
