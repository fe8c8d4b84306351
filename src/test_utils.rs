use crate::mac_address::MacAddress;
use crate::reading::{DeviceStatus, FirmwareVersion, LedStatus, SensorReading};
use crate::scanner::{ARANET_MANUFACTURER_ID, Advertisement};
use crate::sink::Observation;
use std::collections::HashMap;
use time::macros::datetime;

/// A stable device address for unit tests.
pub const TEST_ADDRESS: MacAddress = MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

/// A full 22-byte manufacturer payload with the scan-response extension:
/// firmware 1.2.3, CO2 1202 ppm, 22.0 C, 1033.8 hPa, 50 %, battery 97 %,
/// amber LED, 120 s interval, 64 s old.
pub fn extended_frame() -> Vec<u8> {
    vec![
        0x21, 0x03, 0x02, 0x01, 0x00, 0x0C, 0x0F, 0x01, 0xB2, 0x04, 0xB8, 0x01, 0x62, 0x28, 0x32,
        0x61, 0x02, 0x78, 0x00, 0x40, 0x00, 0x7D,
    ]
}

/// The same frame truncated to the status block, as broadcast without an
/// active scan response.
pub fn status_only_frame() -> Vec<u8> {
    vec![0x21, 0x03, 0x02, 0x01]
}

/// Build an advertisement carrying `payload` under the Aranet vendor key.
pub fn advertisement_with_payload(payload: Vec<u8>) -> Advertisement {
    Advertisement {
        address: TEST_ADDRESS,
        name: Some("Aranet4 20D17".to_string()),
        manufacturer_data: HashMap::from([(ARANET_MANUFACTURER_ID, payload)]),
        rssi: Some(-73),
    }
}

fn sample_status() -> DeviceStatus {
    DeviceStatus {
        disconnected: true,
        calibration_state: 0,
        dfu_active: false,
        integrations_active: true,
        firmware_version: FirmwareVersion {
            major: 1,
            minor: 2,
            patch: 3,
        },
    }
}

/// The observation the pipeline derives from [`extended_frame`].
pub fn sample_observation() -> Observation {
    Observation {
        address: TEST_ADDRESS,
        name: Some("Aranet4 20D17".to_string()),
        rssi: Some(-73),
        captured_at: datetime!(2026-08-06 10:15:00 UTC),
        status: sample_status(),
        reading: Some(SensorReading {
            co2: 1202,
            temperature_c: 22.0,
            pressure_hpa: 1033.8,
            humidity_pct: 50,
            battery_pct: 97,
            led: LedStatus::Amber,
            interval_secs: 120,
            since_update_secs: 64,
        }),
    }
}

/// The observation derived from [`status_only_frame`].
pub fn observation_without_reading() -> Observation {
    Observation {
        reading: None,
        ..sample_observation()
    }
}
