//! Bit-exact decoder for the Aranet4 manufacturer-specific payload.
//!
//! Every advertisement starts with a four-byte status block. Frames that
//! include the scan-response extension additionally carry a 13-byte reading
//! block at offset 8. Decoding is pure: identical bytes always produce
//! identical values, and the capture timestamp is attached by the pipeline,
//! not here.

use crate::reading::{DeviceStatus, FirmwareVersion, LedStatus, SensorReading};
use thiserror::Error;

/// Errors produced while decoding a manufacturer payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload cannot hold the block being decoded.
    #[error("payload too short: {0} bytes")]
    ShortBuffer(usize),
    /// LED status byte holds a value outside the known palette.
    #[error("unknown LED status value: {0}")]
    InvalidLed(u8),
}

/// Minimum payload length for the status block.
const STATUS_LEN: usize = 4;

/// Payloads shorter than this lack the scan-response extension entirely.
const EXTENDED_FRAME_MIN_LEN: usize = 20;

/// Offset and length of the reading block within an extended frame.
const READING_OFFSET: usize = 8;
const READING_LEN: usize = 13;

/// Decode the status block from the first four payload bytes.
///
/// Byte 0 carries flag bits: bit 0 = disconnected, bits 2-3 = calibration
/// state, bit 4 = DFU active, bit 5 = integrations active. Bytes 1-3 carry
/// the firmware version with its components in reverse order (patch first).
/// That ordering is a fixed quirk of the wire format.
pub fn decode_status(raw: &[u8]) -> Result<DeviceStatus, DecodeError> {
    if raw.len() < STATUS_LEN {
        return Err(DecodeError::ShortBuffer(raw.len()));
    }

    let flags = raw[0];
    Ok(DeviceStatus {
        disconnected: flags & 0x01 != 0,
        calibration_state: (flags >> 2) & 0x03,
        dfu_active: (flags >> 4) & 0x01 != 0,
        integrations_active: (flags >> 5) & 0x01 != 0,
        firmware_version: FirmwareVersion {
            major: raw[3],
            minor: raw[2],
            patch: raw[1],
        },
    })
}

/// Decode the sensor reading block, if the frame carries one.
///
/// Returns `Ok(None)` for frames without the scan-response extension; many
/// advertisements arrive truncated like this and it is not an error. The
/// block layout is little-endian: CO2 (u16), temperature (u16), pressure
/// (u16), humidity (u8), battery (u8), LED status (u8), interval (u16),
/// seconds since update (u16).
pub fn decode_payload(raw: &[u8]) -> Result<Option<SensorReading>, DecodeError> {
    if raw.len() < EXTENDED_FRAME_MIN_LEN {
        return Ok(None);
    }

    // Real devices emit 21- or 22-byte extended frames. A frame that clears
    // the length threshold but cannot hold the whole block is malformed.
    let block = raw
        .get(READING_OFFSET..READING_OFFSET + READING_LEN)
        .ok_or(DecodeError::ShortBuffer(raw.len()))?;

    let co2_raw = u16::from_le_bytes([block[0], block[1]]);
    let temperature_raw = u16::from_le_bytes([block[2], block[3]]);
    let pressure_raw = u16::from_le_bytes([block[4], block[5]]);
    let humidity_raw = block[6];
    let battery_pct = block[7];
    let led = led_status(block[8])?;
    let interval_secs = u16::from_le_bytes([block[9], block[10]]);
    let since_update_secs = u16::from_le_bytes([block[11], block[12]]);

    // The humidity validity bit sits above the 8-bit slot the value occupies,
    // so it can never be observed set; the check is kept to match the
    // documented field layout.
    let humidity_invalid = (u16::from(humidity_raw) >> 8) & 0x01 != 0;

    Ok(Some(SensorReading {
        co2: if co2_raw >> 15 & 0x01 != 0 {
            -1
        } else {
            i32::from(co2_raw)
        },
        temperature_c: if temperature_raw >> 14 & 0x01 != 0 {
            -1.0
        } else {
            round2(f64::from(temperature_raw) * 0.05)
        },
        pressure_hpa: if pressure_raw >> 15 & 0x01 != 0 {
            -1.0
        } else {
            round2(f64::from(pressure_raw) * 0.1)
        },
        humidity_pct: if humidity_invalid {
            -1
        } else {
            i32::from(humidity_raw)
        },
        battery_pct,
        led,
        interval_secs,
        since_update_secs,
    }))
}

fn led_status(value: u8) -> Result<LedStatus, DecodeError> {
    match value {
        0 => Ok(LedStatus::None),
        1 => Ok(LedStatus::Green),
        2 => Ok(LedStatus::Amber),
        3 => Ok(LedStatus::Red),
        4 => Ok(LedStatus::Blue),
        other => Err(DecodeError::InvalidLed(other)),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A frame captured from a real Aranet4, annotated byte by byte.
    fn extended_frame() -> Vec<u8> {
        vec![
            0x21, // flags: disconnected + integrations active
            0x03, 0x02, 0x01, // firmware 1.2.3, transmitted patch first
            0x00, 0x0C, 0x0F, 0x01, // not decoded
            0xB2, 0x04, // CO2: 1202 ppm
            0xB8, 0x01, // temperature: 440 * 0.05 = 22.00 C
            0x62, 0x28, // pressure: 10338 * 0.1 = 1033.8 hPa
            0x32, // humidity: 50 %
            0x61, // battery: 97 %
            0x02, // LED: amber
            0x78, 0x00, // interval: 120 s
            0x40, 0x00, // since update: 64 s
            0x7D, // trailing scan-response byte, ignored
        ]
    }

    #[test]
    fn test_decode_status_reference_frame() {
        let status = decode_status(&extended_frame()).unwrap();
        assert!(status.disconnected);
        assert_eq!(status.calibration_state, 0);
        assert!(!status.dfu_active);
        assert!(status.integrations_active);
        assert_eq!(
            status.firmware_version,
            FirmwareVersion {
                major: 1,
                minor: 2,
                patch: 3
            }
        );
    }

    #[test]
    fn test_decode_status_all_flags() {
        // bit 0 + bits 2-3 + bit 4 + bit 5
        let status = decode_status(&[0b0011_1101, 9, 8, 7]).unwrap();
        assert!(status.disconnected);
        assert_eq!(status.calibration_state, 3);
        assert!(status.dfu_active);
        assert!(status.integrations_active);
        assert_eq!(status.firmware_version.to_string(), "7.8.9");
    }

    #[test]
    fn test_decode_status_short_buffer() {
        for len in 0..4 {
            let raw = vec![0u8; len];
            assert_eq!(decode_status(&raw), Err(DecodeError::ShortBuffer(len)));
        }
        assert!(decode_status(&[0, 0, 0, 0]).is_ok());
    }

    #[test]
    fn test_decode_payload_reference_frame() {
        let reading = decode_payload(&extended_frame()).unwrap().unwrap();
        assert_eq!(
            reading,
            SensorReading {
                co2: 1202,
                temperature_c: 22.0,
                pressure_hpa: 1033.8,
                humidity_pct: 50,
                battery_pct: 97,
                led: LedStatus::Amber,
                interval_secs: 120,
                since_update_secs: 64,
            }
        );
    }

    #[test]
    fn test_decode_payload_absent_below_threshold() {
        // Frames without the scan-response extension still have a status.
        for len in [4, 8, 19] {
            let raw = vec![0u8; len];
            assert_eq!(decode_payload(&raw), Ok(None));
            assert!(decode_status(&raw).is_ok());
        }
    }

    #[test]
    fn test_decode_payload_truncated_block() {
        // Clears the length threshold but cannot hold the 13-byte block.
        let raw = vec![0u8; 20];
        assert_eq!(decode_payload(&raw), Err(DecodeError::ShortBuffer(20)));
    }

    #[test]
    fn test_co2_validity_sentinel() {
        let mut frame = extended_frame();
        frame[9] |= 0x80; // bit 15 of the CO2 field
        let reading = decode_payload(&frame).unwrap().unwrap();
        assert_eq!(reading.co2, -1);
        // Remaining bits of the field do not matter once the bit is set.
        frame[8] = 0xFF;
        frame[9] = 0xFF;
        let reading = decode_payload(&frame).unwrap().unwrap();
        assert_eq!(reading.co2, -1);
        // Other fields are untouched by the CO2 validity bit.
        assert_eq!(reading.temperature_c, 22.0);
        assert_eq!(reading.humidity_pct, 50);
    }

    #[test]
    fn test_temperature_validity_sentinel() {
        let mut frame = extended_frame();
        frame[11] |= 0x40; // bit 14 of the temperature field
        let reading = decode_payload(&frame).unwrap().unwrap();
        assert_eq!(reading.temperature_c, -1.0);
        assert_eq!(reading.co2, 1202);
    }

    #[test]
    fn test_pressure_validity_sentinel() {
        let mut frame = extended_frame();
        frame[13] |= 0x80; // bit 15 of the pressure field
        let reading = decode_payload(&frame).unwrap().unwrap();
        assert_eq!(reading.pressure_hpa, -1.0);
        assert_eq!(reading.co2, 1202);
    }

    #[test]
    fn test_humidity_byte_never_invalid() {
        // The humidity validity bit lies outside the 8-bit wire slot, so
        // even an all-ones byte decodes as a plain value.
        let mut frame = extended_frame();
        frame[14] = 0xFF;
        let reading = decode_payload(&frame).unwrap().unwrap();
        assert_eq!(reading.humidity_pct, 255);
    }

    #[test]
    fn test_co2_validity_boundary() {
        // 0x7FFF keeps bit 15 clear and is therefore a legitimate value.
        let mut frame = extended_frame();
        frame[8] = 0xFF;
        frame[9] = 0x7F;
        let reading = decode_payload(&frame).unwrap().unwrap();
        assert_eq!(reading.co2, 32767);
    }

    #[test]
    fn test_temperature_rounding() {
        let mut frame = extended_frame();
        frame[10] = 0xB9; // 441 * 0.05 = 22.05
        frame[11] = 0x01;
        let reading = decode_payload(&frame).unwrap().unwrap();
        assert_eq!(reading.temperature_c, 22.05);
    }

    #[test]
    fn test_invalid_led_value() {
        let mut frame = extended_frame();
        frame[16] = 5;
        assert_eq!(decode_payload(&frame), Err(DecodeError::InvalidLed(5)));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let frame = extended_frame();
        assert_eq!(decode_status(&frame), decode_status(&frame));
        assert_eq!(decode_payload(&frame), decode_payload(&frame));
    }

    #[test]
    fn test_decode_error_display() {
        assert_eq!(
            format!("{}", DecodeError::ShortBuffer(3)),
            "payload too short: 3 bytes"
        );
        assert_eq!(
            format!("{}", DecodeError::InvalidLed(7)),
            "unknown LED status value: 7"
        );
    }
}
