//! BLE advertisement source for Aranet4 devices.
//!
//! The backend delivers raw advertisements over a channel; filtering and
//! decoding happen in the pipeline so that every frame is decoded exactly
//! once, regardless of how well the radio-level filter worked.

#[cfg(feature = "bluer")]
pub mod bluer;

use crate::mac_address::MacAddress;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;

/// Error type for scanner operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth/adapter related error
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
}

/// Aranet (SAF Tehnika) manufacturer ID for data lookup.
pub const ARANET_MANUFACTURER_ID: u16 = 0x0702;

/// Service UUID advertised by Aranet4 devices.
///
/// Carried for subscription setup; the running filter matches on the
/// manufacturer-data key alone.
pub const ARANET_SERVICE_UUID: &str = "0000fce0-0000-1000-8000-00805f9b34fb";

/// Bluetooth manufacturer-specific data type (AD type 0xFF)
#[cfg(feature = "bluer")]
pub const MANUFACTURER_DATA_TYPE: u8 = 0xff;

/// Channel buffer size for advertisements in flight.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 100;

/// Convenience alias for the channel the backend feeds.
pub type AdvertisementReceiver = mpsc::Receiver<Advertisement>;

/// One observed advertisement, alive for a single pipeline iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// Address of the broadcasting device.
    pub address: MacAddress,
    /// Advertised local name, when the frame carried one.
    pub name: Option<String>,
    /// Manufacturer-specific data, keyed by registered vendor ID.
    pub manufacturer_data: HashMap<u16, Vec<u8>>,
    /// Received signal strength in dBm.
    pub rssi: Option<i16>,
}

/// Relevance filter for inbound advertisements.
///
/// One immutable value configures both the radio-level subscription pattern
/// and the in-pipeline re-check; BlueZ is not trusted to filter perfectly
/// during scan-response assembly windows.
#[derive(Debug, Clone)]
pub struct DeviceFilter {
    /// Registered vendor ID keying the manufacturer data blob.
    pub manufacturer_id: u16,
    /// Service UUID for subscription-level filtering.
    pub service_uuid: String,
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self {
            manufacturer_id: ARANET_MANUFACTURER_ID,
            service_uuid: ARANET_SERVICE_UUID.to_string(),
        }
    }
}

impl DeviceFilter {
    /// Whether this advertisement is relevant at all.
    pub fn accept(&self, advertisement: &Advertisement) -> bool {
        advertisement
            .manufacturer_data
            .contains_key(&self.manufacturer_id)
    }

    /// The vendor payload, when the advertisement carries one.
    pub fn payload<'a>(&self, advertisement: &'a Advertisement) -> Option<&'a [u8]> {
        advertisement
            .manufacturer_data
            .get(&self.manufacturer_id)
            .map(Vec::as_slice)
    }

    /// Little-endian vendor ID bytes, as BLE advertising payloads carry them.
    /// This is the content of the radio-level or-pattern.
    pub fn manufacturer_id_le(&self) -> [u8; 2] {
        self.manufacturer_id.to_le_bytes()
    }
}
