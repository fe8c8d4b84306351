//! BlueZ D-Bus backend for Aranet4 scanning.
//!
//! Uses the `bluer` crate to register an advertisement monitor with the
//! BlueZ daemon. The monitor pattern narrows delivery to frames whose
//! manufacturer data starts with the Aranet vendor ID; the pipeline still
//! re-checks every frame it receives.

use super::{
    ADVERTISEMENT_CHANNEL_BUFFER_SIZE, Advertisement, AdvertisementReceiver, DeviceFilter,
    MANUFACTURER_DATA_TYPE, ScanError,
};
use bluer::monitor::{Monitor, MonitorEvent, Pattern};
use bluer::{Adapter, Address, Session};
use futures::StreamExt;
use tokio::sync::mpsc;

impl From<bluer::Error> for ScanError {
    fn from(err: bluer::Error) -> Self {
        ScanError::Bluetooth(err.to_string())
    }
}

/// Start scanning for Aranet4 advertisements using the BlueZ D-Bus backend.
///
/// Initializes the default Bluetooth adapter and registers an advertisement
/// monitor matching the filter's vendor ID. Observed advertisements are sent
/// through the returned channel. The monitor and session are released when
/// the receiver side of the channel is dropped.
///
/// # Arguments
/// * `filter` - Vendor configuration for the radio-level or-pattern
/// * `verbose` - If true, transport errors are printed to stderr; otherwise they're silently dropped.
pub async fn start_scan(
    filter: &DeviceFilter,
    verbose: bool,
) -> Result<AdvertisementReceiver, ScanError> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    // Match manufacturer-specific data that starts with the vendor ID.
    let pattern = Pattern {
        data_type: MANUFACTURER_DATA_TYPE,
        start_position: 0,
        content: filter.manufacturer_id_le().to_vec(),
    };

    let monitor_manager = adapter.monitor().await?;
    let mut monitor_handle = monitor_manager
        .register(Monitor {
            patterns: Some(vec![pattern]),
            ..Default::default()
        })
        .await?;

    // Spawn a task that owns all Bluetooth state and runs the event loop
    tokio::spawn(async move {
        // Keep all Bluetooth state alive by moving it into this task
        let _session = session;
        let _monitor_manager = monitor_manager;

        while let Some(event) = monitor_handle.next().await {
            if let MonitorEvent::DeviceFound(device_id) = event {
                match read_advertisement(&adapter, device_id.device).await {
                    Ok(Some(advertisement)) => {
                        if tx.send(advertisement).await.is_err() {
                            // Receiver closed: the run is over, release the
                            // monitor and session by leaving the task.
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) if verbose => eprintln!("scan: {e}"),
                    Err(_) => {}
                }
            }
        }
    });

    Ok(rx)
}

/// Read the advertisement properties of a discovered device.
///
/// Returns `Ok(None)` while the device has no manufacturer data yet; BlueZ
/// can report a device before the scan response completes.
async fn read_advertisement(
    adapter: &Adapter,
    address: Address,
) -> Result<Option<Advertisement>, ScanError> {
    let device = adapter.device(address)?;

    let manufacturer_data = match device.manufacturer_data().await? {
        Some(data) => data,
        None => return Ok(None),
    };

    let name = device.name().await?;
    let rssi = device.rssi().await?;

    Ok(Some(Advertisement {
        address: address.into(),
        name,
        manufacturer_data,
        rssi,
    }))
}
