//! Record sinks for decoded advertisements.
//!
//! The original tooling this replaces wired one-off "print it now" callbacks
//! straight into the scanner; here both destinations implement one small
//! trait and the binary picks an implementation at startup.

pub mod display;

#[cfg(feature = "duckdb")]
pub mod duckdb;

use crate::mac_address::MacAddress;
use crate::reading::{DeviceStatus, SensorReading};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Table the durable log appends to unless overridden on the command line.
pub const DEFAULT_TABLE: &str = "aranet4";

/// Errors raised while recording an observation.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Writing to the output stream failed
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
    /// The durable store rejected the operation
    #[error("storage error: {0}")]
    Storage(String),
    /// Rendering the capture timestamp failed
    #[error("timestamp error: {0}")]
    Timestamp(#[from] time::error::Format),
    /// The requested sink is not compiled in
    #[allow(dead_code)]
    #[error("sink '{0}' not available (not compiled in)")]
    Unavailable(String),
}

/// One fully decoded advertisement, ready to record.
///
/// The capture timestamp is attached by the pipeline at decode time; the
/// reading is absent for frames without the scan-response extension.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Address of the broadcasting device.
    pub address: MacAddress,
    /// Advertised device name, if any.
    pub name: Option<String>,
    /// Received signal strength in dBm.
    pub rssi: Option<i16>,
    /// UTC time the advertisement was processed.
    pub captured_at: OffsetDateTime,
    /// Decoded device status block.
    pub status: DeviceStatus,
    /// Decoded sensor reading, when the frame carried one.
    pub reading: Option<SensorReading>,
}

/// Destination for decoded observations.
///
/// Implementations side-effect only through their own channel (terminal
/// output or durable table). The pipeline serializes calls, so `&mut self`
/// is the whole concurrency story.
pub trait Sink {
    /// Record one observation.
    fn record(&mut self, observation: &Observation) -> Result<(), SinkError>;

    /// Push any buffered data to the underlying channel before shutdown.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Render a capture timestamp the way both sinks store/show it.
pub(crate) fn format_captured_at(captured_at: OffsetDateTime) -> Result<String, SinkError> {
    Ok(captured_at.format(&Rfc3339)?)
}
