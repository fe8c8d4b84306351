//! `aranet-logger` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing and process exit codes.
//! The core pipeline lives in [`crate::app`] where it can be tested
//! deterministically with an injected scanner + injected sink and error stream.

pub mod app;
pub mod decode;
pub mod mac_address;
pub mod reading;
pub mod run;
pub mod scanner;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types at the crate root
#[cfg(feature = "bluer")]
pub use app::RealScanner;
pub use app::{Options, RunError, Scanner, run_with_io};
pub use decode::{DecodeError, decode_payload, decode_status};
pub use mac_address::MacAddress;
pub use reading::{DeviceStatus, FirmwareVersion, LedStatus, SensorReading};
pub use run::{RunController, RunMode, RunState};
pub use scanner::{
    ARANET_MANUFACTURER_ID, ARANET_SERVICE_UUID, Advertisement, DeviceFilter, ScanError,
};
#[cfg(feature = "duckdb")]
pub use sink::duckdb::DuckDbSink;
pub use sink::display::DisplaySink;
pub use sink::{DEFAULT_TABLE, Observation, Sink, SinkError};
