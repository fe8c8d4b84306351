//! Core pipeline for `aranet-logger`.
//!
//! Invoked once per inbound advertisement: filter, decode exactly once,
//! record to the sink, update the run controller. Intentionally decoupled
//! from CLI parsing and process exit codes so it can be tested
//! deterministically with an injected scanner, sink, and error stream.

use crate::decode::{decode_payload, decode_status};
use crate::run::{RunController, RunMode};
use crate::scanner::{Advertisement, AdvertisementReceiver, DeviceFilter, ScanError};
use crate::sink::{DEFAULT_TABLE, Observation, Sink, SinkError};
use clap::Parser;
use std::future::Future;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;
use time::OffsetDateTime;

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Stop after this many recorded advertisements.
    /// Runs until interrupted when omitted.
    #[arg(long, value_name = "N")]
    pub count: Option<u64>,

    /// Append readings to a DuckDB database instead of printing them.
    /// Uses `data.db` when the path is omitted.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "data.db")]
    pub db: Option<PathBuf>,

    /// Table name for the durable log.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Verbose output, print decode errors for malformed payloads
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Options {
    /// Run mode implied by `--count`.
    pub fn run_mode(&self) -> RunMode {
        match self.count {
            Some(target) => RunMode::Bounded(target),
            None => RunMode::Unbounded,
        }
    }
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Scanner abstraction to enable deterministic unit tests without Bluetooth hardware.
pub trait Scanner: Send + Sync {
    fn start_scan(
        &self,
        filter: DeviceFilter,
        verbose: bool,
    ) -> Pin<Box<dyn Future<Output = Result<AdvertisementReceiver, ScanError>> + Send + '_>>;
}

/// Real scanner implementation that delegates to the BlueZ backend.
#[cfg(feature = "bluer")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RealScanner;

#[cfg(feature = "bluer")]
impl Scanner for RealScanner {
    fn start_scan(
        &self,
        filter: DeviceFilter,
        verbose: bool,
    ) -> Pin<Box<dyn Future<Output = Result<AdvertisementReceiver, ScanError>> + Send + '_>> {
        Box::pin(async move { crate::scanner::bluer::start_scan(&filter, verbose).await })
    }
}

/// Why an advertisement produced no record.
enum Rejected {
    /// Not an Aranet frame; skipped without comment.
    Filtered,
    /// Malformed payload; dropped, reported only when verbose.
    Malformed(crate::decode::DecodeError),
}

/// Turn one advertisement into an observation, decoding the payload exactly
/// once. The capture timestamp comes from the caller so decoding itself
/// stays clock-free.
fn decode_observation(
    filter: &DeviceFilter,
    advertisement: &Advertisement,
    captured_at: OffsetDateTime,
) -> Result<Observation, Rejected> {
    let Some(payload) = filter.payload(advertisement) else {
        return Err(Rejected::Filtered);
    };

    let status = decode_status(payload).map_err(Rejected::Malformed)?;
    let reading = decode_payload(payload).map_err(Rejected::Malformed)?;

    Ok(Observation {
        address: advertisement.address,
        name: advertisement.name.clone(),
        rssi: advertisement.rssi,
        captured_at,
        status,
        reading,
    })
}

/// Run the core processing loop until the run controller stops it.
///
/// - Advertisements are filtered again here even though the radio-level
///   subscription already matched them; the scan layer is not trusted to
///   filter perfectly.
/// - Decode failures drop the record (written to `err` when verbose) and
///   never end the run. Sink failures end the run and surface to the caller.
/// - `shutdown` is the external cancellation source (Ctrl-C in the binary).
///   When the run stops, the advertisement receiver is dropped - releasing
///   the scan subscription - and the sink is flushed before returning.
///
/// Returns the number of recorded advertisements.
pub async fn run_with_io(
    options: Options,
    scanner: &dyn Scanner,
    sink: &mut dyn Sink,
    err: &mut dyn Write,
    shutdown: impl Future<Output = ()>,
) -> Result<u64, RunError> {
    let filter = DeviceFilter::default();
    let mut controller = RunController::new(options.run_mode());
    let mut sink_failure: Option<SinkError> = None;

    let mut advertisements = scanner.start_scan(filter.clone(), options.verbose).await?;
    tokio::pin!(shutdown);

    while !controller.should_stop() {
        tokio::select! {
            received = advertisements.recv() => {
                match received {
                    Some(advertisement) => {
                        let captured_at = OffsetDateTime::now_utc();
                        match decode_observation(&filter, &advertisement, captured_at) {
                            Ok(observation) => match sink.record(&observation) {
                                Ok(()) => controller.on_recorded(),
                                Err(sink_err) => {
                                    // Unavailable sink: stop cleanly, then
                                    // surface the failure to the caller.
                                    sink_failure = Some(sink_err);
                                    controller.request_stop();
                                }
                            },
                            Err(Rejected::Filtered) => {}
                            Err(Rejected::Malformed(decode_err)) => {
                                if options.verbose {
                                    writeln!(err, "{decode_err}")?;
                                }
                            }
                        }
                    }
                    // Source exhausted; nothing more will arrive.
                    None => controller.request_stop(),
                }
            }
            _ = &mut shutdown => controller.request_stop(),
        }
    }

    // Closing the channel is what releases the scan subscription: the
    // backend task observes it and drops the monitor and session.
    drop(advertisements);

    if let Some(sink_err) = sink_failure {
        controller.mark_stopped();
        return Err(sink_err.into());
    }

    sink.flush()?;
    controller.mark_stopped();

    Ok(controller.recorded())
}
