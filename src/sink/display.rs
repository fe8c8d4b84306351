//! Human-readable sink for interactive use.

use crate::sink::{Observation, Sink, SinkError, format_captured_at};
use std::io::Write;

/// Writes each observation as a short block of text to an output stream.
///
/// The stream is injected so tests can capture output in a `Vec<u8>`; the
/// binary hands in stdout.
pub struct DisplaySink<W: Write> {
    out: W,
}

impl<W: Write> DisplaySink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the sink and return the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for DisplaySink<W> {
    fn record(&mut self, observation: &Observation) -> Result<(), SinkError> {
        let name = observation.name.as_deref().unwrap_or("(unnamed)");
        write!(self.out, "{} {}", observation.address, name)?;
        if let Some(rssi) = observation.rssi {
            write!(self.out, " rssi={rssi}dBm")?;
        }
        writeln!(self.out, " at {}", format_captured_at(observation.captured_at)?)?;

        let status = &observation.status;
        writeln!(
            self.out,
            "  status: firmware={} disconnected={} calibration={} dfu={} integrations={}",
            status.firmware_version,
            status.disconnected,
            status.calibration_state,
            status.dfu_active,
            status.integrations_active,
        )?;

        match &observation.reading {
            Some(r) => writeln!(
                self.out,
                "  reading: co2={}ppm temperature={}C pressure={}hPa humidity={}% battery={}% led={} interval={}s age={}s",
                r.co2,
                r.temperature_c,
                r.pressure_hpa,
                r.humidity_pct,
                r.battery_pct,
                r.led,
                r.interval_secs,
                r.since_update_secs,
            )?,
            None => writeln!(self.out, "  reading: none (frame without scan response)")?,
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(self.out.flush()?)
    }
}
