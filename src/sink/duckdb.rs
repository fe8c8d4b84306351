//! Durable append-only sink backed by an embedded DuckDB database.

use crate::sink::{Observation, Sink, SinkError, format_captured_at};
use duckdb::{Connection, params};
use std::path::Path;

impl From<duckdb::Error> for SinkError {
    fn from(err: duckdb::Error) -> Self {
        SinkError::Storage(err.to_string())
    }
}

/// Appends one row per decoded advertisement to a DuckDB table.
///
/// The table is created lazily on the first write (schema-on-write) with a
/// single explicit create-if-absent statement; a failure on the subsequent
/// insert is a real failure and propagates instead of being retried or
/// misread as "table missing". Rows are never updated or deleted here.
pub struct DuckDbSink {
    conn: Connection,
    table: String,
    table_ready: bool,
}

impl DuckDbSink {
    /// Open or create the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self, SinkError> {
        Ok(Self::with_connection(Connection::open(path)?, table))
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory(table: &str) -> Result<Self, SinkError> {
        Ok(Self::with_connection(Connection::open_in_memory()?, table))
    }

    fn with_connection(conn: Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
            table_ready: false,
        }
    }

    /// Number of rows currently in the log table.
    pub fn row_count(&self) -> Result<i64, SinkError> {
        let count = self.conn.query_row(
            &format!("SELECT count(*) FROM \"{}\"", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn ensure_table(&self) -> Result<(), SinkError> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                captured_at TIMESTAMP,
                disconnected BOOLEAN,
                calibration_state INTEGER,
                dfu_active BOOLEAN,
                integrations_active BOOLEAN,
                firmware_version VARCHAR,
                co2 INTEGER,
                temperature_c DOUBLE,
                pressure_hpa DOUBLE,
                humidity_pct INTEGER,
                battery_pct INTEGER,
                led_status INTEGER,
                interval_s INTEGER,
                since_update_s INTEGER
            )",
            self.table
        ))?;
        Ok(())
    }
}

impl Sink for DuckDbSink {
    fn record(&mut self, observation: &Observation) -> Result<(), SinkError> {
        if !self.table_ready {
            self.ensure_table()?;
            self.table_ready = true;
        }

        let status = &observation.status;
        let reading = observation.reading.as_ref();
        self.conn.execute(
            &format!(
                "INSERT INTO \"{}\" VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                self.table
            ),
            params![
                format_captured_at(observation.captured_at)?,
                status.disconnected,
                i32::from(status.calibration_state),
                status.dfu_active,
                status.integrations_active,
                status.firmware_version.to_string(),
                reading.map(|r| r.co2),
                reading.map(|r| r.temperature_c),
                reading.map(|r| r.pressure_hpa),
                reading.map(|r| r.humidity_pct),
                reading.map(|r| i32::from(r.battery_pct)),
                reading.map(|r| i32::from(r.led.as_u8())),
                reading.map(|r| i32::from(r.interval_secs)),
                reading.map(|r| i32::from(r.since_update_secs)),
            ],
        )?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        // Push any buffered WAL data into the database file.
        self.conn.execute_batch("CHECKPOINT")?;
        Ok(())
    }
}
