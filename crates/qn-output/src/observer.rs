//! `SimOutputObserver<W>` — bridges `NetworkObserver` to an `OutputWriter`.

use qn_agent::Agent;
use qn_core::StationId;
use qn_network::{Network, NetworkObserver};

use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`NetworkObserver`] that drains completed station visits into any
/// [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// The per-event hooks carry no record data on their own — a station only
/// knows enough to build a full [`qn_station::StationRecord`] once an agent's
/// visit is fully logged internally. Rather than reconstruct records from
/// individual callbacks, call [`flush`][Self::flush] periodically (or once,
/// after the run loop returns) to drain [`Network::fetch_data`] into the
/// writer.
///
/// Errors from the writer are stored internally because `NetworkObserver`
/// methods have no return value. Check for errors with
/// [`take_error`][Self::take_error] after flushing.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Drain completed station visits out of `network` and hand them to the
    /// writer, then clear the network's internal log.
    pub fn flush(&mut self, network: &mut Network) {
        let rows = network.fetch_data();
        if rows.is_empty() {
            return;
        }
        let result = self.writer.write_records(&rows);
        self.store_err(result);
        network.clear_data();
    }

    /// Take the stored write error (if any) after flushing.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> NetworkObserver for SimOutputObserver<W> {
    fn on_departure(&mut self, _station: StationId, _agent: &Agent, _next: Option<StationId>) {}

    fn on_run_end(&mut self, _num_events: u64) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
