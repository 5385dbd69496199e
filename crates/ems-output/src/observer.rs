//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use ems_core::{SimConfig, Tick};
use ems_dispatch::Abandoned;
use ems_fleet::ResultRecord;
use ems_sim::{SimObserver, TickSummary};

use crate::row::{AbandonedRow, CompletionRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes the completion log, abandoned calls, and
/// tick summaries to any [`OutputWriter`] backend (CSV, SQLite, …).
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:             W,
    tick_duration_secs: u32,
    completions:        usize,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for elapsed-time
    /// conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            tick_duration_secs: config.tick_duration_secs,
            completions:        0,
            last_error:         None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Completion rows written so far.
    pub fn completions(&self) -> usize {
        self.completions
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_completion(&mut self, record: &ResultRecord) {
        let result = self.writer.write_completion(&CompletionRow::from(record));
        if result.is_ok() {
            self.completions += 1;
        }
        self.store_err(result);
    }

    fn on_abandoned(&mut self, abandoned: &Abandoned) {
        let result = self.writer.write_abandoned(&AbandonedRow::from(abandoned));
        self.store_err(result);
    }

    fn on_tick_end(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow::new(summary, self.tick_duration_secs);
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
