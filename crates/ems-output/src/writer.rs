//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AbandonedRow, CompletionRow, OutputResult, TickSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Append one completion log entry.
    fn write_completion(&mut self, row: &CompletionRow) -> OutputResult<()>;

    /// Append one abandoned-call entry.
    fn write_abandoned(&mut self, row: &AbandonedRow) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
