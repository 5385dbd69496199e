//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `completions.csv`
//! - `abandoned.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AbandonedRow, CompletionRow, OutputError, OutputResult, TickSummaryRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    completions: Writer<File>,
    abandoned:   Writer<File>,
    summaries:   Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        if !dir.is_dir() {
            return Err(OutputError::MissingDir(dir.to_path_buf()));
        }
        let mut completions = Writer::from_path(dir.join("completions.csv"))?;
        completions.write_record([
            "patient_id",
            "ambulance_id",
            "hospital_node",
            "call_tick",
            "assigned_tick",
            "hospital_tick",
            "wait_ticks",
            "response_ticks",
        ])?;

        let mut abandoned = Writer::from_path(dir.join("abandoned.csv"))?;
        abandoned.write_record(["patient_id", "call_tick", "abandoned_tick", "attempts", "reason"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "elapsed_secs",
            "calls",
            "assigned",
            "completed",
            "queued",
            "committed",
            "returning",
            "idle",
        ])?;

        Ok(Self { completions, abandoned, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_completion(&mut self, row: &CompletionRow) -> OutputResult<()> {
        self.completions.write_record(&[
            row.patient_id.to_string(),
            row.ambulance_id.to_string(),
            row.hospital_node.to_string(),
            row.call_tick.to_string(),
            row.assigned_tick.to_string(),
            row.hospital_tick.to_string(),
            row.wait_ticks.to_string(),
            row.response_ticks.to_string(),
        ])?;
        Ok(())
    }

    fn write_abandoned(&mut self, row: &AbandonedRow) -> OutputResult<()> {
        self.abandoned.write_record(&[
            row.patient_id.to_string(),
            row.call_tick.to_string(),
            row.abandoned_tick.to_string(),
            row.attempts.to_string(),
            row.reason.to_owned(),
        ])?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_secs.to_string(),
            row.calls.to_string(),
            row.assigned.to_string(),
            row.completed.to_string(),
            row.queued.to_string(),
            row.committed.to_string(),
            row.returning.to_string(),
            row.idle.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.completions.flush()?;
        self.abandoned.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
