//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `completions`, `abandoned`, and `tick_summaries`.
//!
//! `RETURNING` is an SQLite keyword, so the returning-ambulance count is
//! stored as `returning_count`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AbandonedRow, CompletionRow, OutputError, OutputResult, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        if !dir.is_dir() {
            return Err(OutputError::MissingDir(dir.to_path_buf()));
        }
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS completions (
                 patient_id     INTEGER PRIMARY KEY,
                 ambulance_id   INTEGER NOT NULL,
                 hospital_node  INTEGER NOT NULL,
                 call_tick      INTEGER NOT NULL,
                 assigned_tick  INTEGER NOT NULL,
                 hospital_tick  INTEGER NOT NULL,
                 wait_ticks     INTEGER NOT NULL,
                 response_ticks INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS abandoned (
                 patient_id     INTEGER PRIMARY KEY,
                 call_tick      INTEGER NOT NULL,
                 abandoned_tick INTEGER NOT NULL,
                 attempts       INTEGER NOT NULL,
                 reason         TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick            INTEGER PRIMARY KEY,
                 elapsed_secs    INTEGER NOT NULL,
                 calls           INTEGER NOT NULL,
                 assigned        INTEGER NOT NULL,
                 completed       INTEGER NOT NULL,
                 queued          INTEGER NOT NULL,
                 committed       INTEGER NOT NULL,
                 returning_count INTEGER NOT NULL,
                 idle            INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_completion(&mut self, row: &CompletionRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO completions \
             (patient_id, ambulance_id, hospital_node, call_tick, assigned_tick, \
              hospital_tick, wait_ticks, response_ticks) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.patient_id,
                row.ambulance_id,
                row.hospital_node,
                row.call_tick,
                row.assigned_tick,
                row.hospital_tick,
                row.wait_ticks,
                row.response_ticks,
            ],
        )?;
        Ok(())
    }

    fn write_abandoned(&mut self, row: &AbandonedRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO abandoned (patient_id, call_tick, abandoned_tick, attempts, reason) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![row.patient_id, row.call_tick, row.abandoned_tick, row.attempts, row.reason],
        )?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO tick_summaries \
             (tick, elapsed_secs, calls, assigned, completed, queued, committed, returning_count, idle) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        stmt.execute(rusqlite::params![
            row.tick,
            row.elapsed_secs,
            row.calls,
            row.assigned,
            row.completed,
            row.queued,
            row.committed,
            row.returning,
            row.idle,
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
