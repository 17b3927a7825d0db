//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! one table: `station_records`.

use std::path::Path;

use rusqlite::Connection;

use qn_station::StationRecord;

use crate::writer::OutputWriter;
use crate::OutputResult;

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS station_records (
                 agent_id                 INTEGER NOT NULL,
                 arrival                  REAL    NOT NULL,
                 service_start            REAL    NOT NULL,
                 departure                REAL    NOT NULL,
                 queue_length_on_arrival  INTEGER NOT NULL,
                 edge_index               INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_records(&mut self, rows: &[StationRecord]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO station_records \
                 (agent_id, arrival, service_start, departure, queue_length_on_arrival, edge_index) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id.0,
                    row.arrival.0,
                    row.service_start.0,
                    row.departure.0,
                    row.queue_length_on_arrival,
                    row.edge_index.0,
                ])?;
            }
        }
        tx.commit()?;
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
