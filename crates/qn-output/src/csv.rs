//! CSV output backend.
//!
//! Creates one file in the configured output directory: `station_records.csv`.

use std::fs::File;
use std::path::Path;

use csv::Writer;
use qn_station::StationRecord;

use crate::writer::OutputWriter;
use crate::OutputResult;

/// Writes completed station visits to a single CSV file.
pub struct CsvWriter {
    records:  Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) `station_records.csv` in `dir` and write the header.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut records = Writer::from_path(dir.join("station_records.csv"))?;
        records.write_record([
            "agent_id",
            "arrival",
            "service_start",
            "departure",
            "queue_length_on_arrival",
            "edge_index",
        ])?;

        Ok(Self {
            records,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_records(&mut self, rows: &[StationRecord]) -> OutputResult<()> {
        for row in rows {
            self.records.write_record(&[
                row.agent_id.0.to_string(),
                row.arrival.0.to_string(),
                row.service_start.0.to_string(),
                row.departure.0.to_string(),
                row.queue_length_on_arrival.to_string(),
                row.edge_index.0.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.records.flush()?;
        Ok(())
    }
}
