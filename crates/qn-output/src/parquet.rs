//! Parquet output backend (feature `parquet`).
//!
//! Creates a single `station_records.parquet` file in the configured output
//! directory.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use qn_station::StationRecord;

use crate::writer::OutputWriter;
use crate::OutputResult;

fn record_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("agent_id", DataType::UInt32, false),
        Field::new("arrival", DataType::Float64, false),
        Field::new("service_start", DataType::Float64, false),
        Field::new("departure", DataType::Float64, false),
        Field::new("queue_length_on_arrival", DataType::UInt64, false),
        Field::new("edge_index", DataType::UInt32, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes simulation output to a single Parquet file.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    writer: Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create `station_records.parquet` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let schema = record_schema();
        let file = File::create(dir.join("station_records.parquet"))?;
        let writer = ArrowWriter::try_new(file, Arc::clone(&schema), Some(snappy_props()))?;

        Ok(Self {
            writer: Some(writer),
            schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_records(&mut self, rows: &[StationRecord]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };

        let mut agent_ids = UInt32Builder::new();
        let mut arrivals = Float64Builder::new();
        let mut service_starts = Float64Builder::new();
        let mut departures = Float64Builder::new();
        let mut queue_lengths = UInt64Builder::new();
        let mut edge_indices = UInt32Builder::new();

        for row in rows {
            agent_ids.append_value(row.agent_id.0);
            arrivals.append_value(row.arrival.0);
            service_starts.append_value(row.service_start.0);
            departures.append_value(row.departure.0);
            queue_lengths.append_value(row.queue_length_on_arrival);
            edge_indices.append_value(row.edge_index.0);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                Arc::new(agent_ids.finish()),
                Arc::new(arrivals.finish()),
                Arc::new(service_starts.finish()),
                Arc::new(departures.finish()),
                Arc::new(queue_lengths.finish()),
                Arc::new(edge_indices.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.writer.take() {
            w.close()?;
        }
        Ok(())
    }
}
