//! `qn-output` — simulation output writers for the `qn` queueing-network
//! simulator.
//!
//! Three backends are provided behind Cargo features, all writing the same
//! [`qn_station::StationRecord`] shape:
//!
//! | Feature   | Backend     | Files created              |
//! |-----------|-------------|------------------------------|
//! | *(none)*  | CSV         | `station_records.csv`       |
//! | `sqlite`  | SQLite      | `output.db`                 |
//! | `parquet` | Parquet     | `station_records.parquet`   |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `qn_network::NetworkObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use qn_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = SimOutputObserver::new(writer);
//! network.simulate_events(10_000, &mut obs).unwrap();
//! obs.flush(&mut network);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
