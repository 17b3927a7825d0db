//! Errors produced while constructing or driving a single station.

use thiserror::Error;

use qn_core::EdgeId;

/// Corresponds to the "Server-count error" and "Delay-function-contract
/// violation" entries in the error taxonomy.
#[derive(Debug, Error)]
pub enum StationError {
    #[error("edge {edge_index} has server count {got}, must be >= 1")]
    InvalidServerCount { edge_index: EdgeId, got: i64 },

    #[error("edge {edge_index} is a loss station with buffer {got}, buffer must be >= 0")]
    InvalidBuffer { edge_index: EdgeId, got: i64 },

    #[error("edge {edge_index} has no exogenous arrival source and cannot be activated")]
    NotActivatable { edge_index: EdgeId },

    #[error(
        "delay function at edge {edge_index} returned {got}, which is before the input time {input}"
    )]
    DelayContractViolation {
        edge_index: EdgeId,
        input: f64,
        got: f64,
    },

    #[error("edge {edge_index} is an unknown station type {station_type:?}; treated as a null sink")]
    UnknownStationType {
        edge_index: EdgeId,
        station_type: String,
    },
}

pub type StationResult<T> = Result<T, StationError>;
