//! Routing error type.

use thiserror::Error;

use qn_core::NodeId;

/// Errors produced by `qn-agent`'s routing policies. Corresponds to the
/// "Routing error" kind in the error taxonomy: rejected at the point the
/// routing table is set, or raised when a router is asked to route from a
/// vertex with no out-edges and no sink station has been configured there.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("vertex {vertex} has no out-edges to route to")]
    NoOutEdges { vertex: NodeId },

    #[error("routing vector for vertex {vertex} has length {got}, expected {expected}")]
    RoutingLengthMismatch {
        vertex: NodeId,
        expected: usize,
        got: usize,
    },

    #[error("routing vector for vertex {vertex} sums to {sum}, expected 1 within 1e-9")]
    RoutingSumMismatch { vertex: NodeId, sum: f64 },

    #[error("routing matrix shape mismatch: expected {expected} rows/columns, got {got}")]
    RoutingMatrixShape { expected: usize, got: usize },
}

pub type AgentResult<T> = Result<T, AgentError>;
