//! Errors produced while building or driving a whole network.

use thiserror::Error;

use qn_agent::AgentError;
use qn_core::NodeId;
use qn_station::StationError;

/// Covers the "Topology error", "Initialization error", and
/// "Routing error" (forwarded from `qn-agent`) entries in the error
/// taxonomy, plus station-level errors forwarded from `qn-station`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("edge references node {node}, which does not exist")]
    DanglingEdge { node: NodeId },

    #[error("vertex {vertex} has out-degree 0 and cannot be a routing source")]
    NoOutEdges { vertex: NodeId },

    #[error("cannot initialize: {0}")]
    Initialization(String),

    #[error("agent_cap must be >= 1, got {got}")]
    InvalidAgentCap { got: i64 },

    #[error(transparent)]
    Routing(#[from] AgentError),

    #[error(transparent)]
    Station(#[from] StationError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
