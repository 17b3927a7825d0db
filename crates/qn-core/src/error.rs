//! Shared error type.
//!
//! Sub-crates define their own richer error enums (see `qn-network::error`
//! for the topology/routing/server-count/delay-contract kinds) and convert
//! into or wrap `QnError` as needed. Both patterns are acceptable; prefer
//! whichever keeps error sites clean.

use thiserror::Error;

use crate::{AgentId, NodeId};

/// The top-level error type shared by every `qn-*` crate.
#[derive(Debug, Error)]
pub enum QnError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `qn-*` crates.
pub type QnResult<T> = Result<T, QnError>;
