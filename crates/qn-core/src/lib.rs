//! `qn-core` — foundational types for the `qn` queueing-network simulator.
//!
//! This crate is a dependency of every other `qn-*` crate. It intentionally
//! has no `qn-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                   |
//! |-----------|---------------------------------------------|
//! | [`ids`]   | `AgentId`, `NodeId`, `EdgeId`, `StationId`  |
//! | [`time`]  | `Time`, `SimConfig`                        |
//! | [`rng`]   | `SimRng`                                   |
//! | [`error`] | `QnError`, `QnResult`                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.   |
//!           | Required by `qn-output`.                              |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{QnError, QnResult};
pub use ids::{AgentId, EdgeId, NodeId, StationId};
pub use rng::SimRng;
pub use time::{SimConfig, Time};
