//! `qn-agent` — the mobile record and routing policy for the `qn`
//! queueing-network simulator.
//!
//! # Crate layout
//!
//! | Module     | Contents                                          |
//! |------------|----------------------------------------------------|
//! | [`agent`]  | `Agent`, `TimingSlot`                              |
//! | [`router`] | `Router` trait, `UniformRouter`, `RoutingTable`    |
//! | [`error`]  | `AgentError`, `AgentResult`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                |
//! |---------|--------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.    |

pub mod agent;
pub mod error;
pub mod router;


pub use agent::{Agent, TimingSlot};
pub use error::{AgentError, AgentResult};
pub use router::{Router, RoutingTable, UniformRouter};
