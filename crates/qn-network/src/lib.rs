//! `qn-network` — topology, global event ordering, and the scheduler for
//! the `qn` queueing-network simulator.
//!
//! # Crate layout
//!
//! | Module       | Contents                                              |
//! |--------------|---------------------------------------------------------|
//! | [`topology`] | `Topology`, `TopologyBuilder` — the CSR directed graph   |
//! | [`ordering`] | `bisect_insert`, `one_bisect_sort`, `one_sort`, `two_sort`|
//! | [`network`]  | `Network`, `NetworkBuilder`, `BlockingPolicy`             |
//! | [`observer`] | `NetworkObserver`, `NoopObserver`                         |
//! | [`error`]    | `NetworkError`, `NetworkResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the `qn-core`/`qn-agent`/    |
//! |         | `qn-station` types this crate re-exports through.              |

pub mod error;
pub mod network;
pub mod observer;
pub mod ordering;
pub mod topology;

pub use error::{NetworkError, NetworkResult};
pub use network::{ActivationSelector, BlockingPolicy, EventOutcome, EventOutcomeKind, Network, NetworkBuilder};
pub use observer::{NetworkObserver, NoopObserver};
pub use topology::{Topology, TopologyBuilder};
