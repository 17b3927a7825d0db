//! `qn-station` — the per-edge station state machine for the `qn`
//! queueing-network simulator.
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|---------------------------------------------------------|
//! | [`pool`]    | `TimeOrderedPool<T>`, the arrival/departure heap         |
//! | [`station`] | `Station`, `StationKind`, `ServerCount`, `NextEvent`      |
//! | [`factory`] | `StationFactory`, `StationConfig` — edge-type → station  |
//! | [`row`]     | `StationRecord`, the per-agent output row                |
//! | [`error`]   | `StationError`, `StationResult`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                |
//! |---------|--------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to [`row::StationRecord`]. |

pub mod error;
pub mod factory;
pub mod pool;
pub mod row;
pub mod station;


pub use error::{StationError, StationResult};
pub use factory::{DelayFnFactory, StationConfig, StationFactory};
pub use pool::TimeOrderedPool;
pub use row::StationRecord;
pub use station::{DelayFn, Edge, EventKind, NextEvent, ServerCount, Station, StationKind};
