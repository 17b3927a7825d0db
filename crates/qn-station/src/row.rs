//! The flat record a station emits for each agent it completes service for.

use qn_core::{AgentId, EdgeId, Time};

/// One completed sojourn through a station: enough to reconstruct wait time,
/// service time, and queue pressure without re-running the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationRecord {
    pub agent_id: AgentId,
    pub arrival: Time,
    pub service_start: Time,
    pub departure: Time,
    pub queue_length_on_arrival: u64,
    pub edge_index: EdgeId,
}

impl StationRecord {
    pub fn wait_time(&self) -> f64 {
        self.service_start.0 - self.arrival.0
    }

    pub fn service_time(&self) -> f64 {
        self.departure.0 - self.service_start.0
    }

    pub fn sojourn_time(&self) -> f64 {
        self.departure.0 - self.arrival.0
    }
}
