//! The mobile record that flows through the network.

use qn_core::{AgentId, NodeId, Time};

/// Per-visit timing slots, reused for both the arrival/service-start pair and
/// the rest-start/rest-total pair carried by the original model.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingSlot {
    pub arrival: Time,
    pub service_start: Time,
}

/// A mobile record owned by exactly one station at any moment.
///
/// `time` is the agent's next scheduled event time — the value a station's
/// pool orders on. It is monotone non-decreasing along the agent's
/// trajectory, except that a transfer sets the new arrival time to the
/// donor station's departure time (never a rewind).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,
    pub time: Time,
    pub kind: u32,
    pub trips: u64,
    pub blocked: u64,

    /// `[arrival, service_start]` for the current visit.
    pub arr_ser: TimingSlot,
    /// `[rest_start, rest_total]` — cumulative time spent waiting in a FIFO
    /// queue, updated whenever the agent is pulled off a queue into service.
    pub rest_start: Time,
    pub rest_total: f64,

    /// Origin/destination marker: the vertex the agent entered from and the
    /// vertex it is currently travelling toward.
    pub od: [NodeId; 2],
}

impl Agent {
    pub fn new(id: AgentId, time: Time) -> Self {
        Self {
            id,
            time,
            kind: 0,
            trips: 0,
            blocked: 0,
            arr_ser: TimingSlot::default(),
            rest_start: Time::ZERO,
            rest_total: 0.0,
            od: [NodeId::INVALID; 2],
        }
    }

    /// Record arrival at a station at time `t`. Called by
    /// `Station::admit_external` before the agent is placed in a pool.
    pub fn set_arrival(&mut self, t: Time) {
        self.arr_ser.arrival = t;
        self.time = t;
        self.trips += 1;
    }

    /// Record that service began at time `t` (the agent left the waiting
    /// line, or was admitted straight into the departures pool).
    pub fn set_service_start(&mut self, t: Time) {
        self.arr_ser.service_start = t;
    }

    /// Record that this agent was turned away by a loss or held-back
    /// blocking policy.
    pub fn add_loss(&mut self) {
        self.blocked += 1;
    }
}
