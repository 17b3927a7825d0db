//! The per-edge station state machine.
//!
//! Each station owns the one edge it services: a pool of pending
//! (not-yet-admitted) arrivals, a pool of agents currently in service
//! (pending departures), and a FIFO waiting line for agents that arrived
//! while every server was busy. [`Station::next_event`] advances local time
//! by exactly one event and reports what kind of event it was; the caller
//! (the network scheduler) is responsible for moving a departed agent on to
//! its next station.

use std::collections::VecDeque;
use std::sync::Arc;

use qn_agent::Agent;
use qn_core::{AgentId, EdgeId, NodeId, Time};

use crate::error::{StationError, StationResult};
use crate::pool::TimeOrderedPool;
use crate::row::StationRecord;

/// A pure function of the current time, returning the time of the next
/// event it governs. Implementations must return a value `>= ` the input;
/// a call site that observes a smaller value raises
/// [`StationError::DelayContractViolation`] rather than silently rewinding
/// time.
///
/// `Arc` rather than `Box`: delay functions are pure (no interior state a
/// copy could diverge on), so sharing one behind a reference count is what
/// lets [`Station`] (and in turn `Network`) derive `Clone` cheaply for the
/// `copy()` control-surface operation, instead of requiring every delay
/// function to itself be cloneable.
pub type DelayFn = Arc<dyn Fn(Time) -> Time + Send + Sync>;

/// The edge a station services, carried for record-keeping and routing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_index: EdgeId,
}

/// Server capacity: either a fixed number of parallel servers or no limit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServerCount {
    Bounded(u32),
    Unbounded,
}

impl ServerCount {
    /// Validated constructor corresponding to the "Server-count error"
    /// taxonomy entry: `num_servers` must be `>= 1`.
    pub fn bounded(edge_index: EdgeId, n: i64) -> StationResult<Self> {
        if n < 1 {
            return Err(StationError::InvalidServerCount {
                edge_index,
                got: n,
            });
        }
        Ok(ServerCount::Bounded(n as u32))
    }

    fn value(self) -> Option<u64> {
        match self {
            ServerCount::Bounded(n) => Some(n as u64),
            ServerCount::Unbounded => None,
        }
    }

    fn admits(self, num_in_system: u64) -> bool {
        match self.value() {
            Some(n) => num_in_system <= n,
            None => true,
        }
    }
}

/// The behavioral variant of a station. `Basic`/`Resource`/`Informational`
/// differ only in the delay functions their factory installs; they share
/// identical admission logic (unbounded waiting line, never blocks). `Loss`
/// is the one kind with a hard admission ceiling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StationKind {
    Basic,
    Loss { buffer: u32 },
    Resource,
    Informational,
    NullSink,
}

/// The outcome of advancing a station by one event.
#[derive(Debug)]
pub enum NextEvent {
    /// Nothing pending; both pools are empty.
    None,
    /// An agent was pulled out of the arrivals pool and admitted, either
    /// straight into service or onto the waiting line.
    ArrivalAdmitted,
    /// An agent was pulled out of the arrivals pool and turned away because
    /// the station was at capacity.
    ArrivalBlocked,
    /// An agent finished service and needs to be routed onward.
    Departure(Agent),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    None,
    Arrival,
    Departure,
}

/// An agent waiting in the queue or in service, paired with the queue depth
/// it observed at the moment it arrived — captured once, carried through to
/// whichever [`StationRecord`] it eventually produces.
#[derive(Clone)]
struct Waiting {
    agent: Agent,
    queue_length_on_arrival: u64,
}

#[derive(Clone)]
pub struct Station {
    pub edge: Edge,
    pub kind: StationKind,
    pub num_servers: ServerCount,

    arrivals: TimeOrderedPool<Agent>,
    departures: TimeOrderedPool<Waiting>,
    queue: VecDeque<Waiting>,

    pub num_arrivals: u64,
    pub num_departures: u64,
    pub num_blocked: u64,
    pub num_in_system: u64,
    pub num_total_seen: u64,

    pub local_time: Time,
    pub time: Time,
    pub active: bool,
    pub next_creation_time: Time,

    arrival_f: Option<DelayFn>,
    service_f: DelayFn,

    log: Vec<StationRecord>,
    collecting: bool,
}

impl Station {
    pub fn new(
        edge: Edge,
        kind: StationKind,
        num_servers: ServerCount,
        arrival_f: Option<DelayFn>,
        service_f: DelayFn,
    ) -> Self {
        Self {
            edge,
            kind,
            num_servers,
            arrivals: TimeOrderedPool::new(),
            departures: TimeOrderedPool::new(),
            queue: VecDeque::new(),
            num_arrivals: 0,
            num_departures: 0,
            num_blocked: 0,
            num_in_system: 0,
            num_total_seen: 0,
            local_time: Time::ZERO,
            time: Time::INFINITY,
            active: false,
            next_creation_time: Time(f64::NEG_INFINITY),
            arrival_f,
            service_f,
            log: Vec::new(),
            collecting: true,
        }
    }

    /// A station with unbounded servers, an identity service function, and
    /// no exogenous arrival source — absorbs whatever is routed to it and
    /// never blocks, never queues, never activates.
    pub fn null_sink(edge: Edge) -> Self {
        Self::new(
            edge,
            StationKind::NullSink,
            ServerCount::Unbounded,
            None,
            Arc::new(|t| t),
        )
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether this station has an exogenous arrival generator at all.
    /// `activate()` fails on a station without one — callers that want to
    /// activate "every eligible station" should filter on this first.
    pub fn has_arrival_source(&self) -> bool {
        self.arrival_f.is_some()
    }

    fn recompute_time(&mut self) {
        self.time = std::cmp::min(self.arrivals.head_time(), self.departures.head_time());
    }

    fn next_event_kind(&self) -> EventKind {
        let a = self.arrivals.head_time();
        let d = self.departures.head_time();
        if a.is_infinite() && d.is_infinite() {
            EventKind::None
        } else if a < d {
            EventKind::Arrival
        } else if d < a {
            EventKind::Departure
        } else {
            EventKind::None
        }
    }

    /// Reports what kind of event `next_event` would fire without firing
    /// it, and at what time. Lets a caller (the network scheduler) decide
    /// how to route a departure's agent before it's actually pulled off
    /// the pool.
    pub fn next_event_description(&self) -> (EventKind, Time) {
        (self.next_event_kind(), self.time)
    }

    /// Invokes `service_f`, enforcing the weakly-increasing delay contract.
    fn call_service(&self, t: Time) -> StationResult<Time> {
        let out = (self.service_f)(t);
        if out < t {
            return Err(StationError::DelayContractViolation {
                edge_index: self.edge.edge_index,
                input: t.0,
                got: out.0,
            });
        }
        Ok(out)
    }

    /// Invokes `arrival_f`, enforcing the same contract. Only called when
    /// `arrival_f` is present.
    fn call_arrival(&self, t: Time) -> StationResult<Time> {
        let out = (self.arrival_f.as_ref().expect("arrival_f present"))(t);
        if out < t {
            return Err(StationError::DelayContractViolation {
                edge_index: self.edge.edge_index,
                input: t.0,
                got: out.0,
            });
        }
        Ok(out)
    }

    /// Turns on exogenous arrival generation for this station. No-op if the
    /// station has no `arrival_f` installed — those stations can still
    /// receive agents routed in from elsewhere, they just never generate
    /// their own.
    pub fn activate(&mut self, next_id: &mut dyn FnMut() -> AgentId) -> StationResult<()> {
        if self.arrival_f.is_none() {
            return Err(StationError::NotActivatable {
                edge_index: self.edge.edge_index,
            });
        }
        self.active = true;
        self.maybe_schedule_exogenous(next_id)?;
        self.recompute_time();
        Ok(())
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    fn maybe_schedule_exogenous(&mut self, next_id: &mut dyn FnMut() -> AgentId) -> StationResult<()> {
        if !self.active || self.arrival_f.is_none() {
            return Ok(());
        }
        if self.local_time >= self.next_creation_time {
            let next = self.call_arrival(self.local_time)?;
            self.next_creation_time = next;
            let mut agent = Agent::new(next_id(), next);
            agent.set_arrival(next);
            self.num_total_seen += 1;
            self.arrivals.push(next, agent);
        }
        Ok(())
    }

    /// Whether the station is full enough to reject the next arrival. Only
    /// `Loss` stations have a hard ceiling; every other kind queues without
    /// bound.
    pub fn at_capacity(&self) -> bool {
        match self.kind {
            StationKind::Loss { buffer } => match self.num_servers.value() {
                Some(n) => self.num_in_system >= n + buffer as u64,
                None => false,
            },
            _ => false,
        }
    }

    /// Advances local time to the earliest pending event and applies it.
    /// Returns [`NextEvent::None`] if both pools are empty.
    pub fn next_event(&mut self, next_id: &mut dyn FnMut() -> AgentId) -> StationResult<NextEvent> {
        match self.next_event_kind() {
            EventKind::None => Ok(NextEvent::None),
            EventKind::Arrival => self.handle_arrival(next_id),
            EventKind::Departure => self.handle_departure(),
        }
    }

    fn handle_arrival(&mut self, next_id: &mut dyn FnMut() -> AgentId) -> StationResult<NextEvent> {
        let (t, mut agent) = self.arrivals.pop().expect("arrival pool is non-empty");
        self.local_time = t;

        let outcome = if self.at_capacity() {
            self.num_blocked += 1;
            self.num_arrivals += 1;
            self.num_in_system += 1;
            agent.add_loss();
            // A blocked agent departs instantly: it was never actually
            // admitted to service, but it still needs to flow through the
            // departure path so routing and bookkeeping stay uniform.
            self.departures.push(
                t,
                Waiting {
                    agent,
                    queue_length_on_arrival: self.queue.len() as u64,
                },
            );
            NextEvent::ArrivalBlocked
        } else {
            self.num_arrivals += 1;
            self.num_in_system += 1;
            let queue_length_on_arrival = self.queue.len() as u64;
            if self.num_servers.admits(self.num_in_system) {
                agent.set_service_start(t);
                let departure_time = self.call_service(t)?;
                self.departures.push(
                    departure_time,
                    Waiting {
                        agent,
                        queue_length_on_arrival,
                    },
                );
            } else {
                self.queue.push_back(Waiting {
                    agent,
                    queue_length_on_arrival,
                });
            }
            NextEvent::ArrivalAdmitted
        };

        self.maybe_schedule_exogenous(next_id)?;
        self.recompute_time();
        Ok(outcome)
    }

    fn handle_departure(&mut self) -> StationResult<NextEvent> {
        let (t, waiting) = self
            .departures
            .pop()
            .expect("departure pool is non-empty");
        self.local_time = t;
        self.num_departures += 1;
        self.num_total_seen -= 1;
        self.num_in_system -= 1;

        if self.collecting {
            self.log.push(StationRecord {
                agent_id: waiting.agent.id,
                arrival: waiting.agent.arr_ser.arrival,
                service_start: waiting.agent.arr_ser.service_start,
                departure: t,
                queue_length_on_arrival: waiting.queue_length_on_arrival,
                edge_index: self.edge.edge_index,
            });
        }

        if let Some(mut next_in_line) = self.queue.pop_front() {
            next_in_line.agent.set_service_start(t);
            let departure_time = self.call_service(t)?;
            self.departures.push(departure_time, next_in_line);
        }

        self.recompute_time();
        Ok(NextEvent::Departure(waiting.agent))
    }

    /// Receives an agent routed in from another station, bypassing the
    /// exogenous-arrival pool entirely. Used for both internal routing
    /// transfers and test seeding. Unlike the exogenous arrival path, a
    /// transfer is never turned away here — a `Loss` station only rejects
    /// agents it draws from its own arrivals pool (§4.1); whether a
    /// transfer into an at-capacity destination is honored at all is a
    /// network-level blocking-policy decision, made by the caller before
    /// this is invoked (see [`crate::StationKind::Loss`] and the congestion
    /// variant in `qn-network`).
    pub fn admit_external(&mut self, mut agent: Agent, t: Time) -> StationResult<()> {
        agent.set_arrival(t);
        self.num_total_seen += 1;
        self.num_in_system += 1;
        let queue_length_on_arrival = self.queue.len() as u64;
        if self.num_servers.admits(self.num_in_system) {
            agent.set_service_start(t);
            let departure_time = self.call_service(t)?;
            self.departures.push(
                departure_time,
                Waiting {
                    agent,
                    queue_length_on_arrival,
                },
            );
        } else {
            self.queue.push_back(Waiting {
                agent,
                queue_length_on_arrival,
            });
        }
        self.recompute_time();
        Ok(())
    }

    /// Receives a transfer that the default (per-destination) blocking
    /// policy turns away on the spot: the agent is marked lost and released
    /// immediately, exactly like an exogenous arrival blocked at a `Loss`
    /// station, so it still flows onward as a departure rather than
    /// vanishing mid-transfer.
    pub fn admit_external_blocked(&mut self, mut agent: Agent, t: Time) {
        agent.set_arrival(t);
        self.num_total_seen += 1;
        self.num_in_system += 1;
        self.num_blocked += 1;
        agent.add_loss();
        self.departures.push(
            t,
            Waiting {
                agent,
                queue_length_on_arrival: self.queue.len() as u64,
            },
        );
        self.recompute_time();
    }

    /// Records that a would-be transfer into this station was turned away
    /// by the held-back congestion policy without ever reaching this
    /// station's pools — the counter moves, nothing else does.
    pub fn record_blocked_transfer(&mut self) {
        self.num_blocked += 1;
    }

    /// Held-back congestion policy: the station's own pending departure
    /// cannot actually leave because its destination is saturated. Called
    /// *before* that departure ever fires — `next_event` must not be
    /// invoked for it — so it operates on the still-present `departures`
    /// head in place: pops it, marks it blocked, resamples a new departure
    /// time from `now`, and reinserts it. No counters besides the agent's
    /// own `blocked` move; the agent is retried the next time it reaches
    /// the head of `departures`.
    pub fn delay_service(&mut self, now: Time) -> StationResult<()> {
        let (_, mut waiting) = self
            .departures
            .pop()
            .expect("delay_service requires a pending departure");
        waiting.agent.add_loss();
        let departure_time = self.call_service(now)?;
        self.departures.push(departure_time, waiting);
        self.recompute_time();
        Ok(())
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn num_in_service(&self) -> usize {
        self.departures.len()
    }

    pub fn num_pending_arrivals(&self) -> usize {
        self.arrivals.len()
    }

    pub fn utilization(&self) -> f64 {
        match self.num_servers.value() {
            Some(0) | None => 0.0,
            Some(n) => self.departures.len() as f64 / n as f64,
        }
    }

    pub fn collect_data(&mut self) {
        self.collecting = true;
    }

    pub fn stop_collecting_data(&mut self) {
        self.collecting = false;
    }

    pub fn fetch_data(&self) -> &[StationRecord] {
        &self.log
    }

    pub fn clear_data(&mut self) {
        self.log.clear();
    }

    /// Resets all counters and empties both pools and the waiting line.
    /// Agents in flight through this station are discarded, not routed
    /// onward — the caller owns deciding whether that's appropriate (it is,
    /// during a full network reset; it wouldn't be mid-run).
    pub fn clear(&mut self) {
        self.arrivals.clear();
        self.departures.clear();
        self.queue.clear();
        self.num_arrivals = 0;
        self.num_departures = 0;
        self.num_blocked = 0;
        self.num_in_system = 0;
        self.num_total_seen = 0;
        self.local_time = Time::ZERO;
        self.time = Time::INFINITY;
        self.active = false;
        self.next_creation_time = Time(f64::NEG_INFINITY);
    }
}
