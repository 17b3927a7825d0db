//! The `Network`: global event ordering and the scheduler loop.
//!
//! A station's local time already tells it what its own next event is;
//! `Network` is what decides *which station* goes next across the whole
//! graph and carries a departing agent across a zero-lag transfer to its
//! next station. The order vector (see [`crate::ordering`]) keeps the
//! earliest-next-event station at its tail so each step is a pop and a
//! handful of reinsertions rather than a fresh global scan.

use std::collections::HashMap;

use rustc_hash::FxHashMap;

use qn_agent::{Router, RoutingTable};
use qn_core::{AgentId, EdgeId, NodeId, SimConfig, SimRng, StationId, Time};
use qn_station::{Edge, NextEvent, Station, StationFactory, StationRecord};

use crate::error::{NetworkError, NetworkResult};
use crate::observer::NetworkObserver;
use crate::ordering::{bisect_insert, one_bisect_sort};
use crate::topology::Topology;

/// How a transfer into an already-full `Loss` station is handled.
///
/// `Loss` is the default described in §4.1: the destination still "departs"
/// the agent instantly, just flagged as lost, so flow keeps moving. The
/// held-back variant instead refuses the transfer outright and leaves the
/// agent in service at its current station a while longer — used to model
/// congestion that backs up rather than simply discards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BlockingPolicy {
    #[default]
    Loss,
    HeldBack,
}

/// Which edges/vertices/how-many get their exogenous arrivals turned on by
/// [`Network::initialize`].
pub enum ActivationSelector {
    /// Activate exactly these edges.
    Edges(Vec<EdgeId>),
    /// Activate the edge from `a` to `b`, for each pair, if one exists.
    Pairs(Vec<(NodeId, NodeId)>),
    /// Activate every edge whose type tag is in this set.
    EdgeTypes(Vec<String>),
    /// Activate `n` edges chosen uniformly at random, without replacement.
    Count(usize),
    /// Activate every edge that has an arrival function at all.
    All,
}

/// A single global event, as reported by [`Network::advance_one_event`].
#[derive(Debug)]
pub struct EventOutcome {
    pub station: StationId,
    pub time: Time,
    pub kind: EventOutcomeKind,
}

#[derive(Debug)]
pub enum EventOutcomeKind {
    ArrivalAdmitted,
    ArrivalBlocked,
    Departure { routed_to: Option<StationId> },
    /// The held-back congestion policy refused the transfer: the agent
    /// never actually left `station` — it was re-serviced in place and
    /// will retry `destination` later.
    HeldBack { destination: StationId },
    Idle,
}

/// The queueing network: topology, one station per edge, a routing policy,
/// and the global event order.
#[derive(Clone)]
pub struct Network {
    topology: Topology,
    stations: Vec<Station>,
    routing: RoutingTable,
    rng: SimRng,
    seed: u64,
    order: Vec<StationId>,
    agent_cap: u64,
    num_events: u64,
    current_time: Time,
    next_agent_id: u32,
    blocking_policy: BlockingPolicy,
    initialized: bool,
}

impl Network {
    /// `StationId` and the `EdgeId` it services share the same numeric
    /// space (see `qn_core::ids`) — this is the identity mapping between
    /// them, kept as a named function so call sites read as intent rather
    /// than a bare cast.
    #[inline]
    fn station_of(edge: EdgeId) -> StationId {
        StationId(edge.0)
    }

    fn edge_of(station: StationId) -> EdgeId {
        EdgeId(station.0)
    }

    fn station(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    fn station_mut(&mut self, id: StationId) -> &mut Station {
        &mut self.stations[id.index()]
    }

    /// Sum of `num_in_system` across every station. Used by the `agent_cap`
    /// soft brake. `O(num_stations)` per call — accepted for clarity; the
    /// graphs this simulator targets are small enough that this never shows
    /// up as the bottleneck.
    fn total_population(&self) -> u64 {
        self.stations.iter().map(|s| s.num_in_system).sum()
    }

    /// Deactivates `station` if the population cap has been exceeded. The
    /// cap is a soft brake, not a rejection: a station already holding
    /// agents keeps serving them, it just stops generating new exogenous
    /// arrivals.
    fn enforce_agent_cap(&mut self, station: StationId) {
        if self.agent_cap == 0 {
            return;
        }
        if self.station(station).is_active() && self.total_population() > self.agent_cap - 1 {
            self.station_mut(station).deactivate();
        }
    }

    /// Removes `id` from `order` if its time is now infinite, otherwise
    /// inserts/repositions it. `was_present` lets the common "just popped
    /// the tail" case skip the linear id search `one_bisect_sort` would
    /// otherwise do.
    fn reinsert(&mut self, id: StationId, was_present: bool) {
        let time = self.station(id).time;
        if time.is_infinite() {
            if !was_present {
                // Already absent (just popped); nothing left to remove.
                return;
            }
            if let Some(pos) = self.order.iter().position(|&s| s == id) {
                self.order.remove(pos);
            }
            return;
        }
        if was_present {
            // Still in `order` under its old time; remove-then-reinsert.
            one_bisect_sort(&mut self.order, id, |s| self.stations[s.index()].time);
        } else {
            // Already absent (just popped, or never had a pending event).
            bisect_insert(&mut self.order, id, |s| self.stations[s.index()].time);
        }
    }

    fn next_id(next_agent_id: &mut u32) -> AgentId {
        let id = AgentId(*next_agent_id);
        *next_agent_id += 1;
        id
    }

    /// Turns on exogenous arrival generation for whichever stations
    /// `selector` names, then builds the initial global order from
    /// scratch. Must be called before [`Network::advance_one_event`] or any
    /// `simulate*` method; calling it twice re-derives the order but does
    /// not reset any station already producing agents.
    pub fn initialize(&mut self, selector: ActivationSelector) -> NetworkResult<()> {
        let edges: Vec<EdgeId> = match selector {
            ActivationSelector::Edges(v) => v,
            ActivationSelector::Pairs(pairs) => pairs
                .into_iter()
                .filter_map(|(a, b)| {
                    self.topology
                        .out_edges(a)
                        .iter()
                        .find(|&&e| self.topology.edge_target(e) == b)
                        .copied()
                })
                .collect(),
            ActivationSelector::EdgeTypes(types) => (0..self.topology.edge_count() as u32)
                .map(EdgeId)
                .filter(|&e| types.iter().any(|t| t == self.topology.edge_type(e)))
                .collect(),
            ActivationSelector::Count(n) => {
                if n == 0 {
                    return Err(NetworkError::Initialization(
                        "activation count must be >= 1".to_string(),
                    ));
                }
                if n > self.topology.edge_count() {
                    return Err(NetworkError::Initialization(format!(
                        "activation count {n} exceeds edge count {}",
                        self.topology.edge_count()
                    )));
                }
                let mut all: Vec<EdgeId> = (0..self.topology.edge_count() as u32).map(EdgeId).collect();
                let mut chosen = Vec::with_capacity(n);
                for _ in 0..n {
                    let idx = self.rng.gen_index(all.len());
                    chosen.push(all.swap_remove(idx));
                }
                chosen
            }
            ActivationSelector::All => (0..self.topology.edge_count() as u32)
                .map(EdgeId)
                .filter(|&e| self.stations[Self::station_of(e).index()].has_arrival_source())
                .collect(),
        };

        let mut next_agent_id = self.next_agent_id;
        for edge in edges {
            let station = Self::station_of(edge);
            self.stations[station.index()].activate(&mut || Self::next_id(&mut next_agent_id))?;
        }
        self.next_agent_id = next_agent_id;

        self.order.clear();
        for (i, s) in self.stations.iter().enumerate() {
            if !s.time.is_infinite() {
                self.order.push(StationId::try_from(i).expect("station count fits StationId"));
            }
        }
        self.order.sort_by(|&a, &b| self.stations[b.index()].time.cmp(&self.stations[a.index()].time));
        self.initialized = true;
        Ok(())
    }

    /// Advances the simulation by exactly one global event, notifying
    /// `observer` at each relevant point. Returns [`EventOutcomeKind::Idle`]
    /// (with `station` and `time` meaningless) once the order is empty —
    /// every station has either never been activated or has burned down to
    /// `Time::INFINITY`.
    pub fn advance_one_event<O: NetworkObserver>(&mut self, observer: &mut O) -> NetworkResult<EventOutcome> {
        if !self.initialized {
            return Err(NetworkError::Initialization(
                "initialize() must be called before advancing the simulation".to_string(),
            ));
        }

        let Some(q1_id) = self.order.pop() else {
            self.current_time = Time::INFINITY;
            return Ok(EventOutcome {
                station: StationId::INVALID,
                time: Time::INFINITY,
                kind: EventOutcomeKind::Idle,
            });
        };

        let t1 = self.station(q1_id).time;
        self.current_time = t1;
        observer.on_event_start(q1_id, t1);

        let mut next_agent_id = self.next_agent_id;
        let (kind, _) = self.station(q1_id).next_event_description();

        let outcome = match kind {
            qn_station::EventKind::None => {
                // A<D tie with both finite resolves to `None`; the station
                // still has a pending event (it just didn't fire), so it
                // goes right back into the order unchanged.
                self.reinsert(q1_id, false);
                EventOutcomeKind::Idle
            }
            qn_station::EventKind::Arrival => {
                self.enforce_agent_cap(q1_id);
                let event = self
                    .station_mut(q1_id)
                    .next_event(&mut || Self::next_id(&mut next_agent_id))?;
                self.next_agent_id = next_agent_id;
                self.num_events += 1;
                self.reinsert(q1_id, false);
                match event {
                    NextEvent::ArrivalAdmitted => {
                        observer.on_arrival_admitted(q1_id);
                        EventOutcomeKind::ArrivalAdmitted
                    }
                    NextEvent::ArrivalBlocked => {
                        observer.on_arrival_blocked(q1_id);
                        EventOutcomeKind::ArrivalBlocked
                    }
                    _ => unreachable!("next_event_description reported Arrival"),
                }
            }
            qn_station::EventKind::Departure => {
                // Routing depends only on the target vertex, never on the
                // particular agent instance, so the destination can (and,
                // for the held-back policy, must) be resolved before the
                // departure actually fires.
                let target_vertex = self.topology.edge_target(Self::edge_of(q1_id));
                let out_edges = self.topology.out_edges(target_vertex);
                if out_edges.is_empty() {
                    return Err(NetworkError::NoOutEdges { vertex: target_vertex });
                }
                let e2 = self.routing.choose(target_vertex, out_edges, &mut self.rng)?;
                let q2_id = Self::station_of(e2);

                self.num_events += 1;

                let held_back = self.blocking_policy == BlockingPolicy::HeldBack
                    && self.station(q2_id).at_capacity();

                if held_back {
                    // The destination is saturated: q1's pending departure
                    // never fires. It stays on the `departures` head,
                    // re-serviced in place — no `next_event`, no completed
                    // record, no waiting-line advance, no agent handed
                    // anywhere. Only the blocked counters move.
                    self.station_mut(q2_id).record_blocked_transfer();
                    observer.on_arrival_blocked(q2_id);
                    self.station_mut(q1_id).delay_service(t1)?;
                    self.reinsert(q1_id, false);
                    EventOutcomeKind::HeldBack { destination: q2_id }
                } else {
                    let event = self
                        .station_mut(q1_id)
                        .next_event(&mut || Self::next_id(&mut next_agent_id))?;
                    self.next_agent_id = next_agent_id;

                    let agent = match event {
                        NextEvent::Departure(agent) => agent,
                        _ => unreachable!("next_event_description reported Departure"),
                    };

                    // q1 was already popped off `order` above, so it's
                    // always absent at this point; q2 (which may be the
                    // same station, for a self-loop edge) keeps whatever
                    // presence it had before the transfer below changes
                    // its time.
                    let q2_was_present = !self.station(q2_id).time.is_infinite();

                    // `admit_external`/`admit_external_blocked` take the
                    // agent by value, so snapshot what the observer needs
                    // to report before it moves.
                    let departed = agent.clone();

                    if self.station(q2_id).at_capacity() {
                        // Default Loss policy: still admitted, instantly lost.
                        self.station_mut(q2_id).admit_external_blocked(agent, t1);
                        observer.on_arrival_blocked(q2_id);
                    } else {
                        self.station_mut(q2_id).admit_external(agent, t1)?;
                        observer.on_arrival_admitted(q2_id);
                    }
                    self.enforce_agent_cap(q2_id);

                    let routed_to = Some(q2_id);
                    if q2_id == q1_id {
                        self.reinsert(q1_id, q2_was_present);
                    } else {
                        self.reinsert(q1_id, false);
                        self.reinsert(q2_id, q2_was_present);
                    }

                    observer.on_departure(q1_id, &departed, routed_to);
                    EventOutcomeKind::Departure { routed_to }
                }
            }
        };

        Ok(EventOutcome {
            station: q1_id,
            time: t1,
            kind: outcome,
        })
    }

    fn run_until<O: NetworkObserver>(
        &mut self,
        observer: &mut O,
        mut should_stop: impl FnMut(&Network) -> bool,
    ) -> NetworkResult<()> {
        while !should_stop(self) && !self.order.is_empty() {
            self.advance_one_event(observer)?;
        }
        observer.on_run_end(self.num_events);
        Ok(())
    }

    /// Runs until exactly `n` events have fired since the call (or the
    /// order empties out first, whichever comes first).
    pub fn simulate_events<O: NetworkObserver>(&mut self, n: u64, observer: &mut O) -> NetworkResult<()> {
        let target = self.num_events + n;
        self.run_until(observer, |net| net.num_events >= target)
    }

    /// Runs until `current_time >= t`.
    pub fn simulate_until<O: NetworkObserver>(&mut self, t: Time, observer: &mut O) -> NetworkResult<()> {
        self.run_until(observer, |net| net.current_time >= t)
    }

    /// Runs until `k` exogenous arrivals have been admitted across the
    /// whole network (summed `num_arrivals` over every station).
    pub fn simulate_exogenous_arrivals<O: NetworkObserver>(&mut self, k: u64, observer: &mut O) -> NetworkResult<()> {
        let start: u64 = self.stations.iter().map(|s| s.num_arrivals).sum();
        let target = start + k;
        self.run_until(observer, |net| {
            net.stations.iter().map(|s| s.num_arrivals).sum::<u64>() >= target
        })
    }

    /// Runs until `k` departures have fired across the whole network.
    pub fn simulate_departures<O: NetworkObserver>(&mut self, k: u64, observer: &mut O) -> NetworkResult<()> {
        let start: u64 = self.stations.iter().map(|s| s.num_departures).sum();
        let target = start + k;
        self.run_until(observer, |net| {
            net.stations.iter().map(|s| s.num_departures).sum::<u64>() >= target
        })
    }

    pub fn set_routing_vertex(&mut self, vertex: NodeId, probs: Vec<f64>) -> NetworkResult<()> {
        let out_degree = self.topology.out_degree(vertex);
        self.routing.set_vertex(vertex, out_degree, probs)?;
        Ok(())
    }

    pub fn set_routing_matrix(&mut self, matrix: &[Vec<f64>]) -> NetworkResult<()> {
        let num_vertices = self.topology.node_count();
        let topology = &self.topology;
        self.routing.set_matrix(
            num_vertices,
            matrix,
            |v| topology.out_edges(v).to_vec(),
            |e| topology.edge_target(e),
        )?;
        Ok(())
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    pub fn num_events(&self) -> u64 {
        self.num_events
    }

    pub fn station_by_edge(&self, edge: EdgeId) -> &Station {
        self.station(Self::station_of(edge))
    }

    /// All station logs flattened into one list, in station-index order.
    pub fn fetch_data(&self) -> Vec<StationRecord> {
        self.stations.iter().flat_map(|s| s.fetch_data().iter().copied()).collect()
    }

    /// Every station's log grouped by agent, each group sorted by arrival
    /// time, for reconstructing a single agent's trajectory across the
    /// whole network.
    pub fn fetch_data_by_agent(&self) -> FxHashMap<AgentId, Vec<StationRecord>> {
        let mut by_agent: FxHashMap<AgentId, Vec<StationRecord>> = HashMap::default();
        for station in &self.stations {
            for row in station.fetch_data() {
                by_agent.entry(row.agent_id).or_default().push(*row);
            }
        }
        for rows in by_agent.values_mut() {
            rows.sort_by_key(|r| r.arrival);
        }
        by_agent
    }

    pub fn clear_data(&mut self) {
        for station in &mut self.stations {
            station.clear_data();
        }
    }

    /// Resets every station and the global order, discarding all agents in
    /// flight. Exogenous arrival generation is turned back off; call
    /// [`Network::initialize`] again to resume.
    pub fn clear(&mut self) {
        for station in &mut self.stations {
            station.clear();
        }
        self.order.clear();
        self.num_events = 0;
        self.current_time = Time::ZERO;
        self.next_agent_id = 0;
        self.initialized = false;
        self.rng = SimRng::new(self.seed);
    }

    /// A fully independent deep snapshot: advancing either instance has no
    /// effect on the other. Cheap because delay functions are shared
    /// behind `Arc` rather than duplicated — only mutable simulation state
    /// (pools, counters, the RNG stream, the order vector) is actually
    /// copied.
    pub fn copy(&self) -> Self {
        self.clone()
    }
}

/// Fluent builder for [`Network`].
///
/// # Required inputs
/// - a [`Topology`]
/// - a [`StationFactory`] (one [`qn_station::StationConfig`] registered per
///   edge type present in the topology; unmatched edge types fall back to
///   a null-sink station)
///
/// # Optional inputs (have defaults)
/// | Method              | Default                  |
/// |---------------------|---------------------------|
/// | `.agent_cap(n)`     | `0` (no cap)               |
/// | `.blocking_policy(p)` | [`BlockingPolicy::Loss`] |
/// | `.routing(table)`   | all vertices uniform       |
pub struct NetworkBuilder {
    topology: Topology,
    factory: StationFactory,
    seed: u64,
    agent_cap: i64,
    blocking_policy: BlockingPolicy,
    routing: Option<RoutingTable>,
}

impl NetworkBuilder {
    pub fn new(topology: Topology, factory: StationFactory, config: &SimConfig) -> Self {
        Self {
            topology,
            factory,
            seed: config.seed,
            agent_cap: 0,
            blocking_policy: BlockingPolicy::Loss,
            routing: None,
        }
    }

    pub fn agent_cap(mut self, agent_cap: i64) -> Self {
        self.agent_cap = agent_cap;
        self
    }

    pub fn blocking_policy(mut self, policy: BlockingPolicy) -> Self {
        self.blocking_policy = policy;
        self
    }

    pub fn routing(mut self, routing: RoutingTable) -> Self {
        self.routing = Some(routing);
        self
    }

    pub fn build(self) -> NetworkResult<Network> {
        if self.agent_cap < 0 {
            return Err(NetworkError::InvalidAgentCap { got: self.agent_cap });
        }

        let edge_count = self.topology.edge_count();
        let mut stations = Vec::with_capacity(edge_count);
        for i in 0..edge_count as u32 {
            let edge_id = EdgeId(i);
            let edge = Edge {
                source: self.topology.edge_source(edge_id),
                target: self.topology.edge_target(edge_id),
                edge_index: edge_id,
            };
            let mut rng = SimRng::derive(self.seed, i as u64);
            stations.push(self.factory.build(edge, self.topology.edge_type(edge_id), &mut rng));
        }

        Ok(Network {
            topology: self.topology,
            stations,
            routing: self.routing.unwrap_or_default(),
            rng: SimRng::new(self.seed),
            seed: self.seed,
            order: Vec::new(),
            agent_cap: self.agent_cap as u64,
            num_events: 0,
            current_time: Time::ZERO,
            next_agent_id: 0,
            blocking_policy: self.blocking_policy,
            initialized: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use qn_agent::Agent;
    use qn_core::{NodeId, SimConfig};
    use qn_station::{DelayFnFactory, ServerCount, StationConfig, StationFactory};

    use super::*;
    use crate::observer::NoopObserver;
    use crate::topology::TopologyBuilder;

    /// Plays back a fixed, strictly increasing sequence of arrival times and
    /// then goes silent (`Time::INFINITY` forever) — a station built on this
    /// is guaranteed to eventually stop generating new agents rather than
    /// run forever, and the increasing sequence can never trip the delay
    /// contract (each value is `>=` the one before it, and also `>=` the
    /// `0.0` the station starts at).
    fn scripted_arrivals(times: Vec<f64>) -> DelayFnFactory {
        Box::new(move |_rng| {
            let times = times.clone();
            let next = AtomicUsize::new(0);
            Arc::new(move |_t| {
                let i = next.fetch_add(1, Ordering::Relaxed);
                times.get(i).copied().map(Time).unwrap_or(Time::INFINITY)
            })
        })
    }

    fn fixed_service(duration: f64) -> DelayFnFactory {
        Box::new(move |_rng| Arc::new(move |t| t + duration))
    }

    fn config() -> SimConfig {
        SimConfig { seed: 7, num_active: None }
    }

    /// One vertex, one self-loop edge of type `"loop"`.
    fn self_loop_topology() -> Topology {
        let mut b = TopologyBuilder::new();
        let n = b.add_node();
        b.add_edge(n, n, "loop");
        b.build()
    }

    /// `gateway -> loss -> drain`, with `drain` self-looping so it never
    /// dead-ends a departure. Only `gateway` generates exogenous arrivals.
    fn chain_topology() -> Topology {
        let mut b = TopologyBuilder::new();
        let gateway = b.add_node();
        let loss = b.add_node();
        let drain = b.add_node();
        b.add_edge(gateway, loss, "gateway");
        b.add_edge(loss, drain, "loss");
        b.add_edge(drain, drain, "drain");
        b.build()
    }

    fn chain_factory(gateway_arrivals: Vec<f64>) -> StationFactory {
        let mut factory = StationFactory::new();
        factory.register(
            "gateway",
            StationConfig::basic(ServerCount::Bounded(1), fixed_service(0.01)).with_arrivals(scripted_arrivals(gateway_arrivals)),
        );
        factory.register("loss", StationConfig::loss(0, ServerCount::Bounded(1), fixed_service(100.0)));
        factory.register("drain", StationConfig::basic(ServerCount::Unbounded, fixed_service(1.0)));
        factory
    }

    fn assert_station_invariants(s: &Station) {
        assert_eq!(s.num_in_service() as u64 + s.queue_len() as u64, s.num_in_system);
        assert_eq!(
            s.num_pending_arrivals() as u64 + s.num_in_service() as u64 + s.queue_len() as u64,
            s.num_total_seen
        );
        if let ServerCount::Bounded(n) = s.num_servers {
            assert!(s.num_in_service() as u64 <= n as u64);
        }
    }

    #[test]
    fn self_loop_station_holds_its_accounting_invariants() {
        let topology = self_loop_topology();
        let mut factory = StationFactory::new();
        factory.register(
            "loop",
            StationConfig::basic(ServerCount::Bounded(2), fixed_service(0.3))
                .with_arrivals(scripted_arrivals(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
        );
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        let mut last_time = Time::ZERO;
        for _ in 0..60 {
            let before = net.num_events();
            net.advance_one_event(&mut NoopObserver).unwrap();
            assert!(net.current_time() >= last_time);
            last_time = net.current_time();
            assert!(net.num_events() == before || net.num_events() == before + 1);
            assert_station_invariants(net.station_by_edge(EdgeId(0)));
        }
    }

    #[test]
    fn simulate_events_fires_exactly_the_requested_count_when_available() {
        let topology = self_loop_topology();
        let mut factory = StationFactory::new();
        factory.register(
            "loop",
            StationConfig::basic(ServerCount::Bounded(2), fixed_service(0.3))
                .with_arrivals(scripted_arrivals(vec![1.0, 2.0, 3.0])),
        );
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        net.simulate_events(10, &mut NoopObserver).unwrap();
        assert_eq!(net.num_events(), 10);

        net.simulate_events(15, &mut NoopObserver).unwrap();
        assert_eq!(net.num_events(), 25);
    }

    #[test]
    fn simulate_until_stops_once_current_time_reaches_target() {
        let topology = self_loop_topology();
        let mut factory = StationFactory::new();
        factory.register(
            "loop",
            StationConfig::basic(ServerCount::Bounded(2), fixed_service(0.3))
                .with_arrivals(scripted_arrivals(vec![1.0, 2.0, 3.0])),
        );
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        net.simulate_until(Time(10.0), &mut NoopObserver).unwrap();
        assert!(net.current_time() >= Time(10.0));
    }

    #[test]
    fn loss_station_blocks_and_still_forwards_the_departure() {
        let topology = chain_topology();
        let factory = chain_factory(vec![0.0, 0.05, 0.1, 0.15, 0.2]);
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        net.simulate_events(30, &mut NoopObserver).unwrap();

        assert_eq!(net.station_by_edge(EdgeId(0)).num_arrivals, 5);
        let loss = net.station_by_edge(EdgeId(1));
        assert!(loss.num_blocked >= 1);
        assert!(loss.num_departures >= 1);
    }

    #[test]
    fn simulate_exogenous_arrivals_counts_across_the_whole_network() {
        let topology = chain_topology();
        let factory = chain_factory(vec![0.0, 0.05, 0.1, 0.15, 0.2]);
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        net.simulate_exogenous_arrivals(5, &mut NoopObserver).unwrap();

        assert_eq!(net.station_by_edge(EdgeId(0)).num_arrivals, 5);
        assert_eq!(net.station_by_edge(EdgeId(1)).num_arrivals, 0);
    }

    #[test]
    fn simulate_departures_counts_across_the_whole_network() {
        let topology = chain_topology();
        let factory = chain_factory(vec![0.0, 0.05, 0.1, 0.15, 0.2]);
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        net.simulate_departures(3, &mut NoopObserver).unwrap();

        let total: u64 = [EdgeId(0), EdgeId(1), EdgeId(2)]
            .iter()
            .map(|&e| net.station_by_edge(e).num_departures)
            .sum();
        assert!(total >= 3);
    }

    struct BlockedTracker {
        max_blocked: u64,
    }

    impl NetworkObserver for BlockedTracker {
        fn on_departure(&mut self, station: StationId, agent: &Agent, _next: Option<StationId>) {
            if station == StationId(0) {
                self.max_blocked = self.max_blocked.max(agent.blocked);
            }
        }
    }

    #[test]
    fn held_back_policy_delays_service_instead_of_losing_the_agent() {
        let mut b = TopologyBuilder::new();
        let gateway = b.add_node();
        let sink = b.add_node();
        b.add_edge(gateway, sink, "gateway");
        b.add_edge(sink, sink, "sink");
        let topology = b.build();

        let mut factory = StationFactory::new();
        factory.register(
            "gateway",
            StationConfig::basic(ServerCount::Unbounded, fixed_service(1.0)).with_arrivals(scripted_arrivals(vec![0.0, 0.1])),
        );
        factory.register("sink", StationConfig::loss(0, ServerCount::Bounded(1), fixed_service(100.0)));

        let mut net = NetworkBuilder::new(topology, factory, &config())
            .blocking_policy(BlockingPolicy::HeldBack)
            .build()
            .unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        let mut observer = BlockedTracker { max_blocked: 0 };
        for _ in 0..8 {
            net.advance_one_event(&mut observer).unwrap();
        }

        assert!(observer.max_blocked > 0);
        assert!(net.station_by_edge(EdgeId(1)).num_blocked >= 1);
    }

    #[test]
    fn agent_cap_deactivates_the_station_once_population_is_reached() {
        let topology = self_loop_topology();
        let mut factory = StationFactory::new();
        factory.register(
            "loop",
            StationConfig::basic(ServerCount::Bounded(10), fixed_service(0.1)).with_arrivals(scripted_arrivals(vec![0.0])),
        );
        let mut net = NetworkBuilder::new(topology, factory, &config()).agent_cap(1).build().unwrap();
        net.initialize(ActivationSelector::All).unwrap();

        for _ in 0..6 {
            net.advance_one_event(&mut NoopObserver).unwrap();
        }

        let station = net.station_by_edge(EdgeId(0));
        assert!(!station.is_active());
        assert_eq!(station.num_arrivals, 1);
    }

    #[test]
    fn set_routing_vertex_rejects_invalid_input() {
        let mut b = TopologyBuilder::new();
        let n0 = b.add_node();
        let n1 = b.add_node();
        b.add_edge(n0, n1, "a");
        b.add_edge(n0, n1, "b");
        let topology = b.build();

        let mut factory = StationFactory::new();
        factory.register("a", StationConfig::basic(ServerCount::Unbounded, fixed_service(1.0)));
        factory.register("b", StationConfig::basic(ServerCount::Unbounded, fixed_service(1.0)));
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();

        let err = net.set_routing_vertex(NodeId(0), vec![0.5, 0.25, 0.25]).unwrap_err();
        assert!(matches!(err, NetworkError::Routing(_)));

        net.set_routing_vertex(NodeId(0), vec![0.4, 0.6]).unwrap();
    }

    #[test]
    fn set_routing_matrix_rejects_malformed_rows() {
        let mut b = TopologyBuilder::new();
        let n0 = b.add_node();
        let n1 = b.add_node();
        b.add_edge(n0, n1, "a");
        b.add_edge(n1, n0, "b");
        let topology = b.build();

        let mut factory = StationFactory::new();
        factory.register("a", StationConfig::basic(ServerCount::Unbounded, fixed_service(1.0)));
        factory.register("b", StationConfig::basic(ServerCount::Unbounded, fixed_service(1.0)));
        let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();

        assert!(net.set_routing_matrix(&[vec![1.0]]).is_err());

        let good_matrix = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        net.set_routing_matrix(&good_matrix).unwrap();
    }

    #[test]
    fn negative_agent_cap_is_rejected_at_build_time() {
        let topology = self_loop_topology();
        let mut factory = StationFactory::new();
        factory.register("loop", StationConfig::basic(ServerCount::Unbounded, fixed_service(1.0)));
        let err = NetworkBuilder::new(topology, factory, &config())
            .agent_cap(-1)
            .build()
            .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidAgentCap { got: -1 }));
    }

    #[test]
    fn same_seed_produces_identical_event_sequences() {
        let build = || {
            let topology = chain_topology();
            let factory = chain_factory(vec![0.0, 0.2, 0.5, 0.9]);
            let mut net = NetworkBuilder::new(topology, factory, &config()).build().unwrap();
            net.initialize(ActivationSelector::All).unwrap();
            net
        };

        let mut a = build();
        let mut b = build();

        for _ in 0..25 {
            let oa = a.advance_one_event(&mut NoopObserver).unwrap();
            let ob = b.advance_one_event(&mut NoopObserver).unwrap();
            assert_eq!(oa.station, ob.station);
            assert_eq!(oa.time, ob.time);
            assert_eq!(format!("{:?}", oa.kind), format!("{:?}", ob.kind));
        }
    }
}
