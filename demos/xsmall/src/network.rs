//! Small three-station tandem network: an arrival gateway feeding a bounded
//! queue that drains into a self-looping sink.
//!
//! Every edge carries a genuine (non-zero-delay) service station; only the
//! gateway edge generates exogenous arrivals. Node 2's only outgoing edge
//! points back to itself with an unbounded server count and its own
//! exponential delay, so every agent that reaches it keeps cycling through
//! at a steady pace rather than departing for good — a convenient stand-in
//! for "has left the system" that still shows up in the per-station logs.
//! A zero-delay self-loop would instead retry at the same instant forever,
//! so the sink is given real service time like any other station.

use std::sync::{Arc, Mutex};

use qn_core::SimRng;
use qn_network::{Topology, TopologyBuilder};
use qn_station::{DelayFn, ServerCount, StationConfig, StationFactory};

/// Builds a `t + Exp(rate)` delay function with its own private RNG stream,
/// mirroring the donor workspace's `lambda x: x + exponential(1/rate)`
/// arrival/service generators.
fn exponential_delay(rate: f64, rng: &mut SimRng) -> DelayFn {
    let stream = Arc::new(Mutex::new(SimRng::derive(rng.random(), (rate * 1000.0) as u64)));
    Arc::new(move |t| {
        let mut stream = stream.lock().expect("rng mutex poisoned");
        let u: f64 = stream.gen_range(0.0..1.0);
        qn_core::Time(t.0 - (1.0 - u).ln() / rate)
    })
}

/// Returns `(topology, factory, [gateway, queue, sink])` node ids.
///
/// - Edge `gateway -> queue` (type `"gateway"`): exogenous arrivals at rate
///   1.0, service rate 1.25, two parallel servers.
/// - Edge `queue -> sink` (type `"queue"`): no exogenous arrivals, service
///   rate 1.0, a single server.
/// - Edge `sink -> sink` (type `"sink"`, self-loop): service rate 2.0,
///   unbounded servers — agents cycle through rather than queuing up.
pub fn build_network() -> (Topology, StationFactory, [qn_core::NodeId; 3]) {
    let mut builder = TopologyBuilder::new();
    let gateway = builder.add_node();
    let queue = builder.add_node();
    let sink = builder.add_node();
    builder.add_edge(gateway, queue, "gateway");
    builder.add_edge(queue, sink, "queue");
    builder.add_edge(sink, sink, "sink");
    let topology = builder.build();

    let mut factory = StationFactory::new();
    factory.register(
        "gateway",
        StationConfig::basic(
            ServerCount::Bounded(2),
            Box::new(|rng| exponential_delay(1.25, rng)),
        )
        .with_arrivals(Box::new(|rng| exponential_delay(1.0, rng))),
    );
    factory.register(
        "queue",
        StationConfig::basic(
            ServerCount::Bounded(1),
            Box::new(|rng| exponential_delay(1.0, rng)),
        ),
    );
    factory.register(
        "sink",
        StationConfig::basic(
            ServerCount::Unbounded,
            Box::new(|rng| exponential_delay(2.0, rng)),
        ),
    );

    (topology, factory, [gateway, queue, sink])
}
