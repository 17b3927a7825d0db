//! xsmall — smallest end-to-end example for the `qn` queueing-network
//! simulator.
//!
//! Runs a three-station tandem network (gateway → queue → self-looping
//! sink) for a fixed number of events, writing every completed station
//! visit to CSV and printing a summary of where the population ended up.

mod network;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use qn_core::{EdgeId, SimConfig};
use qn_network::{ActivationSelector, NetworkBuilder, NetworkObserver, NoopObserver};
use qn_output::{CsvWriter, SimOutputObserver};

use network::build_network;

const SEED: u64 = 42;
const NUM_EVENTS: u64 = 20_000;
const FLUSH_EVERY: u64 = 2_000;

fn main() -> Result<()> {
    println!("=== xsmall — qn queueing-network simulator ===");
    println!("Events: {NUM_EVENTS}  |  Seed: {SEED}");
    println!();

    let (topology, factory, _nodes) = build_network();
    println!(
        "Network: {} nodes, {} edges",
        topology.node_count(),
        topology.edge_count()
    );

    let config = SimConfig { seed: SEED, num_active: None };
    let mut net = NetworkBuilder::new(topology, factory, &config).build()?;
    net.initialize(ActivationSelector::All)?;

    std::fs::create_dir_all("output/xsmall")?;
    let writer = CsvWriter::new(Path::new("output/xsmall"))?;
    let mut obs = SimOutputObserver::new(writer);

    let t0 = Instant::now();
    let mut done = 0;
    while done < NUM_EVENTS {
        let batch = FLUSH_EVERY.min(NUM_EVENTS - done);
        net.simulate_events(batch, &mut NoopObserver)?;
        obs.flush(&mut net);
        if let Some(e) = obs.take_error() {
            eprintln!("output error: {e}");
            break;
        }
        done += batch;
    }
    obs.on_run_end(net.num_events());
    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }
    let elapsed = t0.elapsed();

    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  current_time : {:.3}", net.current_time().0);
    println!("  num_events   : {}", net.num_events());
    println!();

    println!("{:<10} {:<12} {:<12} {:<12} {:<10}", "Edge", "Arrivals", "Departures", "Blocked", "In system");
    println!("{}", "-".repeat(58));
    for (name, edge) in [("gateway", EdgeId(0)), ("queue", EdgeId(1)), ("sink", EdgeId(2))] {
        let station = net.station_by_edge(edge);
        println!(
            "{:<10} {:<12} {:<12} {:<12} {:<10}",
            name, station.num_arrivals, station.num_departures, station.num_blocked, station.num_in_system,
        );
    }

    Ok(())
}
