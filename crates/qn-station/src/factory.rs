//! Turns an edge type tag into a concrete [`Station`].
//!
//! The network topology carries edge types as plain strings (whatever the
//! caller's configuration format uses); a [`StationFactory`] maps each type
//! to a recipe for building stations of that kind. An edge type with no
//! registered recipe becomes a [`Station::null_sink`] rather than an error —
//! unknown edge types are expected to occur (e.g. a topology authored for a
//! newer station catalog than the one in use), and a null sink is always a
//! safe fallback since it accepts and instantly releases anything routed
//! into it.

use std::collections::HashMap;
use std::sync::Arc;

use qn_core::SimRng;

use crate::station::{DelayFn, Edge, ServerCount, Station, StationKind};

/// Builds a [`DelayFn`] given a source of randomness. Taking the RNG at
/// build time (rather than baking a fixed closure into the config) lets
/// every station instance of a given edge type draw an independent,
/// reproducible delay stream derived from the network's root seed.
pub type DelayFnFactory = Box<dyn Fn(&mut SimRng) -> DelayFn + Send + Sync>;

/// The construction recipe for every station of a given edge type.
pub struct StationConfig {
    pub kind: StationKind,
    pub num_servers: ServerCount,
    pub arrival_f: Option<DelayFnFactory>,
    pub service_f: DelayFnFactory,
}

impl StationConfig {
    pub fn basic(num_servers: ServerCount, service_f: DelayFnFactory) -> Self {
        Self {
            kind: StationKind::Basic,
            num_servers,
            arrival_f: None,
            service_f,
        }
    }

    pub fn with_arrivals(mut self, arrival_f: DelayFnFactory) -> Self {
        self.arrival_f = Some(arrival_f);
        self
    }

    pub fn loss(buffer: u32, num_servers: ServerCount, service_f: DelayFnFactory) -> Self {
        Self {
            kind: StationKind::Loss { buffer },
            num_servers,
            arrival_f: None,
            service_f,
        }
    }

    pub fn resource(num_servers: ServerCount, service_f: DelayFnFactory) -> Self {
        Self {
            kind: StationKind::Resource,
            num_servers,
            arrival_f: None,
            service_f,
        }
    }

    /// An informational station: zero-duration service, used to tag a
    /// passage through a vertex without modeling any real delay.
    pub fn informational() -> Self {
        Self {
            kind: StationKind::Informational,
            num_servers: ServerCount::Unbounded,
            arrival_f: None,
            service_f: Box::new(|_rng| Arc::new(|t| t)),
        }
    }
}

/// A registry mapping edge type tags to [`StationConfig`]s.
#[derive(Default)]
pub struct StationFactory {
    configs: HashMap<String, StationConfig>,
}

impl StationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, edge_type: impl Into<String>, config: StationConfig) -> &mut Self {
        self.configs.insert(edge_type.into(), config);
        self
    }

    pub fn build(&self, edge: Edge, edge_type: &str, rng: &mut SimRng) -> Station {
        match self.configs.get(edge_type) {
            Some(cfg) => {
                let arrival_f = cfg.arrival_f.as_ref().map(|f| f(rng));
                let service_f = (cfg.service_f)(rng);
                Station::new(edge, cfg.kind, cfg.num_servers, arrival_f, service_f)
            }
            None => Station::null_sink(edge),
        }
    }
}
