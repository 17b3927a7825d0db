//! Observer hooks for progress reporting and data collection.

use qn_agent::Agent;
use qn_core::{StationId, Time};

/// Callbacks invoked by [`Network::advance_one_event`][crate::Network::advance_one_event]
/// and the `simulate*` family at key points in the event loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait NetworkObserver {
    /// Called once before an event is applied, with the id of the station
    /// about to fire and the current simulation time.
    fn on_event_start(&mut self, _station: StationId, _time: Time) {}

    /// Called after an arrival is admitted into service or onto the
    /// waiting line.
    fn on_arrival_admitted(&mut self, _station: StationId) {}

    /// Called after an arrival is turned away by a blocking policy.
    fn on_arrival_blocked(&mut self, _station: StationId) {}

    /// Called after an agent departs a station and (if applicable) is
    /// routed to the next one.
    fn on_departure(&mut self, _station: StationId, _agent: &Agent, _next: Option<StationId>) {}

    /// Called once after the run loop stops, with the total number of
    /// events processed.
    fn on_run_end(&mut self, _num_events: u64) {}
}

/// A [`NetworkObserver`] that does nothing.
pub struct NoopObserver;

impl NetworkObserver for NoopObserver {}
