#![allow(dead_code)]

use std::sync::Arc;

use taxi_core::distributions::TriangularParams;
use taxi_core::events::RecordingObserver;
use taxi_core::registry::{Taxi, TaxiRegistry};
use taxi_core::runner::{Simulation, SimulationOutcome};
use taxi_core::scenario::SimParams;

/// A short day where one simulated minute lasts one millisecond.
///
/// Unlike the zero-scale unit-test params, the clock here runs slowly enough
/// that clients get to complete trips before the day closes.
pub fn quick_params(seed: u64) -> SimParams {
    SimParams::default()
        .with_seed(seed)
        .with_real_ms_per_minute(1)
        .with_day_minutes(240)
        .with_initial_offset_max_minutes(2)
}

/// Every delay is exactly `minutes` long.
pub fn fixed(minutes: f64) -> TriangularParams {
    TriangularParams::new(minutes, minutes, minutes)
}

/// Run a whole simulated day and return the outcome plus every recorded event.
pub fn run_day(
    params: SimParams,
    taxis: usize,
    clients: usize,
) -> (SimulationOutcome, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    let sim = Simulation::new(params, taxis, clients, observer.clone()).expect("valid scenario");
    let outcome = sim.run().expect("simulation runs");
    (outcome, observer)
}

/// Like [`run_day`], over a hand-placed fleet.
pub fn run_fleet(
    params: SimParams,
    taxis: Vec<Taxi>,
    clients: usize,
) -> (SimulationOutcome, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    let registry = TaxiRegistry::new(taxis, params.search_radius);
    let sim = Simulation::with_registry(params, registry, clients, observer.clone())
        .expect("valid scenario");
    let outcome = sim.run().expect("simulation runs");
    (outcome, observer)
}
