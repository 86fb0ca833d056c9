//! Simulation runner: starts the clock and the clients, then waits for the
//! day to wind down.
//!
//! The run is over once the clock has closed the day AND the service ledger
//! is back to zero. Trips admitted before the close keep the run alive until
//! their taxis are released.

use std::panic;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::client::{ClientActor, ClientContext, ClientReport};
use crate::clock::SimClock;
use crate::error::{ScenarioError, SimulationError};
use crate::events::TripObserver;
use crate::ledger::ServiceLedger;
use crate::registry::{ClientId, Taxi, TaxiRegistry};
use crate::scenario::{build_registry, resolve_seed, ClientBehavior, SimParams};

/// Interval at which the termination detector re-checks clock and ledger.
pub const QUIESCENCE_POLL: Duration = Duration::from_millis(10);

/// Final state of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub seed: u64,
    /// Clock reading when the run was declared over.
    pub final_minute: u64,
    pub taxis: Vec<Taxi>,
    pub clients: Vec<ClientReport>,
}

impl SimulationOutcome {
    pub fn total_trips(&self) -> u32 {
        self.taxis.iter().map(|t| t.services).sum()
    }

    pub fn total_earnings(&self) -> f64 {
        self.taxis.iter().map(|t| t.earnings).sum()
    }

    pub fn total_dispatch_misses(&self) -> u32 {
        self.clients.iter().map(|c| c.dispatch_misses).sum()
    }
}

/// Block until the day is finished and no trip is in flight.
///
/// The two reads take their locks one after the other, never together.
pub fn wait_for_quiescence(clock: &SimClock, ledger: &ServiceLedger, poll: Duration) {
    loop {
        let finished = clock.is_day_finished();
        let active = ledger.count();
        if finished && active == 0 {
            return;
        }
        thread::sleep(poll);
    }
}

pub struct Simulation {
    seed: u64,
    client_count: usize,
    ctx: ClientContext,
}

impl Simulation {
    /// Build a run with `taxi_count` randomly placed taxis and `client_count` clients.
    pub fn new(
        params: SimParams,
        taxi_count: usize,
        client_count: usize,
        observer: Arc<dyn TripObserver>,
    ) -> Result<Self, ScenarioError> {
        let seed = resolve_seed(&params);
        let registry = build_registry(&params, taxi_count, seed)?;
        Self::assemble(params, seed, registry, client_count, observer)
    }

    /// Build a run over a prepared fleet.
    ///
    /// The registry's search radius must equal `params.search_radius`.
    pub fn with_registry(
        params: SimParams,
        registry: TaxiRegistry,
        client_count: usize,
        observer: Arc<dyn TripObserver>,
    ) -> Result<Self, ScenarioError> {
        params.validate()?;
        if registry.search_radius() != params.search_radius {
            return Err(ScenarioError::RadiusMismatch {
                params: params.search_radius,
                registry: registry.search_radius(),
            });
        }
        let seed = resolve_seed(&params);
        Self::assemble(params, seed, registry, client_count, observer)
    }

    fn assemble(
        params: SimParams,
        seed: u64,
        registry: TaxiRegistry,
        client_count: usize,
        observer: Arc<dyn TripObserver>,
    ) -> Result<Self, ScenarioError> {
        if registry.is_empty() {
            return Err(ScenarioError::EmptyPopulation("taxis"));
        }
        if client_count == 0 {
            return Err(ScenarioError::EmptyPopulation("clients"));
        }
        let behavior = ClientBehavior::from_params(&params)?;
        let ctx = ClientContext {
            clock: Arc::new(SimClock::new(params.day_minutes, params.minute_duration())),
            registry: Arc::new(registry),
            ledger: Arc::new(ServiceLedger::new()),
            observer,
            behavior: Arc::new(behavior),
        };
        Ok(Self {
            seed,
            client_count,
            ctx,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run the whole day and return the final fleet.
    ///
    /// Panics raised on actor threads (invariant violations) are re-raised here.
    pub fn run(self) -> Result<SimulationOutcome, SimulationError> {
        info!(
            seed = self.seed,
            taxis = self.ctx.registry.len(),
            clients = self.client_count,
            day_minutes = self.ctx.clock.day_minutes(),
            "simulation starting"
        );

        let clock_handle = self.ctx.clock.spawn().map_err(|source| SimulationError::Spawn {
            role: "clock".to_string(),
            source,
        })?;

        let spawned = spawn_all(self.client_count, |i| {
            let id = i as ClientId;
            let actor = ClientActor::new(id, self.ctx.clone(), self.seed.wrapping_add(i as u64));
            actor.spawn().map_err(|source| SimulationError::Spawn {
                role: format!("client-{id}"),
                source,
            })
        });
        let client_handles = match spawned {
            Ok(handles) => handles,
            Err(err) => {
                join_or_propagate(clock_handle);
                return Err(err);
            }
        };

        wait_for_quiescence(&self.ctx.clock, &self.ctx.ledger, QUIESCENCE_POLL);
        let final_minute = self.ctx.clock.now_minute();
        join_or_propagate(clock_handle);

        // Every client is now past its last admission check; joining lets any
        // straggler that read the clock just before the close finish its trip.
        let clients: Vec<ClientReport> = client_handles.into_iter().map(join_or_propagate).collect();
        assert_eq!(
            self.ctx.ledger.count(),
            0,
            "trips still active after every client terminated"
        );

        let taxis = self.ctx.registry.taxis();
        let outcome = SimulationOutcome {
            seed: self.seed,
            final_minute,
            taxis,
            clients,
        };
        info!(
            final_minute,
            trips = outcome.total_trips(),
            misses = outcome.total_dispatch_misses(),
            "simulation finished"
        );
        Ok(outcome)
    }
}

/// Start `count` threads via `spawn_one(1..=count)`.
///
/// If one fails to start, the threads already running are joined before the
/// error is returned.
fn spawn_all<T, F>(count: usize, mut spawn_one: F) -> Result<Vec<JoinHandle<T>>, SimulationError>
where
    F: FnMut(usize) -> Result<JoinHandle<T>, SimulationError>,
{
    let mut handles = Vec::with_capacity(count);
    for i in 1..=count {
        match spawn_one(i) {
            Ok(handle) => handles.push(handle),
            Err(err) => {
                warn!(started = handles.len(), %err, "thread spawn failed; joining started threads");
                for handle in handles {
                    join_or_propagate(handle);
                }
                return Err(err);
            }
        }
    }
    Ok(handles)
}

fn join_or_propagate<T>(handle: JoinHandle<T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| panic::resume_unwind(payload))
}
