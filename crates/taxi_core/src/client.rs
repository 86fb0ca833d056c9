//! Client actor: one thread per requester.
//!
//! Each client loops through a small state machine:
//!
//! ```text
//! InitialOffset -> Seeking -> InTrip -> Waiting -> Seeking -> ... -> Terminated
//!                     |  ^
//!                     +--+  (no taxi in range: retry after a delay)
//! ```
//!
//! Only the `Seeking` state looks at the day-end condition. A client that is
//! already riding or waiting always finishes that timer first, so trips
//! admitted before the day closes run to completion even past midnight.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

use crate::clock::SimClock;
use crate::distributions::{sample_rating, uniform_offset_minutes};
use crate::events::{TripCompleted, TripObserver, TripStarted};
use crate::ledger::ServiceLedger;
use crate::registry::{Assignment, ClientId, TaxiRegistry};
use crate::scenario::ClientBehavior;
use crate::spatial::Point;

/// Shared components every client talks to.
#[derive(Clone)]
pub struct ClientContext {
    pub clock: Arc<SimClock>,
    pub registry: Arc<TaxiRegistry>,
    pub ledger: Arc<ServiceLedger>,
    pub observer: Arc<dyn TripObserver>,
    pub behavior: Arc<ClientBehavior>,
}

/// A dispatched trip that has not started its timer yet.
#[derive(Debug)]
pub struct TripPlan {
    pub assignment: Assignment,
    pub origin: Point,
    pub destination: Point,
    pub distance: f64,
}

#[derive(Debug)]
pub enum ClientState {
    InitialOffset,
    Seeking,
    InTrip(TripPlan),
    Waiting,
    Terminated,
}

impl ClientState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, ClientState::Terminated)
    }
}

/// What one client did over the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClientReport {
    pub client_id: ClientId,
    pub trips_completed: u32,
    pub dispatch_misses: u32,
}

pub struct ClientActor {
    id: ClientId,
    ctx: ClientContext,
    rng: StdRng,
    report: ClientReport,
}

impl ClientActor {
    pub fn new(id: ClientId, ctx: ClientContext, seed: u64) -> Self {
        Self {
            id,
            ctx,
            rng: StdRng::seed_from_u64(seed),
            report: ClientReport {
                client_id: id,
                ..ClientReport::default()
            },
        }
    }

    pub fn report(&self) -> ClientReport {
        self.report
    }

    /// Run one state to completion and return the next one.
    pub fn step(&mut self, state: ClientState) -> ClientState {
        match state {
            ClientState::InitialOffset => {
                let offset = uniform_offset_minutes(
                    &mut self.rng,
                    self.ctx.behavior.initial_offset_max_minutes,
                );
                self.ctx.clock.sleep_minutes(offset);
                ClientState::Seeking
            }
            ClientState::Seeking => self.seek(),
            ClientState::InTrip(plan) => self.ride(plan),
            ClientState::Waiting => {
                let wait = self.ctx.behavior.inter_trip_wait.sample_minutes(&mut self.rng);
                self.ctx.clock.sleep_minutes(wait);
                ClientState::Seeking
            }
            ClientState::Terminated => ClientState::Terminated,
        }
    }

    /// Drive the state machine until the client terminates.
    pub fn run(mut self) -> ClientReport {
        let mut state = ClientState::InitialOffset;
        while !state.is_terminated() {
            state = self.step(state);
        }
        debug!(
            client_id = self.id,
            trips = self.report.trips_completed,
            misses = self.report.dispatch_misses,
            "client terminated"
        );
        self.report
    }

    /// Run on a dedicated `client-{id}` thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<ClientReport>> {
        thread::Builder::new()
            .name(format!("client-{}", self.id))
            .spawn(move || self.run())
    }

    fn seek(&mut self) -> ClientState {
        let clock = &self.ctx.clock;
        if clock.now_minute() >= self.ctx.behavior.day_minutes || clock.is_day_finished() {
            return ClientState::Terminated;
        }

        let bounds = self.ctx.behavior.map_bounds;
        let origin = bounds.random_point(&mut self.rng);
        let destination = bounds.random_point(&mut self.rng);
        let distance = origin.distance_to(destination);

        match self.ctx.registry.dispatch(self.id, origin) {
            Some(assignment) => ClientState::InTrip(TripPlan {
                assignment,
                origin,
                destination,
                distance,
            }),
            None => {
                self.report.dispatch_misses += 1;
                let retry = self.ctx.behavior.retry_delay.sample_minutes(&mut self.rng);
                debug!(client_id = self.id, retry, "no taxi available, retrying");
                clock.sleep_minutes(retry);
                ClientState::Seeking
            }
        }
    }

    fn ride(&mut self, plan: TripPlan) -> ClientState {
        let TripPlan {
            assignment,
            origin,
            destination,
            distance,
        } = plan;
        let ctx = &self.ctx;
        let taxi_id = assignment.taxi_id();

        let start_minute = ctx.clock.now_minute();
        let duration = ctx.behavior.trip_duration.sample_minutes(&mut self.rng);
        let end_minute = start_minute + duration;

        ctx.ledger.begin();
        let fleet = ctx.registry.snapshot();
        ctx.observer.trip_started(&TripStarted {
            taxi_id,
            client_id: self.id,
            start_minute,
            expected_end_minute: end_minute,
            origin,
            destination,
            distance,
            duration_minutes: duration,
            fleet,
        });

        ctx.clock.sleep_minutes(duration);

        let rating = sample_rating(&mut self.rng);
        let rate = ctx.behavior.pricing.sample_rate(&mut self.rng);
        let fare = ctx.behavior.pricing.fare(distance, rate);
        ctx.registry.finish(assignment, destination, fare, rating);
        ctx.ledger.end();
        self.report.trips_completed += 1;

        let fleet = ctx.registry.snapshot();
        ctx.observer.trip_completed(&TripCompleted {
            taxi_id,
            client_id: self.id,
            end_minute,
            clock_minute: ctx.clock.now_minute(),
            fare,
            rating,
            fleet,
        });

        ClientState::Waiting
    }
}
