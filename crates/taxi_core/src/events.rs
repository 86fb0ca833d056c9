//! Trip observations handed to the reporting collaborator.
//!
//! Actors build an event, including a fleet snapshot taken beforehand, and
//! only then hand it to the observer. Observers therefore never run while the
//! registry, clock or ledger lock is held.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::registry::{ClientId, FleetStatus, TaxiId};
use crate::spatial::Point;

/// A trip was admitted and the taxi is on its way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripStarted {
    pub taxi_id: TaxiId,
    pub client_id: ClientId,
    pub start_minute: u64,
    /// May exceed the nominal day length.
    pub expected_end_minute: u64,
    pub origin: Point,
    pub destination: Point,
    pub distance: f64,
    pub duration_minutes: u64,
    pub fleet: FleetStatus,
}

/// A trip finished and its taxi is free again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripCompleted {
    pub taxi_id: TaxiId,
    pub client_id: ClientId,
    /// Scheduled end: start minute plus trip duration.
    pub end_minute: u64,
    /// Clock reading when the taxi was released.
    pub clock_minute: u64,
    pub fare: f64,
    pub rating: u8,
    pub fleet: FleetStatus,
}

/// Sink for trip observations. Called concurrently from every client thread.
pub trait TripObserver: Send + Sync {
    fn trip_started(&self, event: &TripStarted);
    fn trip_completed(&self, event: &TripCompleted);
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl TripObserver for NullObserver {
    fn trip_started(&self, _event: &TripStarted) {}
    fn trip_completed(&self, _event: &TripCompleted) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TripEvent {
    Started(TripStarted),
    Completed(TripCompleted),
}

/// Observer that keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<TripEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TripEvent>> {
        self.events.lock().expect("recording observer mutex poisoned")
    }

    pub fn events(&self) -> Vec<TripEvent> {
        self.lock().clone()
    }

    pub fn completed(&self) -> Vec<TripCompleted> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                TripEvent::Completed(done) => Some(done.clone()),
                TripEvent::Started(_) => None,
            })
            .collect()
    }

    pub fn started(&self) -> Vec<TripStarted> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                TripEvent::Started(start) => Some(start.clone()),
                TripEvent::Completed(_) => None,
            })
            .collect()
    }
}

impl TripObserver for RecordingObserver {
    fn trip_started(&self, event: &TripStarted) {
        self.lock().push(TripEvent::Started(event.clone()));
    }

    fn trip_completed(&self, event: &TripCompleted) {
        self.lock().push(TripEvent::Completed(event.clone()));
    }
}
