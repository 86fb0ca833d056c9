//! Resource registry: the taxi fleet and its dispatch/release operations.
//!
//! The whole fleet sits behind one mutex. Candidate selection and binding of
//! the chosen taxi happen inside a single critical section, so no other actor
//! can observe or claim a taxi between the two.

use std::sync::{Mutex, MutexGuard};

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::matching::{MatchCandidate, MatchingAlgorithm, NearestRatedMatching};
use crate::spatial::{MapBounds, Point};

/// Stable 1-based taxi identifier.
pub type TaxiId = u32;
/// Stable 1-based client identifier.
pub type ClientId = u32;

/// One taxi and its cumulative statistics for the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Taxi {
    pub id: TaxiId,
    pub position: Point,
    pub available: bool,
    pub assigned_client: Option<ClientId>,
    pub services: u32,
    pub earnings: f64,
    pub rating_sum: f64,
    pub rating_count: u32,
}

impl Taxi {
    /// A free taxi with no history.
    pub fn new(id: TaxiId, position: Point) -> Self {
        Self {
            id,
            position,
            available: true,
            assigned_client: None,
            services: 0,
            earnings: 0.0,
            rating_sum: 0.0,
            rating_count: 0,
        }
    }

    pub fn average_rating(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            self.rating_sum / f64::from(self.rating_count)
        }
    }

    /// Availability and client binding agree.
    pub fn is_consistent(&self) -> bool {
        self.available == self.assigned_client.is_none()
    }
}

/// Proof of a successful dispatch. Consumed by [`TaxiRegistry::finish`].
#[derive(Debug, PartialEq)]
pub struct Assignment {
    taxi_id: TaxiId,
    client_id: ClientId,
    pickup_distance: f64,
}

impl Assignment {
    pub fn taxi_id(&self) -> TaxiId {
        self.taxi_id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Distance from the taxi to the pickup point at dispatch time.
    pub fn pickup_distance(&self) -> f64 {
        self.pickup_distance
    }
}

/// Point-in-time availability of the fleet, ordered by taxi id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetStatus {
    pub available: Vec<TaxiId>,
    pub busy: Vec<(TaxiId, ClientId)>,
}

#[derive(Debug)]
pub struct TaxiRegistry {
    taxis: Mutex<Vec<Taxi>>,
    search_radius: f64,
    algorithm: Box<dyn MatchingAlgorithm>,
}

impl TaxiRegistry {
    /// Registry over an explicit fleet.
    ///
    /// # Panics
    ///
    /// Panics unless taxi ids are exactly `1..=taxis.len()` in order and every
    /// taxi is consistent: lookups index the fleet by `id - 1`.
    pub fn new(taxis: Vec<Taxi>, search_radius: f64) -> Self {
        for (index, taxi) in taxis.iter().enumerate() {
            assert_eq!(
                taxi.id as usize,
                index + 1,
                "taxi ids must be dense and 1-based"
            );
            assert!(taxi.is_consistent(), "taxi {} starts inconsistent", taxi.id);
        }
        Self {
            taxis: Mutex::new(taxis),
            search_radius,
            algorithm: Box::new(NearestRatedMatching),
        }
    }

    /// `count` free taxis at uniformly random positions inside `bounds`.
    pub fn with_random_positions<R: Rng + ?Sized>(
        count: usize,
        bounds: MapBounds,
        search_radius: f64,
        rng: &mut R,
    ) -> Self {
        let taxis = (1..=count)
            .map(|i| Taxi::new(i as TaxiId, bounds.random_point(rng)))
            .collect();
        Self::new(taxis, search_radius)
    }

    /// Replace the selection algorithm.
    pub fn with_algorithm(mut self, algorithm: Box<dyn MatchingAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Taxi>> {
        self.taxis.lock().expect("taxi registry mutex poisoned")
    }

    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Claim the best available taxi for a pickup at `origin`.
    ///
    /// `None` means no free taxi is within the search radius right now; the
    /// caller is expected to retry later.
    pub fn dispatch(&self, client_id: ClientId, origin: Point) -> Option<Assignment> {
        let assignment = self.claim(client_id, origin);
        match &assignment {
            Some(assignment) => debug!(
                client_id,
                taxi_id = assignment.taxi_id,
                pickup_distance = assignment.pickup_distance,
                "taxi dispatched"
            ),
            None => debug!(client_id, x = origin.x, y = origin.y, "no taxi within radius"),
        }
        assignment
    }

    /// Select and bind under one lock; the guard is released on return.
    fn claim(&self, client_id: ClientId, origin: Point) -> Option<Assignment> {
        let mut taxis = self.lock();
        let candidates: Vec<MatchCandidate> = taxis
            .iter()
            .filter(|taxi| taxi.available)
            .map(|taxi| MatchCandidate {
                taxi_id: taxi.id,
                position: taxi.position,
                average_rating: taxi.average_rating(),
            })
            .collect();

        let taxi_id = self
            .algorithm
            .find_match(origin, &candidates, self.search_radius)?;

        let taxi = taxi_slot(&mut taxis, taxi_id);
        assert!(
            taxi.available && taxi.assigned_client.is_none(),
            "matching picked taxi {taxi_id} which is not free"
        );
        let pickup_distance = origin.distance_to(taxi.position);
        assert!(
            pickup_distance <= self.search_radius,
            "matching picked taxi {taxi_id} outside the search radius"
        );
        taxi.available = false;
        taxi.assigned_client = Some(client_id);

        Some(Assignment {
            taxi_id,
            client_id,
            pickup_distance,
        })
    }

    /// Release the taxi held by `assignment` after a completed trip.
    ///
    /// Credits the fare and rating and moves the taxi to `destination`, so
    /// the fleet drifts toward where passengers travel.
    ///
    /// # Panics
    ///
    /// Panics if the taxi is not bound to the assignment's client.
    pub fn finish(&self, assignment: Assignment, destination: Point, fare: f64, rating: u8) {
        let mut taxis = self.lock();
        let taxi = taxi_slot(&mut taxis, assignment.taxi_id);
        assert!(
            !taxi.available && taxi.assigned_client == Some(assignment.client_id),
            "taxi {} finished by client {} but is bound to {:?} (available={})",
            taxi.id,
            assignment.client_id,
            taxi.assigned_client,
            taxi.available
        );
        taxi.available = true;
        taxi.assigned_client = None;
        taxi.services += 1;
        taxi.earnings += fare;
        taxi.rating_sum += f64::from(rating);
        taxi.rating_count += 1;
        taxi.position = destination;
    }

    /// Free and busy taxis at this instant. Does not mutate.
    pub fn snapshot(&self) -> FleetStatus {
        let taxis = self.lock();
        let mut status = FleetStatus::default();
        for taxi in taxis.iter() {
            match taxi.assigned_client {
                None => status.available.push(taxi.id),
                Some(client_id) => status.busy.push((taxi.id, client_id)),
            }
        }
        status
    }

    /// Copy of the whole fleet, for reporting.
    pub fn taxis(&self) -> Vec<Taxi> {
        self.lock().clone()
    }
}

fn taxi_slot(taxis: &mut [Taxi], taxi_id: TaxiId) -> &mut Taxi {
    let index = (taxi_id as usize)
        .checked_sub(1)
        .unwrap_or_else(|| panic!("taxi id 0 is not valid"));
    taxis
        .get_mut(index)
        .unwrap_or_else(|| panic!("unknown taxi id {taxi_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fleet_at, rated_taxi};

    #[test]
    fn dispatch_binds_and_finish_releases() {
        let registry = TaxiRegistry::new(fleet_at(&[(1.0, 1.0)]), 2.0);

        let assignment = registry
            .dispatch(42, Point::new(1.5, 1.0))
            .expect("taxi within radius");
        assert_eq!(assignment.taxi_id(), 1);
        assert_eq!(assignment.client_id(), 42);
        assert!((assignment.pickup_distance() - 0.5).abs() < 1e-12);

        let status = registry.snapshot();
        assert!(status.available.is_empty());
        assert_eq!(status.busy, vec![(1, 42)]);

        let destination = Point::new(8.25, 3.125);
        registry.finish(assignment, destination, 12.5, 4);

        let taxi = &registry.taxis()[0];
        assert!(taxi.available);
        assert_eq!(taxi.assigned_client, None);
        assert_eq!(taxi.services, 1);
        assert_eq!(taxi.earnings, 12.5);
        assert_eq!(taxi.rating_count, 1);
        assert_eq!(taxi.average_rating(), 4.0);
        assert_eq!(taxi.position, destination);
    }

    #[test]
    fn busy_taxis_are_not_dispatched_twice() {
        let registry = TaxiRegistry::new(fleet_at(&[(0.0, 0.0)]), 2.0);
        let first = registry.dispatch(1, Point::new(0.0, 0.0));
        assert!(first.is_some());
        assert_eq!(registry.dispatch(2, Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn dispatch_misses_outside_radius() {
        let registry = TaxiRegistry::new(fleet_at(&[(0.0, 0.0)]), 2.0);
        assert_eq!(registry.dispatch(1, Point::new(3.0, 0.0)), None);
        assert_eq!(registry.snapshot().available, vec![1]);
    }

    #[test]
    fn equal_distance_tie_uses_rating_then_id() {
        let registry = TaxiRegistry::new(
            vec![
                rated_taxi(1, Point::new(6.0, 5.0), &[2, 2]),
                rated_taxi(2, Point::new(4.0, 5.0), &[5, 4]),
                rated_taxi(3, Point::new(5.0, 6.0), &[5, 4]),
                rated_taxi(4, Point::new(5.0, 4.0), &[]),
            ],
            2.0,
        );
        let origin = Point::new(5.0, 5.0);
        let ids: Vec<TaxiId> = (0..4)
            .map(|client| {
                registry
                    .dispatch(client, origin)
                    .expect("all four taxis are in range")
                    .taxi_id()
            })
            .collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[test]
    fn average_rating_is_zero_without_ratings() {
        let taxi = Taxi::new(1, Point::new(0.0, 0.0));
        assert_eq!(taxi.average_rating(), 0.0);
    }

    #[test]
    #[should_panic(expected = "finished by client")]
    fn finishing_a_foreign_assignment_panics() {
        let registry = TaxiRegistry::new(fleet_at(&[(0.0, 0.0), (1.0, 0.0)]), 2.0);
        let _first = registry.dispatch(1, Point::new(0.0, 0.0));
        let forged = Assignment {
            taxi_id: 2,
            client_id: 1,
            pickup_distance: 0.0,
        };
        registry.finish(forged, Point::new(0.0, 0.0), 1.0, 5);
    }

    #[test]
    #[should_panic(expected = "dense and 1-based")]
    fn sparse_ids_are_rejected() {
        TaxiRegistry::new(vec![Taxi::new(2, Point::new(0.0, 0.0))], 2.0);
    }

    /// Always picks the highest free id, whatever the distance.
    #[derive(Debug)]
    struct HighestIdMatching;

    impl MatchingAlgorithm for HighestIdMatching {
        fn find_match(
            &self,
            _origin: Point,
            candidates: &[MatchCandidate],
            _search_radius: f64,
        ) -> Option<TaxiId> {
            candidates.iter().map(|c| c.taxi_id).max()
        }
    }

    #[test]
    fn custom_algorithm_decides_the_dispatch() {
        let registry = TaxiRegistry::new(fleet_at(&[(1.0, 1.0), (1.5, 1.0), (2.0, 1.0)]), 5.0)
            .with_algorithm(Box::new(HighestIdMatching));
        assert_eq!(registry.search_radius(), 5.0);

        let first = registry.dispatch(1, Point::new(1.0, 1.0)).expect("free taxi");
        let second = registry.dispatch(2, Point::new(1.0, 1.0)).expect("free taxi");
        assert_eq!(first.taxi_id(), 3);
        assert_eq!(second.taxi_id(), 2);
        assert_eq!(registry.snapshot().available, vec![1]);
    }

    #[test]
    #[should_panic(expected = "outside the search radius")]
    fn algorithm_ignoring_the_radius_is_caught() {
        let registry = TaxiRegistry::new(fleet_at(&[(9.0, 9.0)]), 1.0)
            .with_algorithm(Box::new(HighestIdMatching));
        registry.dispatch(1, Point::new(0.0, 0.0));
    }

    #[test]
    fn dispatch_logs_after_releasing_the_fleet_lock() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        /// Reads the fleet from inside every event; would deadlock if the
        /// event were emitted under the fleet lock.
        struct SnapshotOnEvent {
            registry: Arc<TaxiRegistry>,
            seen: Arc<AtomicUsize>,
        }

        impl<S: tracing::Subscriber> Layer<S> for SnapshotOnEvent {
            fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                let status = self.registry.snapshot();
                self.seen
                    .fetch_add(status.available.len() + status.busy.len(), Ordering::SeqCst);
            }
        }

        let registry = Arc::new(TaxiRegistry::new(fleet_at(&[(1.0, 1.0)]), 2.0));
        let seen = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(SnapshotOnEvent {
            registry: Arc::clone(&registry),
            seen: Arc::clone(&seen),
        });

        tracing::subscriber::with_default(subscriber, || {
            assert!(registry.dispatch(1, Point::new(1.0, 1.0)).is_some());
            assert!(registry.dispatch(2, Point::new(1.0, 1.0)).is_none());
        });
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
