//! Test helpers for common fixture setup.
//!
//! Shared by unit tests, integration tests and benchmarks.

use crate::registry::{Taxi, TaxiId};
use crate::scenario::SimParams;
use crate::spatial::Point;

/// Free taxis with ids `1..` at the given coordinates.
pub fn fleet_at(positions: &[(f64, f64)]) -> Vec<Taxi> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Taxi::new(i as TaxiId + 1, Point::new(x, y)))
        .collect()
}

/// A free taxi that has already completed one trip per entry of `ratings`.
pub fn rated_taxi(id: TaxiId, position: Point, ratings: &[u8]) -> Taxi {
    let mut taxi = Taxi::new(id, position);
    for &rating in ratings {
        taxi.services += 1;
        taxi.rating_sum += f64::from(rating);
        taxi.rating_count += 1;
    }
    taxi
}

/// Parameters for a deterministic, short, unthrottled day.
///
/// Minutes take no wall-clock time, so a whole day runs in milliseconds.
pub fn fast_params() -> SimParams {
    SimParams::default()
        .with_seed(42)
        .with_real_ms_per_minute(0)
        .with_day_minutes(120)
}
