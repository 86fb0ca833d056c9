use std::cmp::Ordering;

use crate::registry::TaxiId;
use crate::spatial::Point;

use super::algorithm::MatchingAlgorithm;
use super::types::MatchCandidate;

/// Distances are compared at this resolution so that geometrically equal
/// pickups tie instead of being split by floating-point noise.
const DISTANCE_QUANTUM: f64 = 1e6;

/// Nearest-available matching with deterministic tie-breaking.
///
/// Among candidates within the search radius the winner is the one with
/// 1. the smallest pickup distance (rounded to six decimals),
/// 2. then the highest average rating,
/// 3. then the smallest taxi id.
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestRatedMatching;

#[derive(Debug, Clone, Copy)]
struct Ranked {
    distance_key: i64,
    average_rating: f64,
    taxi_id: TaxiId,
}

impl Ranked {
    /// `Less` means `self` is the better pick.
    fn compare(&self, other: &Self) -> Ordering {
        self.distance_key
            .cmp(&other.distance_key)
            .then_with(|| {
                other
                    .average_rating
                    .partial_cmp(&self.average_rating)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.taxi_id.cmp(&other.taxi_id))
    }
}

fn distance_key(distance: f64) -> i64 {
    (distance * DISTANCE_QUANTUM).round() as i64
}

impl MatchingAlgorithm for NearestRatedMatching {
    fn find_match(
        &self,
        origin: Point,
        candidates: &[MatchCandidate],
        search_radius: f64,
    ) -> Option<TaxiId> {
        candidates
            .iter()
            .filter_map(|candidate| {
                let distance = origin.distance_to(candidate.position);
                (distance <= search_radius).then(|| Ranked {
                    distance_key: distance_key(distance),
                    average_rating: candidate.average_rating,
                    taxi_id: candidate.taxi_id,
                })
            })
            .min_by(|a, b| a.compare(b))
            .map(|ranked| ranked.taxi_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(taxi_id: TaxiId, x: f64, y: f64, average_rating: f64) -> MatchCandidate {
        MatchCandidate {
            taxi_id,
            position: Point::new(x, y),
            average_rating,
        }
    }

    #[test]
    fn selects_closer_taxi() {
        let origin = Point::new(5.0, 5.0);
        let candidates = [
            candidate(1, 6.5, 5.0, 5.0),
            candidate(2, 5.5, 5.0, 1.0),
        ];
        let result = NearestRatedMatching.find_match(origin, &candidates, 2.0);
        assert_eq!(result, Some(2));
    }

    #[test]
    fn radius_is_inclusive_and_excludes_farther_taxis() {
        let origin = Point::new(0.0, 0.0);
        let on_edge = [candidate(4, 2.0, 0.0, 0.0)];
        assert_eq!(NearestRatedMatching.find_match(origin, &on_edge, 2.0), Some(4));

        let outside = [candidate(4, 2.0001, 0.0, 5.0)];
        assert_eq!(NearestRatedMatching.find_match(origin, &outside, 2.0), None);
    }

    #[test]
    fn equal_distance_prefers_higher_rating_then_lower_id() {
        let origin = Point::new(5.0, 5.0);
        // All four sit exactly one unit away, on different axes.
        let candidates = [
            candidate(7, 6.0, 5.0, 3.0),
            candidate(3, 4.0, 5.0, 4.5),
            candidate(9, 5.0, 6.0, 4.5),
            candidate(1, 5.0, 4.0, 2.0),
        ];
        assert_eq!(
            NearestRatedMatching.find_match(origin, &candidates, 2.0),
            Some(3)
        );
    }

    #[test]
    fn floating_point_noise_does_not_break_ties() {
        let origin = Point::new(0.1, 0.2);
        // 0.1 + 0.2 style noise: both are 0.3 away up to rounding error.
        let candidates = [
            candidate(2, 0.1 + 0.3, 0.2, 1.0),
            candidate(5, 0.1, 0.2 + 0.1 + 0.2, 4.0),
        ];
        assert_eq!(
            NearestRatedMatching.find_match(origin, &candidates, 2.0),
            Some(5)
        );
    }

    #[test]
    fn no_candidates_means_no_match() {
        assert_eq!(
            NearestRatedMatching.find_match(Point::new(1.0, 1.0), &[], 2.0),
            None
        );
    }
}
