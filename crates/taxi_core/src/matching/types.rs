use crate::registry::TaxiId;
use crate::spatial::Point;

/// An available taxi as seen by a matching algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate {
    pub taxi_id: TaxiId,
    pub position: Point,
    pub average_rating: f64,
}
