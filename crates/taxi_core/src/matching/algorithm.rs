use crate::registry::TaxiId;
use crate::spatial::Point;

use super::types::MatchCandidate;

/// Trait for algorithms that pick which available taxi serves a request.
///
/// The registry calls `find_match` while holding its lock, with every
/// currently available taxi as a candidate, and binds whatever id comes back.
/// Implementations must therefore be pure: no locking, no sleeping, and the
/// same inputs must always produce the same answer.
pub trait MatchingAlgorithm: Send + Sync + std::fmt::Debug {
    /// Pick a taxi for a pickup at `origin`.
    ///
    /// Returns `None` when no candidate lies within `search_radius`
    /// (inclusive). A returned id must belong to one of `candidates`.
    fn find_match(
        &self,
        origin: Point,
        candidates: &[MatchCandidate],
        search_radius: f64,
    ) -> Option<TaxiId>;
}
