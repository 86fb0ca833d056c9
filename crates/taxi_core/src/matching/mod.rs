pub mod algorithm;
pub mod nearest;
pub mod types;

pub use algorithm::MatchingAlgorithm;
pub use nearest::NearestRatedMatching;
pub use types::MatchCandidate;
