//! Error types for scenario configuration and run startup.

use thiserror::Error;

/// Rejected simulation parameters. Raised before any thread is started.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("day length must be positive")]
    EmptyDay,

    #[error("map bounds are empty or inverted: min={min}, max={max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("search radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("{name}: triangular parameters must satisfy min <= mode <= max (got {min}/{mode}/{max})")]
    InvalidTriangular {
        name: &'static str,
        min: f64,
        mode: f64,
        max: f64,
    },

    #[error("fare rate range is inverted or negative: {min}..{max}")]
    InvalidFareRange { min: f64, max: f64 },

    #[error("base fare must be non-negative, got {0}")]
    NegativeBaseFare(f64),

    #[error("population must be positive: {0}")]
    EmptyPopulation(&'static str),

    #[error("fleet search radius {registry} differs from configured radius {params}")]
    RadiusMismatch { params: f64, registry: f64 },
}

/// Failures that stop a simulation before it produces an outcome.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: String,
        #[source]
        source: std::io::Error,
    },
}
