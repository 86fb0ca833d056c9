mod build;
mod params;

pub use build::{build_registry, resolve_seed, ClientBehavior};
pub use params::{
    SimParams, DEFAULT_DAY_MINUTES, DEFAULT_INITIAL_OFFSET_MAX_MINUTES,
    DEFAULT_REAL_MS_PER_MINUTE, DEFAULT_SEARCH_RADIUS,
};
