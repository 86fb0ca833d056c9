use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::distributions::TriangularMinutes;
use crate::error::ScenarioError;
use crate::pricing::PricingConfig;
use crate::registry::TaxiRegistry;
use crate::spatial::MapBounds;

use super::params::SimParams;

/// Validated, sampler-ready view of the parameters every client shares.
#[derive(Debug, Clone)]
pub struct ClientBehavior {
    pub day_minutes: u64,
    pub map_bounds: MapBounds,
    pub initial_offset_max_minutes: u64,
    pub trip_duration: TriangularMinutes,
    pub inter_trip_wait: TriangularMinutes,
    pub retry_delay: TriangularMinutes,
    pub pricing: PricingConfig,
}

impl ClientBehavior {
    pub fn from_params(params: &SimParams) -> Result<Self, ScenarioError> {
        params.validate()?;
        Ok(Self {
            day_minutes: params.day_minutes,
            map_bounds: params.map_bounds,
            initial_offset_max_minutes: params.initial_offset_max_minutes,
            trip_duration: params.trip_duration.sampler("trip_duration")?,
            inter_trip_wait: params.inter_trip_wait.sampler("inter_trip_wait")?,
            retry_delay: params.retry_delay.sampler("retry_delay")?,
            pricing: params.pricing,
        })
    }
}

/// The seed a run will use: the configured one, or a fresh random one.
pub fn resolve_seed(params: &SimParams) -> u64 {
    params.seed.unwrap_or_else(rand::random::<u64>)
}

/// Fleet of `taxi_count` free taxis scattered uniformly over the map.
pub fn build_registry(
    params: &SimParams,
    taxi_count: usize,
    seed: u64,
) -> Result<TaxiRegistry, ScenarioError> {
    params.validate()?;
    if taxi_count == 0 {
        return Err(ScenarioError::EmptyPopulation("taxis"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(TaxiRegistry::with_random_positions(
        taxi_count,
        params.map_bounds,
        params.search_radius,
        &mut rng,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_builds_same_fleet() {
        let params = SimParams::default();
        let a = build_registry(&params, 20, 99).expect("build").taxis();
        let b = build_registry(&params, 20, 99).expect("build").taxis();
        assert_eq!(a, b);
        assert!(a.iter().all(|t| params.map_bounds.contains(t.position)));
        assert_eq!(a.iter().map(|t| t.id).collect::<Vec<_>>(), (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn empty_fleet_is_rejected() {
        let err = build_registry(&SimParams::default(), 0, 1).expect_err("no taxis");
        assert_eq!(err, ScenarioError::EmptyPopulation("taxis"));
    }

    #[test]
    fn configured_seed_wins() {
        assert_eq!(resolve_seed(&SimParams::default().with_seed(5)), 5);
    }
}
