use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::distributions::TriangularParams;
use crate::error::ScenarioError;
use crate::pricing::PricingConfig;
use crate::spatial::MapBounds;

/// One simulated minute lasts 40 ms of wall-clock time.
pub const DEFAULT_REAL_MS_PER_MINUTE: u64 = 40;

/// 00:00 to 24:00.
pub const DEFAULT_DAY_MINUTES: u64 = 24 * 60;

/// Max distance between a pickup point and a dispatchable taxi.
pub const DEFAULT_SEARCH_RADIUS: f64 = 2.0;

/// Upper bound of the random start delay that desynchronizes clients.
pub const DEFAULT_INITIAL_OFFSET_MAX_MINUTES: u64 = 10;

const DEFAULT_TRIP_DURATION: TriangularParams = TriangularParams::new(12.0, 20.0, 45.0);
const DEFAULT_INTER_TRIP_WAIT: TriangularParams = TriangularParams::new(10.0, 30.0, 90.0);
const DEFAULT_RETRY_DELAY: TriangularParams = TriangularParams::new(2.0, 5.0, 12.0);

/// Every tunable constant of a simulation run.
///
/// Deserializes from partial JSON: missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// RNG seed; `None` draws one from entropy at build time.
    pub seed: Option<u64>,
    /// Wall-clock milliseconds per simulated minute. Zero runs as fast as possible.
    pub real_ms_per_minute: u64,
    /// Nominal day length; no trip is admitted at or after this minute.
    pub day_minutes: u64,
    pub map_bounds: MapBounds,
    pub search_radius: f64,
    /// Trip duration in minutes.
    pub trip_duration: TriangularParams,
    /// Pause between a completed trip and the next request.
    pub inter_trip_wait: TriangularParams,
    /// Delay before re-requesting after a dispatch miss.
    pub retry_delay: TriangularParams,
    pub initial_offset_max_minutes: u64,
    pub pricing: PricingConfig,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            seed: None,
            real_ms_per_minute: DEFAULT_REAL_MS_PER_MINUTE,
            day_minutes: DEFAULT_DAY_MINUTES,
            map_bounds: MapBounds::default(),
            search_radius: DEFAULT_SEARCH_RADIUS,
            trip_duration: DEFAULT_TRIP_DURATION,
            inter_trip_wait: DEFAULT_INTER_TRIP_WAIT,
            retry_delay: DEFAULT_RETRY_DELAY,
            initial_offset_max_minutes: DEFAULT_INITIAL_OFFSET_MAX_MINUTES,
            pricing: PricingConfig::default(),
        }
    }
}

impl SimParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_real_ms_per_minute(mut self, ms: u64) -> Self {
        self.real_ms_per_minute = ms;
        self
    }

    pub fn with_day_minutes(mut self, minutes: u64) -> Self {
        self.day_minutes = minutes;
        self
    }

    pub fn with_map_bounds(mut self, bounds: MapBounds) -> Self {
        self.map_bounds = bounds;
        self
    }

    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = radius;
        self
    }

    pub fn with_trip_duration(mut self, params: TriangularParams) -> Self {
        self.trip_duration = params;
        self
    }

    pub fn with_inter_trip_wait(mut self, params: TriangularParams) -> Self {
        self.inter_trip_wait = params;
        self
    }

    pub fn with_retry_delay(mut self, params: TriangularParams) -> Self {
        self.retry_delay = params;
        self
    }

    pub fn with_initial_offset_max_minutes(mut self, minutes: u64) -> Self {
        self.initial_offset_max_minutes = minutes;
        self
    }

    pub fn with_pricing_config(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    /// Real-time length of one simulated minute.
    pub fn minute_duration(&self) -> Duration {
        Duration::from_millis(self.real_ms_per_minute)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.day_minutes == 0 {
            return Err(ScenarioError::EmptyDay);
        }
        let MapBounds { min, max } = self.map_bounds;
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ScenarioError::InvalidBounds { min, max });
        }
        if !(self.search_radius > 0.0 && self.search_radius.is_finite()) {
            return Err(ScenarioError::InvalidRadius(self.search_radius));
        }
        self.trip_duration.validate("trip_duration")?;
        self.inter_trip_wait.validate("inter_trip_wait")?;
        self.retry_delay.validate("retry_delay")?;
        self.pricing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = SimParams::default();
        assert_eq!(params.validate(), Ok(()));
        assert_eq!(params.day_minutes, 1440);
        assert_eq!(params.minute_duration(), Duration::from_millis(40));
    }

    #[test]
    fn zero_radius_is_rejected() {
        let params = SimParams::default().with_search_radius(0.0);
        assert_eq!(params.validate(), Err(ScenarioError::InvalidRadius(0.0)));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let params = SimParams::default().with_map_bounds(MapBounds::new(5.0, 1.0));
        assert_eq!(
            params.validate(),
            Err(ScenarioError::InvalidBounds { min: 5.0, max: 1.0 })
        );
    }

    #[test]
    fn empty_day_is_rejected() {
        let params = SimParams::default().with_day_minutes(0);
        assert_eq!(params.validate(), Err(ScenarioError::EmptyDay));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let params: SimParams =
            serde_json::from_str(r#"{ "seed": 7, "search_radius": 3.5 }"#).expect("parse");
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.search_radius, 3.5);
        assert_eq!(params.trip_duration, DEFAULT_TRIP_DURATION);
        assert_eq!(params.pricing, PricingConfig::default());
    }
}
