//! Simple pricing system for calculating trip fares.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// Base fare in currency units.
pub const BASE_FARE: f64 = 2.50;

/// Lower bound of the per-distance-unit rate.
pub const PER_KM_RATE_MIN: f64 = 1.8;

/// Upper bound of the per-distance-unit rate.
pub const PER_KM_RATE_MAX: f64 = 3.2;

/// Pricing configuration: a fixed base plus a per-distance rate drawn per trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub base_fare: f64,
    pub per_km_rate_min: f64,
    pub per_km_rate_max: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_fare: BASE_FARE,
            per_km_rate_min: PER_KM_RATE_MIN,
            per_km_rate_max: PER_KM_RATE_MAX,
        }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.base_fare >= 0.0 && self.base_fare.is_finite()) {
            return Err(ScenarioError::NegativeBaseFare(self.base_fare));
        }
        let ordered = self.per_km_rate_min >= 0.0
            && self.per_km_rate_min <= self.per_km_rate_max
            && self.per_km_rate_max.is_finite();
        if !ordered {
            return Err(ScenarioError::InvalidFareRange {
                min: self.per_km_rate_min,
                max: self.per_km_rate_max,
            });
        }
        Ok(())
    }

    /// Draw this trip's per-distance rate, uniform over the configured range.
    pub fn sample_rate<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.per_km_rate_min..=self.per_km_rate_max)
    }

    /// Fare for a trip of `distance` at the given per-distance `rate`.
    pub fn fare(&self, distance: f64, rate: f64) -> f64 {
        calculate_trip_fare(self.base_fare, distance, rate)
    }
}

/// Calculate fare for a trip based on distance.
///
/// Formula: `fare = base_fare + (distance * rate)`, rounded to cents.
pub fn calculate_trip_fare(base_fare: f64, distance: f64, rate: f64) -> f64 {
    round_to_cents(base_fare + distance * rate)
}

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fare_includes_base_and_distance() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.fare(0.0, 2.0), 2.5);
        assert_eq!(pricing.fare(4.0, 2.0), 10.5);
        // 2.5 + 3.333 * 1.8 = 8.4994 -> 8.50
        assert_eq!(pricing.fare(3.333, 1.8), 8.5);
    }

    #[test]
    fn sampled_rate_respects_range() {
        let pricing = PricingConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let rate = pricing.sample_rate(&mut rng);
            assert!((PER_KM_RATE_MIN..=PER_KM_RATE_MAX).contains(&rate));
        }
    }

    #[test]
    fn inverted_rate_range_is_rejected() {
        let pricing = PricingConfig {
            per_km_rate_min: 3.0,
            per_km_rate_max: 1.0,
            ..PricingConfig::default()
        };
        assert_eq!(
            pricing.validate(),
            Err(ScenarioError::InvalidFareRange { min: 3.0, max: 1.0 })
        );
    }

    proptest! {
        #[test]
        fn fare_is_monotonic_in_distance(
            a in 0.0f64..20.0,
            b in 0.0f64..20.0,
            rate in PER_KM_RATE_MIN..=PER_KM_RATE_MAX,
        ) {
            let pricing = PricingConfig::default();
            let (short, long) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(pricing.fare(short, rate) <= pricing.fare(long, rate));
        }
    }
}
