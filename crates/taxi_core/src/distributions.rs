//! Probability distributions for the simulated delays.
//!
//! Trip durations, inter-trip waits and dispatch retry delays are all drawn
//! from triangular distributions expressed in whole simulated minutes: most
//! samples land near the mode while the tails still produce the occasional
//! short or long value.

use rand::Rng;
use rand_distr::{Distribution, Triangular};
use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

/// Serializable `min / mode / max` triple, in simulated minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangularParams {
    pub min: f64,
    pub mode: f64,
    pub max: f64,
}

impl TriangularParams {
    pub const fn new(min: f64, mode: f64, max: f64) -> Self {
        Self { min, mode, max }
    }

    /// Check the ordering `min <= mode <= max`; `name` labels the error.
    pub fn validate(&self, name: &'static str) -> Result<(), ScenarioError> {
        let ordered = self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.min <= self.mode
            && self.mode <= self.max;
        if ordered {
            Ok(())
        } else {
            Err(ScenarioError::InvalidTriangular {
                name,
                min: self.min,
                mode: self.mode,
                max: self.max,
            })
        }
    }

    pub fn sampler(&self, name: &'static str) -> Result<TriangularMinutes, ScenarioError> {
        self.validate(name)?;
        let inner = Triangular::new(self.min, self.max, self.mode).map_err(|_| {
            ScenarioError::InvalidTriangular {
                name,
                min: self.min,
                mode: self.mode,
                max: self.max,
            }
        })?;
        Ok(TriangularMinutes { inner })
    }
}

/// Triangular sampler that yields whole minutes, never less than one.
#[derive(Debug, Clone, Copy)]
pub struct TriangularMinutes {
    inner: Triangular<f64>,
}

impl TriangularMinutes {
    pub fn sample_minutes<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let raw = self.inner.sample(rng).round();
        // A zero-length wait would let an actor spin without yielding.
        (raw as u64).max(1)
    }
}

/// Uniform whole-minute offset in `0..=max_minutes`.
pub fn uniform_offset_minutes<R: Rng + ?Sized>(rng: &mut R, max_minutes: u64) -> u64 {
    rng.gen_range(0..=max_minutes)
}

/// Passenger rating, uniform over `1..=5`.
pub fn sample_rating<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(1..=5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn triangular_samples_stay_within_rounded_range() {
        let sampler = TriangularParams::new(12.0, 20.0, 45.0)
            .sampler("trip")
            .expect("valid params");
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5_000 {
            let minutes = sampler.sample_minutes(&mut rng);
            assert!((12..=45).contains(&minutes), "sample out of range: {minutes}");
        }
    }

    #[test]
    fn degenerate_triangle_is_clamped_to_one_minute() {
        let sampler = TriangularParams::new(0.0, 0.0, 0.0)
            .sampler("retry")
            .expect("valid params");
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sampler.sample_minutes(&mut rng), 1);
    }

    #[test]
    fn mode_outside_range_is_rejected() {
        let err = TriangularParams::new(10.0, 5.0, 20.0)
            .sampler("wait")
            .expect_err("mode below min");
        assert!(matches!(err, ScenarioError::InvalidTriangular { name: "wait", .. }));
    }

    #[test]
    fn ratings_cover_one_to_five() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 5];
        for _ in 0..1_000 {
            let rating = sample_rating(&mut rng);
            assert!((1..=5).contains(&rating));
            seen[(rating - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn offset_zero_is_always_zero() {
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(uniform_offset_minutes(&mut rng, 0), 0);
    }
}
