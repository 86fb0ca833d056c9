//! Planar map geometry: points, bounds and straight-line distances.
//!
//! The map is a flat rectangle measured in abstract distance units (the
//! console report labels them km). Distances are Euclidean.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned square map: both coordinates range over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub min: f64,
    pub max: f64,
}

impl MapBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min..=self.max).contains(&point.x) && (self.min..=self.max).contains(&point.y)
    }

    /// Draw a point with each coordinate independently uniform over the bounds.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point::new(
            rng.gen_range(self.min..=self.max),
            rng.gen_range(self.min..=self.max),
        )
    }
}

impl Default for MapBounds {
    fn default() -> Self {
        Self::new(0.0, 10.0)
    }
}
