//! Building footprints: polygon, roof altitude, absorption spectrum, and
//! the derived wide-angle corner list used as candidate diffraction
//! corners by the vertical-edge (side) hull.

use crate::geometry::{exterior_angle_at_vertex, Point};
use std::f64::consts::PI;

/// A building footprint polygon (counter-clockwise) with a roof altitude
/// and per-band absorption spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub id: u64,
    /// Counter-clockwise footprint polygon; not explicitly closed (first
    /// vertex is not repeated at the end).
    pub footprint: Vec<Point>,
    pub roof_z: f64,
    pub absorption: Vec<f64>,
}

/// Lower and upper bound, in radians, of the "wide-angle corner" interior
/// angle window from the data model: `(pi * (1 + 1/16), pi * (2 - 1/16))`.
pub const WIDE_ANGLE_MIN: f64 = PI * (1.0 + 1.0 / 16.0);
pub const WIDE_ANGLE_MAX: f64 = PI * (2.0 - 1.0 / 16.0);

impl Building {
    pub fn new(id: u64, footprint: Vec<Point>, roof_z: f64, absorption: Vec<f64>) -> Self {
        Self {
            id,
            footprint,
            roof_z,
            absorption,
        }
    }

    /// Vertices whose interior angle, measured on the outside of the
    /// footprint, lies in `(WIDE_ANGLE_MIN, WIDE_ANGLE_MAX)` — usable as
    /// candidate diffraction corners for the vertical-edge hull.
    pub fn wide_angle_corners(&self) -> Vec<Point> {
        self.wide_angle_corners_in(WIDE_ANGLE_MIN, WIDE_ANGLE_MAX)
    }

    /// Same as [`Self::wide_angle_corners`] but with a caller-supplied
    /// window, matching the query contract's
    /// `wideAngleCorners(minInteriorAngle, maxInteriorAngle)`.
    pub fn wide_angle_corners_in(&self, min_angle: f64, max_angle: f64) -> Vec<Point> {
        let n = self.footprint.len();
        if n < 3 {
            return Vec::new();
        }
        (0..n)
            .filter(|&i| {
                let prev = self.footprint[(i + n - 1) % n];
                let cur = self.footprint[i];
                let next = self.footprint[(i + 1) % n];
                let angle = exterior_angle_at_vertex(prev, cur, next);
                angle > min_angle && angle < max_angle
            })
            .map(|i| self.footprint[i])
            .collect()
    }

    /// Bounding box of the footprint in `(min, max)` form.
    pub fn bounds(&self) -> (Point, Point) {
        let mut min = self.footprint[0];
        let mut max = self.footprint[0];
        for p in &self.footprint {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    pub fn contains_z(&self, z: f64, terrain_z: f64) -> bool {
        z >= terrain_z - 1e-6 && z <= self.roof_z + 1e-6
    }
}
