//! Oriented vertical wall segments bounding a building footprint.

use crate::geometry::{distance, Point, Segment};

/// An oriented vertical segment `(p0, p1)` with a top altitude, the id of
/// the building it belongs to, and a per-frequency-band absorption
/// spectrum. Wall vertices are counter-clockwise around the building
/// exterior, which encodes which side is "outside".
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub id: u64,
    pub building_id: u64,
    pub p0: Point,
    pub p1: Point,
    pub top_z: f64,
    pub absorption: Vec<f64>,
}

impl Wall {
    pub fn new(
        id: u64,
        building_id: u64,
        p0: Point,
        p1: Point,
        top_z: f64,
        absorption: Vec<f64>,
    ) -> Self {
        Self {
            id,
            building_id,
            p0,
            p1,
            top_z,
            absorption,
        }
    }

    pub fn segment(&self) -> Segment {
        Segment::new(self.p0, self.p1)
    }

    pub fn length(&self) -> f64 {
        distance(self.p0, self.p1)
    }

    /// The wall's 2D supporting line, as a unit direction vector `p0 -> p1`.
    pub fn direction(&self) -> (f64, f64) {
        let len = self.length();
        if len < f64::EPSILON {
            (0.0, 0.0)
        } else {
            ((self.p1.x - self.p0.x) / len, (self.p1.y - self.p0.y) / len)
        }
    }

    /// Outward-facing unit normal: since wall vertices wind
    /// counter-clockwise around the building exterior, "outside" is to the
    /// right of the `p0 -> p1` direction.
    pub fn outward_normal(&self) -> (f64, f64) {
        let (dx, dy) = self.direction();
        (dy, -dx)
    }

    /// Mirrors `p` across this wall's infinite supporting line.
    pub fn mirror_point(&self, p: Point) -> Point {
        let (dx, dy) = self.direction();
        let apx = p.x - self.p0.x;
        let apy = p.y - self.p0.y;
        let proj = apx * dx + apy * dy;
        let closest = Point::new(self.p0.x + proj * dx, self.p0.y + proj * dy);
        Point::new(2.0 * closest.x - p.x, 2.0 * closest.y - p.y)
    }

    /// Signed distance from `p` to the wall's infinite line along the
    /// outward normal: positive on the outside, negative on the inside.
    pub fn signed_offset(&self, p: Point) -> f64 {
        let (nx, ny) = self.outward_normal();
        (p.x - self.p0.x) * nx + (p.y - self.p0.y) * ny
    }
}

/// Symmetric test used by the reflection search: two walls "face" each
/// other if each wall's two endpoints lie in the other wall's outward
/// half-plane. Used to prune reflection chains where the second wall could
/// not plausibly reflect a ray leaving the first.
pub fn wall_wall_test(a: &Wall, b: &Wall) -> bool {
    let a_faces_b = a.signed_offset(b.p0) >= -1e-9 && a.signed_offset(b.p1) >= -1e-9;
    let b_faces_a = b.signed_offset(a.p0) >= -1e-9 && b.signed_offset(a.p1) >= -1e-9;
    a_faces_b && b_faces_a
}
