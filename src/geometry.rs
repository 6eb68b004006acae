//! Basic geometry primitives shared by every other module.
//!
//! Mirrors the plain-struct style of the teacher crate's own geometry
//! module: small `Copy` structs with free functions for the operations that
//! don't belong to a single type.

use serde::{Deserialize, Serialize};

/// Tolerance for 2D coincidence tests (distinct `CutPoint`s closer than this
/// are merged).
pub const EPS_2D: f64 = 1e-7;
/// Tolerance for z / altitude comparisons.
pub const EPS_Z: f64 = 1e-6;
/// Outward nudge applied to reflection points so that a subsequent
/// visibility test does not re-hit the generating wall.
pub const EPS_REFLECTION: f64 = 1e-4;
/// Offset added to a DIFH point that lands exactly on a building corner, so
/// it clears the roof rather than clipping it.
pub const EPS_ROOF: f64 = 1e-3;

/// A 2D coordinate. Z is tracked separately by [`Point3`] except where the
/// data model calls for interpolated altitude alongside a 2D position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 3D coordinate; z is an absolute altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn sub(&self, other: Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn cross(&self, other: Point3) -> Point3 {
        Point3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn dot(&self, other: Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(*self).sqrt()
    }
}

/// A 2D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    /// Parametric position of `p`'s closest point on the infinite line
    /// through this segment, not clamped to `[0, 1]`.
    pub fn parameter_of(&self, p: Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len2 = dx * dx + dy * dy;
        if len2 <= f64::EPSILON {
            return 0.0;
        }
        ((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len2
    }

    pub fn point_at(&self, t: f64) -> Point {
        Point::new(
            self.start.x + t * (self.end.x - self.start.x),
            self.start.y + t * (self.end.y - self.start.y),
        )
    }
}

/// Euclidean distance between two 2D points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Euclidean distance between two 3D points.
pub fn distance3(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

/// Signed area of a simple polygon using the shoelace formula (positive for
/// counter-clockwise winding).
pub fn signed_polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        sum += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
    }
    sum * 0.5
}

pub fn polygon_area(vertices: &[Point]) -> f64 {
    signed_polygon_area(vertices).abs()
}

/// Returns the 2D intersection point of two finite segments, if any,
/// excluding the degenerate collinear-overlap case.
pub fn segment_intersection(a: Segment, b: Segment) -> Option<Point> {
    let (p, r) = (a.start, (a.end.x - a.start.x, a.end.y - a.start.y));
    let (q, s) = (b.start, (b.end.x - b.start.x, b.end.y - b.start.y));
    let rxs = r.0 * s.1 - r.1 * s.0;
    if rxs.abs() < f64::EPSILON {
        return None;
    }
    let qp = (q.x - p.x, q.y - p.y);
    let t = (qp.0 * s.1 - qp.1 * s.0) / rxs;
    let u = (qp.0 * r.1 - qp.1 * r.0) / rxs;
    if (-EPS_2D..=1.0 + EPS_2D).contains(&t) && (-EPS_2D..=1.0 + EPS_2D).contains(&u) {
        Some(Point::new(p.x + t * r.0, p.y + t * r.1))
    } else {
        None
    }
}

/// The interior angle at `cur`, measured on the *outside* of a
/// counter-clockwise polygon `prev -> cur -> next`, in radians in
/// `(0, 2*pi]`. A plain convex right-angle corner (building corner) yields
/// `1.5 * pi`; a vertex where the boundary barely bends yields values near
/// `pi`; a sharp convex spike yields values near `2 * pi`.
pub fn exterior_angle_at_vertex(prev: Point, cur: Point, next: Point) -> f64 {
    let e1 = (cur.x - prev.x, cur.y - prev.y);
    let e2 = (next.x - cur.x, next.y - cur.y);
    let cross = e1.0 * e2.1 - e1.1 * e2.0;
    let dot = e1.0 * e2.0 + e1.1 * e2.1;
    let turn = cross.atan2(dot);
    std::f64::consts::PI + turn
}

/// The 2D convex hull of a point set, counter-clockwise, via the monotone
/// chain algorithm. Duplicate points are not removed by the caller's
/// responsibility but collinear interior points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap().then(a.y.partial_cmp(&b.y).unwrap()));
    pts.dedup_by(|a, b| distance(*a, *b) < EPS_2D);
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point, a: Point, b: Point) -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut lower: Vec<Point> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
