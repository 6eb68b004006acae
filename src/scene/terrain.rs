//! Triangulated terrain: a Delaunay-like triangulation with per-vertex
//! altitude and per-triangle neighbor links, used to interpolate ground
//! height and to walk the edges a 2D segment crosses.

use crate::geometry::{distance, Point, Point3, Segment, EPS_2D};

/// A triangulated irregular network with neighbor links between adjacent
/// triangles, enabling the edge-crossing walk required by the cut-profile
/// query.
#[derive(Debug, Clone)]
pub struct Terrain {
    pub vertices: Vec<Point3>,
    pub triangles: Vec<[usize; 3]>,
    /// `neighbors[t][k]` is the triangle across the edge
    /// `(triangles[t][k], triangles[t][(k + 1) % 3])`, or `None` at the
    /// terrain boundary.
    neighbors: Vec<[Option<usize>; 3]>,
}

/// A single crossing of a terrain triangle edge by a probe segment.
#[derive(Debug, Clone, Copy)]
pub struct TerrainCrossing {
    pub position: Point3,
    /// Parametric distance along the probe segment, in `[0, 1]`.
    pub t: f64,
}

fn barycentric(p: Point, a: Point3, b: Point3, c: Point3) -> Option<(f64, f64, f64)> {
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if det.abs() < f64::EPSILON {
        return None;
    }
    let u = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / det;
    let v = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / det;
    let w = 1.0 - u - v;
    Some((u, v, w))
}

/// Intersection of segment `a->b` with edge `e0->e1`, returning the
/// parametric distance along `a->b` (unclamped sign, but only values in
/// `[0, 1]` are meaningful crossings of the probe itself).
fn segment_edge_t(a: Point, b: Point, e0: Point, e1: Point) -> Option<f64> {
    let r = (b.x - a.x, b.y - a.y);
    let s = (e1.x - e0.x, e1.y - e0.y);
    let rxs = r.0 * s.1 - r.1 * s.0;
    if rxs.abs() < f64::EPSILON {
        return None;
    }
    let qp = (e0.x - a.x, e0.y - a.y);
    let t = (qp.0 * s.1 - qp.1 * s.0) / rxs;
    let u = (qp.0 * r.1 - qp.1 * r.0) / rxs;
    if (-EPS_2D..=1.0 + EPS_2D).contains(&u) {
        Some(t)
    } else {
        None
    }
}

impl Terrain {
    /// Builds a terrain directly from pre-triangulated data, as delivered
    /// by the scene ingestion builder (vertices with altitude, triangle
    /// index triples, per-triangle neighbor ids).
    pub fn from_raw(
        vertices: Vec<Point3>,
        triangles: Vec<[usize; 3]>,
        neighbors: Vec<[Option<usize>; 3]>,
    ) -> Self {
        debug_assert_eq!(triangles.len(), neighbors.len());
        Self {
            vertices,
            triangles,
            neighbors,
        }
    }

    /// Builds a terrain from a raw point cloud via Delaunay triangulation on
    /// the XY plane, deriving neighbor links from shared triangle edges.
    /// Convenience for callers who do not already have a triangulation.
    pub fn from_points(points: Vec<Point3>) -> Self {
        let coords: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&coords);
        let triangles: Vec<[usize; 3]> = triangulation
            .triangles
            .chunks(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let neighbors = derive_neighbors(&triangles);
        Self {
            vertices: points,
            triangles,
            neighbors,
        }
    }

    fn triangle_points(&self, t: usize) -> [Point3; 3] {
        let tri = self.triangles[t];
        [self.vertices[tri[0]], self.vertices[tri[1]], self.vertices[tri[2]]]
    }

    /// Locates the triangle containing `(x, y)`, if any.
    pub fn locate(&self, p: Point) -> Option<usize> {
        for (idx, _) in self.triangles.iter().enumerate() {
            let [a, b, c] = self.triangle_points(idx);
            if let Some((u, v, w)) = barycentric(p, a, b, c) {
                if u >= -EPS_2D && v >= -EPS_2D && w >= -EPS_2D {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Interpolated altitude at `(x, y)` if the point lies within the
    /// terrain's triangulated extent.
    pub fn height_at(&self, p: Point) -> Option<f64> {
        let idx = self.locate(p)?;
        let [a, b, c] = self.triangle_points(idx);
        let (u, v, w) = barycentric(p, a, b, c)?;
        Some(u * a.z + v * b.z + w * c.z)
    }

    /// Walks the triangle edges crossed by the 2D segment `a -> b`, in
    /// order of increasing parametric distance from `a`, per the cut
    /// profile algorithm. Returns an empty list if `a` does not lie inside
    /// the terrain's triangulated extent.
    pub fn crossings(&self, a: Point, b: Point) -> Vec<TerrainCrossing> {
        let mut out = Vec::new();
        let Some(mut current) = self.locate(a) else {
            return out;
        };
        let mut entered_edge: Option<usize> = None;
        let mut last_t = 0.0_f64;
        let b_in_current = |tri: usize, this: &Terrain| -> bool {
            let [p0, p1, p2] = this.triangle_points(tri);
            matches!(barycentric(b, p0, p1, p2), Some((u, v, w)) if u >= -EPS_2D && v >= -EPS_2D && w >= -EPS_2D)
        };

        // Bound iterations by triangle count: the walk cannot legitimately
        // revisit a triangle (a straight segment crosses a convex-ish mesh
        // in a strictly monotone sequence of parameters).
        for _ in 0..=self.triangles.len() {
            if b_in_current(current, self) {
                break;
            }
            let tri = self.triangles[current];
            let verts = [
                self.vertices[tri[0]],
                self.vertices[tri[1]],
                self.vertices[tri[2]],
            ];
            let mut best: Option<(usize, f64)> = None;
            for k in 0..3 {
                if Some(k) == entered_edge {
                    continue;
                }
                let e0 = verts[k];
                let e1 = verts[(k + 1) % 3];
                if let Some(t) = segment_edge_t(a, b, e0.xy(), e1.xy()) {
                    if t > last_t + EPS_2D && t <= 1.0 + EPS_2D {
                        if best.is_none() || t < best.unwrap().1 {
                            best = Some((k, t));
                        }
                    }
                }
            }
            let Some((edge_k, t)) = best else {
                break;
            };
            let e0 = verts[edge_k];
            let e1 = verts[(edge_k + 1) % 3];
            let local_t = if distance(e0.xy(), e1.xy()) < EPS_2D {
                0.0
            } else {
                let seg = Segment::new(e0.xy(), e1.xy());
                seg.parameter_of(Point::new(
                    a.x + t * (b.x - a.x),
                    a.y + t * (b.y - a.y),
                ))
                .clamp(0.0, 1.0)
            };
            let z = e0.z + local_t * (e1.z - e0.z);
            let pos = Point3::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y), z);
            out.push(TerrainCrossing { position: pos, t });
            last_t = t;
            match self.neighbors[current][edge_k] {
                Some(next) => {
                    // Find which of the neighbor's own edges faces back to
                    // `current` so we don't immediately cross back.
                    let back_edge = self.neighbors[next]
                        .iter()
                        .position(|&n| n == Some(current));
                    entered_edge = back_edge;
                    current = next;
                }
                None => break,
            }
        }
        merge_close(out)
    }
}

fn merge_close(mut crossings: Vec<TerrainCrossing>) -> Vec<TerrainCrossing> {
    crossings.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
    let mut out: Vec<TerrainCrossing> = Vec::with_capacity(crossings.len());
    for c in crossings.drain(..) {
        if let Some(last) = out.last() {
            if (c.t - last.t).abs() < EPS_2D {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn derive_neighbors(triangles: &[[usize; 3]]) -> Vec<[Option<usize>; 3]> {
    use std::collections::HashMap;
    let mut edge_owner: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    let mut neighbors = vec![[None; 3]; triangles.len()];
    for (t, tri) in triangles.iter().enumerate() {
        for k in 0..3 {
            let a = tri[k];
            let b = tri[(k + 1) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            if let Some(&(other_t, other_k)) = edge_owner.get(&key) {
                neighbors[t][k] = Some(other_t);
                neighbors[other_t][other_k] = Some(t);
            } else {
                edge_owner.insert(key, (t, k));
            }
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_two_triangles() -> Terrain {
        // Two triangles forming a unit square at z=0, sharing the diagonal.
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        Terrain::from_points(pts)
    }

    #[test]
    fn height_at_flat_square() {
        let t = flat_two_triangles();
        assert!((t.height_at(Point::new(0.5, 0.5)).unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn height_outside_extent_is_none() {
        let t = flat_two_triangles();
        assert!(t.height_at(Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn crossing_ramp_interpolates_z() {
        // A ramp: z increases linearly with x.
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(10.0, 10.0, 10.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        let t = Terrain::from_points(pts);
        let crossings = t.crossings(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        // At minimum the shared diagonal edge is crossed once.
        assert!(!crossings.is_empty());
        for c in &crossings {
            assert!((c.position.z - c.position.x).abs() < 1e-6);
        }
    }

    #[test]
    fn crossings_sorted_by_parametric_distance() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 5.0),
            Point3::new(10.0, 10.0, 5.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        let t = Terrain::from_points(pts);
        let crossings = t.crossings(Point::new(0.0, 0.1), Point::new(10.0, 9.9));
        for w in crossings.windows(2) {
            assert!(w[0].t <= w[1].t);
        }
    }
}
