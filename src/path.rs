//! Propagation paths: the output of the path composer, made of
//! [`PointPath`]/[`SegmentPath`] sequences with the invariants checked in
//! [`PropagationPath::new`].

use crate::geometry::Point3;

/// The role a point plays within a propagation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// The noise source.
    Srce,
    /// The receiver.
    Recv,
    /// A specular reflection off a building wall.
    Refl,
    /// Horizontal-edge (over-roof) diffraction.
    Difh,
    /// Vertical-edge (around-corner) diffraction.
    Difv,
}

/// A single point in a propagation path.
#[derive(Debug, Clone)]
pub struct PointPath {
    pub position: Point3,
    pub kind: PointKind,
    /// Set only for [`PointKind::Refl`] points: the building the
    /// reflecting wall belongs to.
    pub building_id: Option<u64>,
    /// Set only for [`PointKind::Refl`] points: the wall's absorption
    /// spectrum.
    pub absorption: Option<Vec<f64>>,
}

impl PointPath {
    pub fn new(position: Point3, kind: PointKind) -> Self {
        Self {
            position,
            kind,
            building_id: None,
            absorption: None,
        }
    }

    pub fn reflection(position: Point3, building_id: u64, absorption: Vec<f64>) -> Self {
        Self {
            position,
            kind: PointKind::Refl,
            building_id: Some(building_id),
            absorption: Some(absorption),
        }
    }
}

/// A segment between two consecutive [`PointPath`]s, carrying its
/// equivalent ground factor and 3D direction.
#[derive(Debug, Clone)]
pub struct SegmentPath {
    pub ground_factor: f64,
    pub direction: (f64, f64, f64),
    pub length: f64,
}

impl SegmentPath {
    pub fn between(a: Point3, b: Point3, ground_factor: f64) -> Self {
        let d = b.sub(a);
        let length = a.sub(b).norm();
        let direction = if length < f64::EPSILON {
            (0.0, 0.0, 0.0)
        } else {
            (d.x / length, d.y / length, d.z / length)
        };
        Self {
            ground_factor,
            direction,
            length,
        }
    }
}

/// A complete geometric propagation path between one source and one
/// receiver.
#[derive(Debug, Clone)]
pub struct PropagationPath {
    pub source_id: u64,
    pub receiver_id: u64,
    pub points: Vec<PointPath>,
    pub segments: Vec<SegmentPath>,
    /// Whether this path was computed under downward-refracting
    /// (favourable) conditions; set by the caller at emission time, never
    /// inferred from geometry.
    pub favourable: bool,
}

impl PropagationPath {
    /// Builds a path from `points`, deriving one segment per consecutive
    /// pair with the given per-segment ground factors.
    ///
    /// `ground_factors` must have exactly `points.len() - 1` entries.
    /// Panics if the basic shape invariants (first = SRCE, last = RECV,
    /// at least two points) do not hold; callers construct `points` from
    /// scene geometry internally, so a violation indicates a bug upstream
    /// rather than bad external input.
    pub fn new(
        source_id: u64,
        receiver_id: u64,
        points: Vec<PointPath>,
        ground_factors: &[f64],
        favourable: bool,
    ) -> Self {
        assert!(points.len() >= 2, "a propagation path needs at least two points");
        assert!(matches!(points.first().unwrap().kind, PointKind::Srce));
        assert!(matches!(points.last().unwrap().kind, PointKind::Recv));
        assert_eq!(ground_factors.len(), points.len() - 1);

        let segments = points
            .windows(2)
            .zip(ground_factors.iter())
            .map(|(w, &g)| SegmentPath::between(w[0].position, w[1].position, g))
            .collect();

        Self {
            source_id,
            receiver_id,
            points,
            segments,
            favourable,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}
