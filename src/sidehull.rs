//! Vertical-edge (around-corner) diffraction: the iterative side-hull
//! construction over building corners cut by the source–receiver vertical
//! plane, producing left and right DIFV polylines.

use crate::error::{PathfinderError, Result};
use crate::geometry::{convex_hull, distance, Point};
use crate::path::{PointKind, PointPath, PropagationPath};
use crate::scene::Scene;

/// The vertical plane through `src` and `rcv`: a line in the XY plane plus
/// the convention that offsets are measured along its normal, positive on
/// one arbitrarily chosen side.
struct CutPlane {
    origin: Point,
    normal: (f64, f64),
}

impl CutPlane {
    fn new(src: Point, rcv: Point) -> Self {
        let dx = rcv.x - src.x;
        let dy = rcv.y - src.y;
        let len = (dx * dx + dy * dy).sqrt().max(f64::EPSILON);
        // Normal orthogonal to src->rcv at src, per the algorithm's
        // definition of the cut plane.
        Self {
            origin: src,
            normal: (-dy / len, dx / len),
        }
    }

    fn offset(&self, p: Point) -> f64 {
        (p.x - self.origin.x) * self.normal.0 + (p.y - self.origin.y) * self.normal.1
    }
}

/// Cuts a closed corner polyline by the plane, keeping only points on the
/// side named by `side` (`+1.0` or `-1.0`, multiplying the raw offset) and
/// inserting the plane-edge intersection wherever the offset changes sign
/// between consecutive points.
fn clip_to_plane(plane: &CutPlane, corners: &[Point], side: f64) -> Vec<Point> {
    if corners.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let n = corners.len();
    for i in 0..n {
        let a = corners[i];
        let b = corners[(i + 1) % n];
        let oa = plane.offset(a) * side;
        let ob = plane.offset(b) * side;
        if oa >= 0.0 {
            out.push(a);
        }
        if (oa > 0.0 && ob < 0.0) || (oa < 0.0 && ob > 0.0) {
            let t = oa / (oa - ob);
            out.push(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)));
        }
    }
    out
}

fn hull_perimeter(hull: &[Point]) -> f64 {
    if hull.len() < 2 {
        return 0.0;
    }
    let n = hull.len();
    (0..n).map(|i| distance(hull[i], hull[(i + 1) % n])).sum()
}

/// Grows the candidate set `C` by one round: for every hull edge, finds
/// buildings near it not yet processed, clips their wide-angle corners to
/// the cut plane, and folds the surviving points in. Returns the newly
/// added points and processed building ids.
fn grow_once(
    scene: &Scene,
    plane: &CutPlane,
    hull: &[Point],
    processed: &mut std::collections::HashSet<u64>,
    side: f64,
) -> Vec<Point> {
    let mut added = Vec::new();
    let n = hull.len();
    for i in 0..n {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        let min = Point::new(a.x.min(b.x), a.y.min(b.y));
        let max = Point::new(a.x.max(b.x), a.y.max(b.y));
        for &building_id in &scene.buildings_on_path(min, max) {
            if processed.contains(&building_id) {
                continue;
            }
            let Some(building) = scene.get_building(building_id) else {
                continue;
            };
            let corners = building.wide_angle_corners();
            let clipped = clip_to_plane(plane, &corners, side);
            if !clipped.is_empty() {
                added.extend(clipped);
            }
            processed.insert(building_id);
        }
    }
    added
}

/// Runs the iterative side-hull construction restricted to one side of the
/// cut plane (`side` is `+1.0` or `-1.0`), returning the intermediate
/// corner polyline from `src` to `rcv` around that side (empty if no
/// building corner bulges out on it).
fn build_one_side(scene: &Scene, plane: &CutPlane, src: Point, rcv: Point, baseline: f64, side: f64) -> Result<Vec<Point>> {
    let mut candidates = vec![src, rcv];
    let mut processed = std::collections::HashSet::new();

    loop {
        let hull = convex_hull(&candidates);
        if hull_perimeter(&hull) / baseline > 4.0 {
            return Err(PathfinderError::NonConvergence);
        }
        let added = grow_once(scene, plane, &hull, &mut processed, side);
        if added.is_empty() {
            break;
        }
        candidates.extend(added);
    }

    let hull = convex_hull(&candidates);
    if hull.len() < 3 {
        return Ok(Vec::new());
    }
    let src_idx = hull
        .iter()
        .position(|&p| distance(p, src) < 1e-6)
        .unwrap_or(0);
    let rcv_idx = hull
        .iter()
        .position(|&p| distance(p, rcv) < 1e-6)
        .unwrap_or(hull.len().saturating_sub(1));

    let n = hull.len();
    let mut forward = Vec::new();
    let mut i = src_idx;
    while i != rcv_idx {
        i = (i + 1) % n;
        if i == rcv_idx {
            break;
        }
        forward.push(hull[i]);
    }
    if !forward.is_empty() {
        return Ok(forward);
    }
    let mut backward = Vec::new();
    let mut i = src_idx;
    while i != rcv_idx {
        i = (i + n - 1) % n;
        if i == rcv_idx {
            break;
        }
        backward.push(hull[i]);
    }
    Ok(backward)
}

/// Runs the iterative side-hull construction between `src` and `rcv`,
/// returning the left and right DIFV corner polylines (excluding the src
/// and rcv endpoints themselves). The two sides are grown independently,
/// each restricted to building corners on its own side of the
/// source-receiver cut plane, so the footprint is wrapped on both sides
/// rather than bulging toward a single one.
fn build_side_hull(scene: &Scene, src: Point, rcv: Point) -> Result<(Vec<Point>, Vec<Point>)> {
    let plane = CutPlane::new(src, rcv);
    let baseline = distance(src, rcv).max(f64::EPSILON);

    let left = build_one_side(scene, &plane, src, rcv, baseline, 1.0)?;
    let right = build_one_side(scene, &plane, src, rcv, baseline, -1.0)?;

    Ok((left, right))
}

/// Builds the two DIFV propagation paths (left and right side, when each
/// survives z-validation), or an empty list if the side hull does not
/// converge or neither side has intermediate corners.
pub fn compute_side_paths(
    scene: &Scene,
    src: Point,
    rcv: Point,
    source_id: u64,
    receiver_id: u64,
    g_s: f64,
    favourable: bool,
) -> Result<Vec<PropagationPath>> {
    let (left, right) = build_side_hull(scene, src, rcv)?;
    let src_z = scene.height_at_position(src);
    let rcv_z = scene.height_at_position(rcv);

    let mut paths = Vec::new();
    for side in [left, right] {
        if side.is_empty() {
            continue;
        }
        let mut ok = true;
        let mut points = Vec::with_capacity(side.len() + 2);
        points.push(PointPath::new(
            crate::geometry::Point3::new(src.x, src.y, src_z),
            PointKind::Srce,
        ));
        for corner in &side {
            let building_ids = scene.buildings_on_path(*corner, *corner);
            let roof_z = building_ids
                .first()
                .and_then(|&id| scene.get_building_roof_z(id))
                .unwrap_or(rcv_z.max(src_z));
            if roof_z < 0.0 {
                ok = false;
                break;
            }
            points.push(PointPath::new(
                crate::geometry::Point3::new(corner.x, corner.y, roof_z),
                PointKind::Difv,
            ));
        }
        if !ok {
            continue;
        }
        points.push(PointPath::new(
            crate::geometry::Point3::new(rcv.x, rcv.y, rcv_z),
            PointKind::Recv,
        ));
        let ground_factors = vec![g_s; points.len() - 1];
        paths.push(PropagationPath::new(
            source_id,
            receiver_id,
            points,
            &ground_factors,
            favourable,
        ));
    }
    Ok(paths)
}
