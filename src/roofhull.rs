//! Horizontal-edge (over-roof) diffraction: the upper convex hull over a
//! cut profile's vertical section, emitting DIFH propagation paths.

use crate::cutprofile::{CutKind, CutPoint, CutProfile};
use crate::geometry::{Point3, EPS_ROOF};
use crate::path::{PointKind, PointPath, PropagationPath};

/// A point eligible for the upper hull: every non-GROUND_EFFECT CutPoint,
/// keyed by its parametric distance and altitude.
fn hull_candidates(profile: &CutProfile) -> Vec<&CutPoint> {
    profile
        .points
        .iter()
        .filter(|p| !matches!(p.kind, CutKind::GroundEffect))
        .collect()
}

/// Tests whether `p` lies at or below the chord from `a` to `b` in
/// `(t, z)` space — the removal criterion for a hull point that is no
/// longer part of the upper envelope.
fn at_or_below_chord(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    let (ax, az) = a;
    let (bx, bz) = b;
    let (px, pz) = p;
    if (bx - ax).abs() < f64::EPSILON {
        return pz <= az.max(bz);
    }
    let interp = az + (bz - az) * (px - ax) / (bx - ax);
    pz <= interp + 1e-9
}

/// Builds the upper convex hull of the cut profile's `(t, z)` points, per
/// the anchor-sliding scan: each accepted point becomes the new anchor,
/// and any interior point that drops at or below the chord between its
/// surviving neighbors is pruned.
fn upper_hull(candidates: &[&CutPoint]) -> Vec<usize> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let mut hull: Vec<usize> = vec![0];
    for i in 1..candidates.len() {
        hull.push(i);
        while hull.len() > 2 {
            let n = hull.len();
            let a = candidates[hull[n - 3]];
            let b = candidates[hull[n - 2]];
            let c = candidates[hull[n - 1]];
            // b must lie strictly above the chord a-c to survive; otherwise
            // it is not part of the upper envelope and is pruned.
            if at_or_below_chord((a.t, a.position.z), (c.t, c.position.z), (b.t, b.position.z)) {
                hull.remove(n - 2);
            } else {
                break;
            }
        }
    }
    hull
}

/// Computes the horizontal-edge (roof) diffraction path for a profile,
/// or `None` if the hull reduces to `{SOURCE, RECEIVER}` (the free-field
/// case, handled separately by the composer).
pub fn compute_roof_path(
    profile: &CutProfile,
    source_id: u64,
    receiver_id: u64,
    g_s: f64,
    favourable: bool,
) -> Option<PropagationPath> {
    let candidates = hull_candidates(profile);
    let hull = upper_hull(&candidates);
    if hull.len() <= 2 {
        return None;
    }

    let mut points = Vec::with_capacity(hull.len());
    for (pos, &idx) in hull.iter().enumerate() {
        let cp = candidates[idx];
        let kind = match cp.kind {
            CutKind::Source => PointKind::Srce,
            CutKind::Receiver => PointKind::Recv,
            _ => PointKind::Difh,
        };
        let mut position = cp.position;
        if matches!(kind, PointKind::Difh) {
            if let Some(_building_id) = cp.building_id {
                // A DIFH point at a building corner's top is nudged up by
                // EPS_ROOF to avoid being clipped back onto the roof plane.
                position = Point3::new(position.x, position.y, position.z + EPS_ROOF);
            }
        }
        let mut point = PointPath::new(position, kind);
        if pos == 0 {
            point.kind = PointKind::Srce;
        }
        if pos == hull.len() - 1 {
            point.kind = PointKind::Recv;
        }
        points.push(point);
    }

    let ground_factors: Vec<f64> = hull
        .windows(2)
        .map(|w| {
            let t0 = candidates[w[0]].t;
            let t1 = candidates[w[1]].t;
            profile.ground_factor_between(t0, t1, g_s)
        })
        .collect();

    Some(PropagationPath::new(
        source_id,
        receiver_id,
        points,
        &ground_factors,
        favourable,
    ))
}
