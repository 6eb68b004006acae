//! The cut-profile query: the ordered sequence of classified intersection
//! points between a source and a receiver, and the `isFreeField` test
//! derived from it.

use crate::geometry::{segment_intersection, Point, Point3, Segment, EPS_2D};
use crate::scene::Scene;

/// The classification of a single point in a [`CutProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    Source,
    Receiver,
    BuildingWall,
    Topography,
    GroundEffect,
}

/// A single classified point along the 2D source→receiver segment.
#[derive(Debug, Clone)]
pub struct CutPoint {
    pub position: Point3,
    pub kind: CutKind,
    /// Parametric distance along the 2D segment, in `[0, 1]`.
    pub t: f64,
    /// Set for [`CutKind::BuildingWall`] points: the wall's owning
    /// building.
    pub building_id: Option<u64>,
    /// Set for [`CutKind::GroundEffect`] points: the ground factor just
    /// after the crossing (walking from source to receiver).
    pub ground_factor: Option<f64>,
}

/// The ordered classified intersection profile between a source and a
/// receiver, per the scene's `getProfile` query.
#[derive(Debug, Clone)]
pub struct CutProfile {
    pub points: Vec<CutPoint>,
}

impl CutProfile {
    /// Interpolated sight-line z at parameter `t` (straight line between
    /// the SOURCE and RECEIVER points).
    pub fn sight_line_z(&self, t: f64) -> f64 {
        let src = self.points.first().expect("profile always has a SOURCE point");
        let rcv = self.points.last().expect("profile always has a RECEIVER point");
        src.position.z + t * (rcv.position.z - src.position.z)
    }

    /// Length-weighted average ground factor between the two endpoints of
    /// a sub-segment `[t0, t1]` of the profile, derived purely from the
    /// GROUND_EFFECT crossings recorded in the profile plus the source's
    /// initial ground factor. No global state is mutated; this is a pure
    /// scan over the point sequence.
    pub fn ground_factor_between(&self, t0: f64, t1: f64, g_s: f64) -> f64 {
        if (t1 - t0).abs() < EPS_2D {
            return g_s;
        }
        let mut current_g = g_s;
        let mut last_t = t0;
        let mut weighted = 0.0;
        let mut total_len = 0.0;
        for p in &self.points {
            if p.t <= t0 + EPS_2D {
                if let Some(g) = p.ground_factor {
                    current_g = g;
                }
                continue;
            }
            if p.t >= t1 - EPS_2D {
                break;
            }
            let span = p.t - last_t;
            weighted += current_g * span;
            total_len += span;
            last_t = p.t;
            if let Some(g) = p.ground_factor {
                current_g = g;
            }
        }
        let span = t1 - last_t;
        weighted += current_g * span;
        total_len += span;
        if total_len < EPS_2D {
            g_s
        } else {
            weighted / total_len
        }
    }
}

fn merge_near(mut points: Vec<CutPoint>) -> Vec<CutPoint> {
    points.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap());
    let mut out: Vec<CutPoint> = Vec::with_capacity(points.len());
    for p in points.drain(..) {
        if let Some(last) = out.last() {
            if (p.t - last.t).abs() < EPS_2D
                && matches!(
                    (last.kind, p.kind),
                    (CutKind::Topography, CutKind::Topography)
                        | (CutKind::BuildingWall, CutKind::BuildingWall)
                        | (CutKind::GroundEffect, CutKind::GroundEffect)
                )
            {
                continue;
            }
        }
        out.push(p);
    }
    out
}

/// Builds the cut profile between `source` and `receiver`: SOURCE, every
/// BUILDING_WALL/TOPOGRAPHY/GROUND_EFFECT crossing in between sorted by
/// parametric distance, then RECEIVER.
pub fn get_profile(scene: &Scene, source: Point, receiver: Point) -> CutProfile {
    get_profile_with_gs(scene, source, receiver, 0.0)
}

pub fn get_profile_with_gs(scene: &Scene, source: Point, receiver: Point, g_s: f64) -> CutProfile {
    let probe = Segment::new(source, receiver);
    let mut points = Vec::new();

    let source_z = scene.height_at_position(source);
    points.push(CutPoint {
        position: Point3::new(source.x, source.y, source_z),
        kind: CutKind::Source,
        t: 0.0,
        building_id: None,
        ground_factor: Some(g_s),
    });

    let min = Point::new(source.x.min(receiver.x), source.y.min(receiver.y));
    let max = Point::new(source.x.max(receiver.x), source.y.max(receiver.y));

    for wall in scene.walls_in_range(min, max) {
        if let Some(hit) = segment_intersection(probe, wall.segment()) {
            let t = probe.parameter_of(hit);
            if (EPS_2D..=1.0 - EPS_2D).contains(&t) {
                points.push(CutPoint {
                    position: Point3::new(hit.x, hit.y, wall.top_z),
                    kind: CutKind::BuildingWall,
                    t,
                    building_id: Some(wall.building_id),
                    ground_factor: None,
                });
            }
        }
    }

    if let Some(terrain) = &scene.terrain {
        for crossing in terrain.crossings(source, receiver) {
            if (EPS_2D..=1.0 - EPS_2D).contains(&crossing.t) {
                points.push(CutPoint {
                    position: crossing.position,
                    kind: CutKind::Topography,
                    t: crossing.t,
                    building_id: None,
                    ground_factor: None,
                });
            }
        }
    }

    for region in scene.ground_regions_in_range(min, max) {
        for i in 0..region.polygon.len() {
            let e0 = region.polygon[i];
            let e1 = region.polygon[(i + 1) % region.polygon.len()];
            if let Some(hit) = segment_intersection(probe, Segment::new(e0, e1)) {
                let t = probe.parameter_of(hit);
                if (EPS_2D..=1.0 - EPS_2D).contains(&t) {
                    let z = source_z + t * (scene.height_at_position(receiver) - source_z);
                    points.push(CutPoint {
                        position: Point3::new(hit.x, hit.y, z),
                        kind: CutKind::GroundEffect,
                        t,
                        building_id: None,
                        ground_factor: Some(region.g),
                    });
                }
            }
        }
    }

    let receiver_z = scene.height_at_position(receiver);
    points.push(CutPoint {
        position: Point3::new(receiver.x, receiver.y, receiver_z),
        kind: CutKind::Receiver,
        t: 1.0,
        building_id: None,
        ground_factor: None,
    });

    CutProfile {
        points: merge_near(points),
    }
}

/// True iff `profile` contains no BUILDING_WALL point and every
/// TOPOGRAPHY point lies at or below the source-receiver sight line.
pub fn is_free_field(profile: &CutProfile) -> bool {
    for p in &profile.points {
        match p.kind {
            CutKind::BuildingWall => return false,
            CutKind::Topography => {
                if p.position.z > profile.sight_line_z(p.t) + 1e-6 {
                    return false;
                }
            }
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Building, SceneBuilder};

    fn empty_scene() -> Scene {
        SceneBuilder::new().finish((Point::new(-1000.0, -1000.0), Point::new(1000.0, 1000.0)))
    }

    #[test]
    fn profile_starts_with_source_and_ends_with_receiver() {
        let scene = empty_scene();
        let profile = get_profile(&scene, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(matches!(profile.points.first().unwrap().kind, CutKind::Source));
        assert!(matches!(profile.points.last().unwrap().kind, CutKind::Receiver));
    }

    #[test]
    fn free_field_profile_has_no_wall_points() {
        let scene = empty_scene();
        let profile = get_profile(&scene, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(is_free_field(&profile));
    }

    #[test]
    fn crossing_a_building_yields_wall_points_and_blocks_free_field() {
        let mut b = SceneBuilder::new();
        b.add_building(Building::new(
            0,
            vec![
                Point::new(4.0, -2.0),
                Point::new(6.0, -2.0),
                Point::new(6.0, 2.0),
                Point::new(4.0, 2.0),
            ],
            10.0,
            vec![0.2],
        ))
        .unwrap();
        let scene = b.finish((Point::new(-100.0, -100.0), Point::new(100.0, 100.0)));
        let profile = get_profile(&scene, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert!(!is_free_field(&profile));
        let wall_hits = profile
            .points
            .iter()
            .filter(|p| matches!(p.kind, CutKind::BuildingWall))
            .count();
        assert_eq!(wall_hits, 2);
    }

    #[test]
    fn is_free_field_is_symmetric() {
        let mut b = SceneBuilder::new();
        b.add_building(Building::new(
            0,
            vec![
                Point::new(4.0, -2.0),
                Point::new(6.0, -2.0),
                Point::new(6.0, 2.0),
                Point::new(4.0, 2.0),
            ],
            10.0,
            vec![0.2],
        ))
        .unwrap();
        let scene = b.finish((Point::new(-100.0, -100.0), Point::new(100.0, 100.0)));
        let a = Point::new(0.0, 0.0);
        let r = Point::new(10.0, 0.0);
        let fwd = is_free_field(&get_profile(&scene, a, r));
        let bwd = is_free_field(&get_profile(&scene, r, a));
        assert_eq!(fwd, bwd);
    }
}
