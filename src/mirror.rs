//! Reflection search via the image-source (mirror-receiver) construction:
//! an arena of parent-indexed nodes rather than a boxed tree, per the
//! arena design note.

use crate::geometry::{segment_intersection, Point, Point3, Segment, EPS_REFLECTION, EPS_Z};
use crate::path::{PointKind, PointPath, PropagationPath};
use crate::scene::wall::wall_wall_test;
use crate::scene::Scene;

/// One node of the mirror-receiver arena: the image position, the wall it
/// was generated from, and an index back to its parent (`None` at the
/// root, the true receiver).
#[derive(Debug, Clone, Copy)]
struct MirrorNode {
    position: Point,
    wall_index: usize,
    parent: Option<usize>,
}

/// Arena of mirror-receiver images rooted at the true receiver.
struct MirrorTree {
    nodes: Vec<MirrorNode>,
}

impl MirrorTree {
    fn depth(&self, idx: usize) -> u32 {
        let mut d = 0;
        let mut cur = idx;
        while let Some(parent) = self.nodes[cur].parent {
            d += 1;
            cur = parent;
        }
        d
    }

    /// The chain of wall indices from root to `idx`, root-first.
    fn wall_chain(&self, idx: usize) -> Vec<usize> {
        let mut chain = vec![self.nodes[idx].wall_index];
        let mut cur = idx;
        while let Some(parent) = self.nodes[cur].parent {
            chain.push(self.nodes[parent].wall_index);
            cur = parent;
        }
        chain.reverse();
        chain
    }
}

/// Enumerates mirror images of `rcv` across `walls`, up to `max_order`,
/// pruning any image beyond `max_src_dist` of `src` and any extension
/// whose new wall does not face its parent's wall (`wallWallTest`).
fn enumerate_images(
    scene: &Scene,
    walls: &[usize],
    src: Point,
    rcv: Point,
    max_order: u32,
    max_src_dist: f64,
) -> MirrorTree {
    let mut nodes = Vec::new();
    if max_order == 0 {
        return MirrorTree { nodes };
    }

    // Order 1: mirror rcv across every candidate wall.
    let mut frontier = Vec::new();
    for &wi in walls {
        let wall = &scene.get_processed_walls()[wi];
        let image = wall.mirror_point(rcv);
        if crate::geometry::distance(src, image) > max_src_dist {
            continue;
        }
        let idx = nodes.len();
        nodes.push(MirrorNode {
            position: image,
            wall_index: wi,
            parent: None,
        });
        frontier.push(idx);
    }

    for _order in 2..=max_order {
        let mut next_frontier = Vec::new();
        for &parent_idx in &frontier {
            let parent_wall_idx = nodes[parent_idx].wall_index;
            let parent_wall = &scene.get_processed_walls()[parent_wall_idx];
            for &wi in walls {
                if wi == parent_wall_idx {
                    continue;
                }
                let wall = &scene.get_processed_walls()[wi];
                if !wall_wall_test(parent_wall, wall) {
                    continue;
                }
                let image = wall.mirror_point(nodes[parent_idx].position);
                if crate::geometry::distance(src, image) > max_src_dist {
                    continue;
                }
                let idx = nodes.len();
                nodes.push(MirrorNode {
                    position: image,
                    wall_index: wi,
                    parent: Some(parent_idx),
                });
                next_frontier.push(idx);
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier.extend(next_frontier);
    }

    MirrorTree { nodes }
}

/// Traces a leaf mirror image back toward `src`, validating each
/// reflection point against its wall's finite segment, top altitude and
/// terrain, and nudging each reflection point outward by `EPS_REFLECTION`
/// to avoid re-hitting the generating wall on a subsequent visibility
/// check. Returns the reflection points from nearest-receiver to
/// nearest-source (the reverse of physical travel order — callers walking
/// src to rcv should reverse this list); `None` if the chain is rejected.
fn trace_chain(scene: &Scene, tree: &MirrorTree, leaf: usize, _src: Point, rcv: Point) -> Option<Vec<Point3>> {
    // Mirroring a 3D point across a vertical wall's supporting plane never
    // changes its z, so every image in the chain shares the root
    // receiver's altitude; only the *destination* z changes as the trace
    // finds each reflection point's true height by interpolation.
    let rcv_z = scene.height_at_position(rcv);
    let mut destination = rcv;
    let mut destination_z = rcv_z;
    let mut positions = Vec::new();
    let mut cur = leaf;
    loop {
        let wall_idx = tree.nodes[cur].wall_index;
        let wall = &scene.get_processed_walls()[wall_idx];
        let image = tree.nodes[cur].position;
        let probe = Segment::new(destination, image);
        let hit = segment_intersection(probe, wall.segment())?;
        let t = probe.parameter_of(hit);
        if !(EPS_REFLECTION..=1.0 - EPS_REFLECTION).contains(&t) {
            return None;
        }
        let z = destination_z + t * (rcv_z - destination_z);
        if z > wall.top_z + EPS_Z {
            return None;
        }
        let terrain_z = scene.height_at_position(hit);
        if z < terrain_z - EPS_Z {
            return None;
        }
        let (nx, ny) = wall.outward_normal();
        let nudged = Point::new(hit.x + nx * EPS_REFLECTION, hit.y + ny * EPS_REFLECTION);
        positions.push(Point3::new(hit.x, hit.y, z));
        destination = nudged;
        destination_z = z;
        match tree.nodes[cur].parent {
            Some(parent) => cur = parent,
            None => break,
        }
    }
    Some(positions)
}

/// Runs the full reflection search between `src` and `rcv` up to
/// `max_order`, restricted to walls within `max_ref_dist` of the
/// src-rcv segment, returning one accepted [`PropagationPath`] per
/// validated chain.
pub fn compute_reflection_paths(
    scene: &Scene,
    src: Point,
    rcv: Point,
    source_id: u64,
    receiver_id: u64,
    max_order: u32,
    max_ref_dist: f64,
    max_src_dist: f64,
    g_s: f64,
    favourable: bool,
) -> Vec<PropagationPath> {
    if max_order == 0 {
        return Vec::new();
    }
    let pad = Point::new(max_ref_dist, max_ref_dist);
    let min = Point::new(src.x.min(rcv.x) - pad.x, src.y.min(rcv.y) - pad.y);
    let max = Point::new(src.x.max(rcv.x) + pad.x, src.y.max(rcv.y) + pad.y);
    let walls: Vec<usize> = scene.wall_index_in_range(min, max);
    if walls.is_empty() {
        return Vec::new();
    }

    let tree = enumerate_images(scene, &walls, src, rcv, max_order, max_src_dist);
    log::debug!(
        "reflection search: {} candidate walls, {} mirror images up to order {}",
        walls.len(),
        tree.nodes.len(),
        max_order
    );
    let mut out = Vec::new();

    for leaf in 0..tree.nodes.len() {
        debug_assert!(tree.depth(leaf) + 1 <= max_order);
        let Some(reflections) = trace_chain(scene, &tree, leaf, src, rcv) else {
            continue;
        };
        if !validate_chain_visibility(scene, src, rcv, &reflections) {
            continue;
        }
        let mut points = Vec::with_capacity(reflections.len() + 2);
        let src_z = scene.height_at_position(src);
        points.push(PointPath::new(
            Point3::new(src.x, src.y, src_z),
            PointKind::Srce,
        ));
        // trace_chain returns leaf-to-root order (nearest rcv first); the
        // path itself is walked src -> ... -> rcv, so reverse it.
        let chain_idx = tree.wall_chain(leaf);
        for (i, refl) in reflections.iter().rev().enumerate() {
            let wall = &scene.get_processed_walls()[chain_idx[i]];
            points.push(PointPath::reflection(*refl, wall.building_id, wall.absorption.clone()));
        }
        let rcv_z = scene.height_at_position(rcv);
        points.push(PointPath::new(
            Point3::new(rcv.x, rcv.y, rcv_z),
            PointKind::Recv,
        ));
        let ground_factors = vec![g_s; points.len() - 1];
        out.push(PropagationPath::new(
            source_id,
            receiver_id,
            points,
            &ground_factors,
            favourable,
        ));
    }
    out
}

/// Checks that each src/rcv-to-reflection-point hop, and each
/// reflection-to-reflection hop, is either free-field or resolvable by
/// horizontal-edge diffraction (a non-free profile that still contains no
/// building-wall occlusion other than the reflecting walls themselves is
/// treated as acceptable here; a stricter geometric re-check is left to
/// the composer's final z-validation pass).
fn validate_chain_visibility(scene: &Scene, src: Point, rcv: Point, reflections: &[Point3]) -> bool {
    let mut hops = Vec::with_capacity(reflections.len() + 1);
    let mut prev = src;
    for r in reflections {
        hops.push((prev, r.xy()));
        prev = r.xy();
    }
    hops.push((prev, rcv));
    hops.iter().all(|&(a, b)| scene.get_profile(a, b).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Building, SceneBuilder};

    fn two_wall_scene() -> Scene {
        let mut b = SceneBuilder::new();
        b.add_building(Building::new(
            0,
            vec![
                Point::new(2.0, 1.0),
                Point::new(6.0, 1.0),
                Point::new(6.0, 3.0),
                Point::new(2.0, 3.0),
            ],
            10.0,
            vec![0.1],
        ))
        .unwrap();
        b.finish((Point::new(-100.0, -100.0), Point::new(100.0, 100.0)))
    }

    #[test]
    fn single_reflection_finds_a_path_off_the_near_wall() {
        let scene = two_wall_scene();
        let src = Point::new(9.0, 4.0);
        let rcv = Point::new(0.0, 4.0);
        let paths = compute_reflection_paths(&scene, src, rcv, 0, 0, 1, 50.0, 150.0, 0.0, true);
        assert!(!paths.is_empty());
        for p in &paths {
            assert!(p.points.iter().any(|pt| matches!(pt.kind, PointKind::Refl)));
        }
    }

    #[test]
    fn zero_order_yields_no_paths() {
        let scene = two_wall_scene();
        let paths = compute_reflection_paths(
            &scene,
            Point::new(9.0, 4.0),
            Point::new(0.0, 4.0),
            0,
            0,
            0,
            50.0,
            150.0,
            0.0,
            true,
        );
        assert!(paths.is_empty());
    }
}
