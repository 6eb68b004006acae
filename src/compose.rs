//! The path composer dispatcher: for one source/receiver pair, decides
//! which of direct, diffracted and reflected paths to search for, and
//! applies the final z-validation discard rule.

use crate::config::PathfinderConfig;
use crate::cutprofile;
use crate::error::Result;
use crate::geometry::Point;
use crate::mirror;
use crate::path::{PointKind, PointPath, PropagationPath};
use crate::roofhull;
use crate::scene::Scene;
use crate::sidehull;

/// Computes every propagation path between `src` and `rcv` per the
/// composer dispatch rules, discarding candidates whose points violate
/// the building-roof/terrain-floor bound.
pub fn compute_paths(
    scene: &Scene,
    config: &PathfinderConfig,
    source_id: u64,
    src: Point,
    receiver_id: u64,
    rcv: Point,
    g_s: f64,
    favourable: bool,
) -> Result<Vec<PropagationPath>> {
    let profile = scene.get_profile(src, rcv)?;
    let mut paths = Vec::new();

    if cutprofile::is_free_field(&profile) {
        let src_z = scene.height_at_position(src);
        let rcv_z = scene.height_at_position(rcv);
        let g = profile.ground_factor_between(0.0, 1.0, g_s);
        let points = vec![
            PointPath::new(crate::geometry::Point3::new(src.x, src.y, src_z), PointKind::Srce),
            PointPath::new(crate::geometry::Point3::new(rcv.x, rcv.y, rcv_z), PointKind::Recv),
        ];
        paths.push(PropagationPath::new(
            source_id,
            receiver_id,
            points,
            &[g],
            favourable,
        ));
    } else if config.compute_vertical_diffraction {
        if let Some(path) = roofhull::compute_roof_path(&profile, source_id, receiver_id, g_s, favourable) {
            paths.push(path);
        }
    } else if config.compute_horizontal_diffraction {
        match sidehull::compute_side_paths(scene, src, rcv, source_id, receiver_id, g_s, favourable) {
            Ok(mut side_paths) => paths.append(&mut side_paths),
            Err(crate::error::PathfinderError::NonConvergence) => {}
            Err(e) => return Err(e),
        }
    }

    if config.reflexion_order > 0 {
        let mut reflected = mirror::compute_reflection_paths(
            scene,
            src,
            rcv,
            source_id,
            receiver_id,
            config.reflexion_order,
            config.max_ref_dist,
            config.max_src_dist,
            g_s,
            favourable,
        );
        paths.append(&mut reflected);
    }

    paths.retain(|p| path_is_within_bounds(scene, p));
    Ok(paths)
}

/// A path is discarded if any of its points lies above the roof of its
/// declared building, or below terrain at its (x, y) position.
fn path_is_within_bounds(scene: &Scene, path: &PropagationPath) -> bool {
    path.points.iter().all(|p| {
        let terrain_z = scene.height_at_position(p.position.xy());
        if p.position.z < terrain_z - 1e-6 {
            return false;
        }
        if let Some(building_id) = p.building_id {
            if let Some(roof_z) = scene.get_building_roof_z(building_id) {
                if p.position.z > roof_z + 1e-6 {
                    return false;
                }
            }
        }
        true
    })
}
