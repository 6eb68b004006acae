//! The immutable scene: buildings (and their derived walls), triangulated
//! terrain and ground absorption regions, plus the spatial indices and
//! query surface the rest of the pathfinder is built on.

pub mod builder;
pub mod building;
pub mod ground;
pub mod index;
pub mod terrain;
pub mod wall;

pub use builder::SceneBuilder;
pub use building::Building;
pub use ground::GroundRegion;
pub use terrain::Terrain;
pub use wall::Wall;

use crate::cutprofile::{self, CutProfile};
use crate::error::{PathfinderError, Result};
use crate::geometry::Point;
use index::{GroundIndex, WallIndex};

/// An immutable 2.5D scene: buildings, the walls derived from their
/// footprints, triangulated terrain, and ground absorption regions.
/// Construct with [`SceneBuilder`].
pub struct Scene {
    pub(crate) buildings: Vec<Building>,
    pub(crate) walls: Vec<Wall>,
    pub(crate) ground_regions: Vec<GroundRegion>,
    pub(crate) terrain: Option<Terrain>,
    wall_index: WallIndex,
    ground_index: GroundIndex,
    envelope: (Point, Point),
}

impl Scene {
    pub fn envelope(&self) -> (Point, Point) {
        self.envelope
    }

    pub fn contains(&self, p: Point) -> bool {
        let (min, max) = self.envelope;
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    fn check_in_range(&self, p: Point) -> Result<()> {
        if self.contains(p) {
            Ok(())
        } else {
            Err(PathfinderError::OutOfRange { x: p.x, y: p.y })
        }
    }

    /// Walls whose bounding box intersects the axis-aligned box spanned by
    /// `min`/`max`. Used by the reflection search to restrict candidate
    /// walls to those near the source-receiver segment.
    pub fn walls_in_range(&self, min: Point, max: Point) -> Vec<&Wall> {
        self.wall_index_in_range(min, max)
            .into_iter()
            .map(|i| &self.walls[i])
            .collect()
    }

    /// Same as [`Self::walls_in_range`] but returns indices into
    /// [`Self::get_processed_walls`] rather than references, for callers
    /// (the reflection search) that need to look walls up repeatedly by
    /// index while building a mirror-image tree.
    pub fn wall_index_in_range(&self, min: Point, max: Point) -> Vec<usize> {
        self.wall_index.query_box(min, max)
    }

    /// Ground regions whose bounding box intersects the axis-aligned box
    /// spanned by `min`/`max`.
    pub fn ground_regions_in_range(&self, min: Point, max: Point) -> Vec<&GroundRegion> {
        self.ground_index
            .query_box(min, max)
            .into_iter()
            .map(|i| &self.ground_regions[i])
            .collect()
    }

    /// Ids of buildings whose derived walls intersect the axis-aligned box
    /// spanned by `a`/`b`, deduplicated.
    pub fn buildings_on_path(&self, a: Point, b: Point) -> Vec<u64> {
        let min = Point::new(a.x.min(b.x), a.y.min(b.y));
        let max = Point::new(a.x.max(b.x), a.y.max(b.y));
        let mut ids: Vec<u64> = self
            .walls_in_range(min, max)
            .into_iter()
            .map(|w| w.building_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Terrain-interpolated altitude at `p`, or `0.0` if no terrain was
    /// supplied or `p` lies outside its triangulated extent (flat-ground
    /// fallback).
    pub fn height_at_position(&self, p: Point) -> f64 {
        self.terrain
            .as_ref()
            .and_then(|t| t.height_at(p))
            .unwrap_or(0.0)
    }

    /// Wide-angle corners of every building whose bounding box intersects
    /// the box spanned by `min`/`max`, candidates for the vertical-edge
    /// (side) hull.
    pub fn wide_angle_corners(&self, min: Point, max: Point) -> Vec<Point> {
        self.buildings
            .iter()
            .filter(|b| {
                let (bmin, bmax) = b.bounds();
                bmin.x <= max.x && bmax.x >= min.x && bmin.y <= max.y && bmax.y >= min.y
            })
            .flat_map(|b| b.wide_angle_corners())
            .collect()
    }

    pub fn get_building_roof_z(&self, building_id: u64) -> Option<f64> {
        self.buildings
            .iter()
            .find(|b| b.id == building_id)
            .map(|b| b.roof_z)
    }

    pub fn get_building(&self, building_id: u64) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == building_id)
    }

    pub fn get_processed_walls(&self) -> &[Wall] {
        &self.walls
    }

    /// The ground absorption factor at `p`: the `g` of the first ground
    /// region containing it, or `0.0` (hard ground) if none does.
    pub fn ground_factor_at(&self, p: Point) -> f64 {
        self.ground_regions
            .iter()
            .find(|r| r.contains(p))
            .map(|r| r.g)
            .unwrap_or(0.0)
    }

    /// The ordered classified intersection profile between `source` and
    /// `receiver`. See [`cutprofile::get_profile`].
    pub fn get_profile(&self, source: Point, receiver: Point) -> Result<CutProfile> {
        self.check_in_range(source)?;
        self.check_in_range(receiver)?;
        Ok(cutprofile::get_profile(self, source, receiver))
    }

    /// Whether `source` sees `receiver` with no intervening building wall
    /// or terrain occlusion (a direct line-of-sight check used to decide
    /// whether to emit a direct path or fall back to diffraction search).
    pub fn is_free_field(&self, source: Point, receiver: Point) -> Result<bool> {
        let profile = self.get_profile(source, receiver)?;
        Ok(cutprofile::is_free_field(&profile))
    }
}
