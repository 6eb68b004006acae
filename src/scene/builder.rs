//! Fallible scene construction: accumulates buildings, terrain and ground
//! regions, deriving walls from building footprints, then freezes
//! everything into an immutable [`super::Scene`] together with its spatial
//! indices.

use crate::error::{PathfinderError, Result};
use crate::geometry::{signed_polygon_area, Point};

use super::building::Building;
use super::ground::GroundRegion;
use super::index::{GroundIndex, WallIndex};
use super::terrain::Terrain;
use super::wall::Wall;
use super::Scene;

#[derive(Debug, Default)]
pub struct SceneBuilder {
    buildings: Vec<Building>,
    ground_regions: Vec<GroundRegion>,
    terrain: Option<Terrain>,
    next_wall_id: u64,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a building footprint. Rejects degenerate polygons (fewer than
    /// three vertices, or zero signed area) rather than let them silently
    /// produce a zero-length wall.
    pub fn add_building(&mut self, building: Building) -> Result<()> {
        if building.footprint.len() < 3 {
            log::warn!("dropping building {}: fewer than 3 vertices", building.id);
            return Err(PathfinderError::InvalidGeometry(format!(
                "building {} footprint has fewer than 3 vertices",
                building.id
            )));
        }
        if signed_polygon_area(&building.footprint).abs() < 1e-9 {
            log::warn!("dropping building {}: zero-area footprint", building.id);
            return Err(PathfinderError::InvalidGeometry(format!(
                "building {} footprint has zero area",
                building.id
            )));
        }
        self.buildings.push(building);
        Ok(())
    }

    pub fn add_ground_region(&mut self, region: GroundRegion) -> Result<()> {
        if region.polygon.len() < 3 {
            log::warn!("dropping ground region {}: fewer than 3 vertices", region.id);
            return Err(PathfinderError::InvalidGeometry(format!(
                "ground region {} polygon has fewer than 3 vertices",
                region.id
            )));
        }
        self.ground_regions.push(region);
        Ok(())
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = Some(terrain);
    }

    /// Derives one [`Wall`] per building footprint edge, winding the
    /// footprint counter-clockwise first if it was given clockwise (the
    /// outward-normal convention depends on CCW winding).
    fn derive_walls(&mut self) -> Vec<Wall> {
        let mut walls = Vec::new();
        for building in &self.buildings {
            let mut footprint = building.footprint.clone();
            if signed_polygon_area(&footprint) < 0.0 {
                footprint.reverse();
            }
            let n = footprint.len();
            for i in 0..n {
                let p0 = footprint[i];
                let p1 = footprint[(i + 1) % n];
                let id = self.next_wall_id;
                self.next_wall_id += 1;
                walls.push(Wall::new(
                    id,
                    building.id,
                    p0,
                    p1,
                    building.roof_z,
                    building.absorption.clone(),
                ));
            }
        }
        walls
    }

    /// Freezes the builder into an immutable [`Scene`], building spatial
    /// indices over the derived walls and the ground regions. `envelope`
    /// bounds the positions `Scene` queries will accept (see
    /// `isFreeField`/`getProfile`'s out-of-range behaviour).
    pub fn finish(mut self, envelope: (Point, Point)) -> Scene {
        let walls = self.derive_walls();
        let wall_index = WallIndex::build(&walls);
        let ground_index = GroundIndex::build(&self.ground_regions);
        Scene {
            buildings: self.buildings,
            walls,
            ground_regions: self.ground_regions,
            terrain: self.terrain,
            wall_index,
            ground_index,
            envelope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_building(id: u64) -> Building {
        Building::new(
            id,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            12.0,
            vec![0.2],
        )
    }

    #[test]
    fn rejects_degenerate_footprint() {
        let mut b = SceneBuilder::new();
        let bad = Building::new(0, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)], 1.0, vec![]);
        assert!(b.add_building(bad).is_err());
    }

    #[test]
    fn derives_four_walls_from_square() {
        let mut b = SceneBuilder::new();
        b.add_building(square_building(0)).unwrap();
        let scene = b.finish((Point::new(-50.0, -50.0), Point::new(50.0, 50.0)));
        assert_eq!(scene.walls.len(), 4);
    }

    #[test]
    fn clockwise_footprint_is_rewound() {
        let mut b = SceneBuilder::new();
        let cw = Building::new(
            0,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
            ],
            12.0,
            vec![0.2],
        );
        b.add_building(cw).unwrap();
        let scene = b.finish((Point::new(-50.0, -50.0), Point::new(50.0, 50.0)));
        // After rewinding CCW, every wall's outward normal should point away
        // from the footprint centroid.
        let centroid = Point::new(5.0, 5.0);
        for w in &scene.walls {
            let mid = Point::new((w.p0.x + w.p1.x) / 2.0, (w.p0.y + w.p1.y) / 2.0);
            let (nx, ny) = w.outward_normal();
            let to_centroid = (centroid.x - mid.x, centroid.y - mid.y);
            let dot = nx * to_centroid.0 + ny * to_centroid.1;
            assert!(dot < 0.0);
        }
    }
}
