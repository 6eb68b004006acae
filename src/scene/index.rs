//! R-tree spatial indices over walls and ground regions, used to prune the
//! cut-profile query and the reflection search to geometry actually near
//! the source-receiver segment.

use rstar::{RTree, RTreeObject, AABB};

use super::ground::GroundRegion;
use super::wall::Wall;
use crate::geometry::Point;

/// Indexed wall entry: the envelope is the wall segment's own bounding box,
/// the payload is the wall's index into the owning scene's wall list.
struct WallEntry {
    envelope: AABB<[f64; 2]>,
    index: usize,
}

impl RTreeObject for WallEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

struct GroundEntry {
    envelope: AABB<[f64; 2]>,
    index: usize,
}

impl RTreeObject for GroundEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index over a scene's walls, queried by the bounding envelope of
/// a source-receiver segment.
pub struct WallIndex {
    tree: RTree<WallEntry>,
}

impl WallIndex {
    pub fn build(walls: &[Wall]) -> Self {
        let entries = walls
            .iter()
            .enumerate()
            .map(|(index, w)| WallEntry {
                envelope: AABB::from_corners(
                    [w.p0.x.min(w.p1.x), w.p0.y.min(w.p1.y)],
                    [w.p0.x.max(w.p1.x), w.p0.y.max(w.p1.y)],
                ),
                index,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Indices of walls whose bounding box intersects the axis-aligned box
    /// `(min, max)`.
    pub fn query_box(&self, min: Point, max: Point) -> Vec<usize> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.index)
            .collect()
    }
}

/// Spatial index over a scene's ground regions.
pub struct GroundIndex {
    tree: RTree<GroundEntry>,
}

impl GroundIndex {
    pub fn build(regions: &[GroundRegion]) -> Self {
        let entries = regions
            .iter()
            .enumerate()
            .map(|(index, r)| {
                let (min, max) = r.bounds();
                GroundEntry {
                    envelope: AABB::from_corners([min.x, min.y], [max.x, max.y]),
                    index,
                }
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn query_box(&self, min: Point, max: Point) -> Vec<usize> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_index_finds_wall_in_query_box() {
        let walls = vec![Wall::new(
            0,
            0,
            Point::new(5.0, -1.0),
            Point::new(5.0, 1.0),
            10.0,
            vec![],
        )];
        let idx = WallIndex::build(&walls);
        let hits = idx.query_box(Point::new(0.0, -2.0), Point::new(10.0, 2.0));
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn wall_index_empty_box_misses() {
        let walls = vec![Wall::new(
            0,
            0,
            Point::new(5.0, -1.0),
            Point::new(5.0, 1.0),
            10.0,
            vec![],
        )];
        let idx = WallIndex::build(&walls);
        let hits = idx.query_box(Point::new(100.0, 100.0), Point::new(101.0, 101.0));
        assert!(hits.is_empty());
    }
}
