use sound_paths::scene::{Building, SceneBuilder, Terrain};
use sound_paths::geometry::Point3;
use sound_paths::{compute_paths, PathfinderConfig, PointKind};

mod common;
use common::pt;

#[test]
fn roof_diffraction_path_clears_the_roof_on_both_sides() {
    let flat_at_2m = Terrain::from_points(vec![
        Point3::new(-100.0, -100.0, 2.0),
        Point3::new(100.0, -100.0, 2.0),
        Point3::new(100.0, 100.0, 2.0),
        Point3::new(-100.0, 100.0, 2.0),
    ]);

    let mut builder = SceneBuilder::new();
    builder.set_terrain(flat_at_2m);
    builder
        .add_building(Building::new(
            0,
            vec![pt(10.0, -5.0), pt(20.0, -5.0), pt(20.0, 5.0), pt(10.0, 5.0)],
            6.0,
            vec![0.2],
        ))
        .unwrap();
    let scene = builder.finish((pt(-100.0, -100.0), pt(100.0, 100.0)));

    let config = PathfinderConfig::default();
    let paths = compute_paths(&scene, &config, 0, pt(0.0, 0.0), 0, pt(30.0, 0.0), 0.0, true).unwrap();

    let roof_path = paths
        .iter()
        .find(|p| p.points.iter().any(|pt| matches!(pt.kind, PointKind::Difh)))
        .expect("expected a roof-diffraction path over the building");

    for pt in roof_path.points.iter().filter(|pt| matches!(pt.kind, PointKind::Difh)) {
        assert!((pt.position.z - 6.0).abs() < 1e-2, "DIFH point should sit at roof altitude");
    }
}
