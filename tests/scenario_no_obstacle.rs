use sound_paths::{compute_paths, PathfinderConfig, PointKind, SceneBuilder};

mod common;
use common::pt;

#[test]
fn direct_path_with_no_buildings() {
    let scene = SceneBuilder::new().finish((pt(-1000.0, -1000.0), pt(1000.0, 1000.0)));
    let config = PathfinderConfig::default();

    let paths = compute_paths(&scene, &config, 0, pt(10.0, 0.0), 0, pt(0.0, 0.0), 0.0, true).unwrap();

    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].points.len(), 2);
    assert!(matches!(paths[0].points[0].kind, PointKind::Srce));
    assert!(matches!(paths[0].points[1].kind, PointKind::Recv));
}
