use sound_paths::scene::{Building, SceneBuilder};
use sound_paths::sidehull::compute_side_paths;
use sound_paths::PointKind;

mod common;
use common::pt;

#[test]
fn side_hull_paths_traverse_the_near_corners_and_are_symmetric() {
    let mut builder = SceneBuilder::new();
    builder
        .add_building(Building::new(
            0,
            vec![pt(10.0, -5.0), pt(20.0, -5.0), pt(20.0, 5.0), pt(10.0, 5.0)],
            8.0,
            vec![0.2],
        ))
        .unwrap();
    let scene = builder.finish((pt(-100.0, -100.0), pt(100.0, 100.0)));

    let src = pt(0.0, 0.0);
    let rcv = pt(30.0, 0.0);
    let paths = compute_side_paths(&scene, src, rcv, 0, 0, 0.0, true).unwrap();

    assert_eq!(paths.len(), 2);
    for p in &paths {
        let has_difv = p.points.iter().any(|pt| matches!(pt.kind, PointKind::Difv));
        assert!(has_difv);
    }
    let lengths: Vec<f64> = paths.iter().map(|p| p.total_length()).collect();
    assert!((lengths[0] - lengths[1]).abs() < 1e-3, "left/right side hull lengths should be symmetric");
}
