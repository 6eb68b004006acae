use sound_paths::scene::{Building, SceneBuilder};
use sound_paths::{compute_paths, PathfinderConfig, PointKind};

mod common;
use common::pt;

fn single_building_scene() -> sound_paths::Scene {
    let mut builder = SceneBuilder::new();
    builder
        .add_building(Building::new(
            0,
            vec![pt(4.0, -2.0), pt(6.0, -2.0), pt(6.0, 2.0), pt(4.0, 2.0)],
            10.0,
            vec![0.2],
        ))
        .unwrap();
    builder.finish((pt(-100.0, -100.0), pt(100.0, 100.0)))
}

#[test]
fn every_path_starts_at_srce_and_ends_at_recv_with_matching_ids() {
    let scene = single_building_scene();
    let config = PathfinderConfig::default();
    let paths = compute_paths(&scene, &config, 7, pt(0.0, 0.0), 9, pt(10.0, 0.0), 0.0, true).unwrap();

    for p in &paths {
        assert!(matches!(p.points.first().unwrap().kind, PointKind::Srce));
        assert!(matches!(p.points.last().unwrap().kind, PointKind::Recv));
        assert_eq!(p.segments.len(), p.points.len() - 1);
        assert_eq!(p.source_id, 7);
        assert_eq!(p.receiver_id, 9);
    }
}

#[test]
fn is_free_field_is_symmetric_with_an_obstacle() {
    let scene = single_building_scene();
    let a = pt(0.0, 0.0);
    let b = pt(10.0, 0.0);
    assert_eq!(scene.is_free_field(a, b).unwrap(), scene.is_free_field(b, a).unwrap());
}

#[test]
fn free_field_case_has_no_reflections_without_reflection_order() {
    let scene = SceneBuilder::new().finish((pt(-1000.0, -1000.0), pt(1000.0, 1000.0)));
    let config = PathfinderConfig::default();
    let paths = compute_paths(&scene, &config, 0, pt(0.0, 0.0), 0, pt(10.0, 0.0), 0.0, true).unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].points.len(), 2);
}
