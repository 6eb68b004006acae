use sound_paths::{compute_paths, PathfinderConfig, PointKind};
use sound_paths::scene::{Building, SceneBuilder};

mod common;
use common::pt;

fn two_building_scene() -> sound_paths::Scene {
    let mut builder = SceneBuilder::new();
    builder
        .add_building(Building::new(
            0,
            vec![pt(2.0, 1.0), pt(6.0, 1.0), pt(6.0, 3.0), pt(2.0, 3.0)],
            10.0,
            vec![0.1],
        ))
        .unwrap();
    builder
        .add_building(Building::new(
            1,
            vec![pt(3.0, 5.0), pt(7.0, 5.0), pt(7.0, 7.0), pt(3.0, 7.0)],
            10.0,
            vec![0.1],
        ))
        .unwrap();
    builder.finish((pt(-100.0, -100.0), pt(100.0, 100.0)))
}

#[test]
fn single_reflection_emits_a_refl_point_near_building_a() {
    let scene = two_building_scene();
    let mut config = PathfinderConfig::default();
    config.reflexion_order = 1;

    let paths = compute_paths(&scene, &config, 0, pt(9.0, 4.0), 0, pt(0.0, 4.0), 0.0, true).unwrap();

    let has_reflection = paths.iter().any(|p| {
        p.points.iter().any(|pt| {
            matches!(pt.kind, PointKind::Refl) && pt.position.x >= 2.0 - 1e-6 && pt.position.x <= 6.0 + 1e-6
        })
    });
    assert!(has_reflection, "expected at least one reflection off building A's wall");
}

#[test]
fn order_two_reflection_uses_two_distinct_buildings() {
    let scene = two_building_scene();
    let mut config = PathfinderConfig::default();
    config.reflexion_order = 2;

    let paths = compute_paths(&scene, &config, 0, pt(9.0, 4.0), 0, pt(0.0, 4.0), 0.0, true).unwrap();

    let four_point_paths: Vec<_> = paths.iter().filter(|p| p.points.len() == 4).collect();
    for p in &four_point_paths {
        let building_ids: Vec<u64> = p
            .points
            .iter()
            .filter_map(|pt| pt.building_id)
            .collect();
        if building_ids.len() == 2 {
            assert_ne!(building_ids[0], building_ids[1]);
        }
    }
}
