use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sound_paths::geometry::Point3;
use sound_paths::scene::SceneBuilder;
use sound_paths::{run, PathSink, PathfinderConfig, ProgressVisitor, PropagationPath, Source, SourceGeometry};

mod common;
use common::pt;

struct CountingSink {
    finalized: Arc<AtomicU64>,
}

impl PathSink for CountingSink {
    fn add_propagation_paths(
        &self,
        _source_id: u64,
        _li: f64,
        _receiver_id: u64,
        _paths: Vec<PropagationPath>,
    ) -> sound_paths::error::Result<Vec<f64>> {
        Ok(Vec::new())
    }

    fn finalize_receiver(&self, _receiver_id: u64) -> sound_paths::error::Result<()> {
        self.finalized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn cancelling_before_the_run_starts_stops_every_batch_promptly() {
    let scene = SceneBuilder::new().finish((pt(-10_000.0, -10_000.0), pt(10_000.0, 10_000.0)));
    let mut config = PathfinderConfig::default();
    config.reflexion_order = 2;
    config.thread_count = 4;

    let sources = vec![Source {
        id: 0,
        geometry: SourceGeometry::Point(Point3::new(10.0, 0.0, 0.05)),
        power: vec![80.0],
    }];
    let receivers: Vec<(u64, Point3)> = (0..1000).map(|i| (i as u64, Point3::new(0.0, i as f64, 4.0))).collect();

    let finalized = Arc::new(AtomicU64::new(0));
    let sink = CountingSink {
        finalized: finalized.clone(),
    };
    let progress = ProgressVisitor::new();
    progress.cancel();

    let result = run(&scene, &config, &sources, &receivers, &sink, &progress);
    assert!(result.is_err(), "a pre-cancelled run must report Cancelled");
    assert!(finalized.load(Ordering::SeqCst) < receivers.len() as u64);
}
