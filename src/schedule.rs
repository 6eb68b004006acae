//! Source iteration and the concurrency/scheduling layer: per-receiver
//! search envelopes, line-source discretization, descending-power
//! ordering with early stop, and the `rayon`-based batch fan-out over
//! receivers with cooperative cancellation.

use std::sync::Mutex;

use crate::compose;
use crate::config::PathfinderConfig;
use crate::error::{PathfinderError, Result};
use crate::geometry::{distance3, Point, Point3, Segment};
use crate::scene::Scene;
use crate::sink::{PathSink, ProgressVisitor};

/// A noise source: a point, a line string (e.g. a road centerline), or a
/// multi-line-string, each carrying a per-band maximum emitted power.
/// Traffic-to-emission conversion that produces `power` is out of scope
/// here; callers supply it.
#[derive(Debug, Clone)]
pub struct Source {
    pub id: u64,
    pub geometry: SourceGeometry,
    pub power: Vec<f64>,
}

#[derive(Debug, Clone)]
pub enum SourceGeometry {
    Point(Point3),
    LineString(Vec<Point3>),
    MultiLineString(Vec<Vec<Point3>>),
}

impl SourceGeometry {
    fn polylines(&self) -> Vec<Vec<Point3>> {
        match self {
            SourceGeometry::Point(p) => vec![vec![*p]],
            SourceGeometry::LineString(pts) => vec![pts.clone()],
            SourceGeometry::MultiLineString(lines) => lines.clone(),
        }
    }

    fn bounds_2d(&self) -> (Point, Point) {
        let mut min = Point::new(f64::MAX, f64::MAX);
        let mut max = Point::new(f64::MIN, f64::MIN);
        for line in self.polylines() {
            for p in line {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
            }
        }
        (min, max)
    }
}

/// One discretized point source ready for path search: a 3D position
/// with its line-density coefficient `li` (1.0 for point sources) and a
/// sorting weight (apparent power at the receiver after geometric
/// divergence).
#[derive(Debug, Clone)]
pub struct DiscretizedSource {
    pub source_id: u64,
    pub position: Point3,
    pub li: f64,
    pub weight: f64,
}

fn total_power(power: &[f64]) -> f64 {
    power.iter().copied().sum()
}

fn geometric_divergence_weight(power_sum: f64, distance: f64) -> f64 {
    let r = distance.max(1e-3);
    power_sum / (4.0 * std::f64::consts::PI * r * r)
}

/// Finds the point on segment `a->b` nearest to `target`, clamped to the
/// segment.
fn nearest_on_segment(a: Point3, b: Point3, target: Point3) -> (Point3, f64) {
    let seg = Segment::new(a.xy(), b.xy());
    let t = seg.parameter_of(target.xy()).clamp(0.0, 1.0);
    let xy = seg.point_at(t);
    let z = a.z + t * (b.z - a.z);
    let pos = Point3::new(xy.x, xy.y, z);
    (pos, distance3(pos, target))
}

/// Splits a source's geometry into discretized points per §4.6: point
/// sources pass through unchanged with `li = 1`; line sources are walked
/// outward from their nearest point to the receiver in both directions
/// with spacing `delta = max(1, d_rcv / 2)`, where `d_rcv` is the 3D
/// distance from the receiver to that nearest point.
pub fn discretize_source(source: &Source, receiver: Point3) -> Vec<DiscretizedSource> {
    let power_sum = total_power(&source.power);
    match &source.geometry {
        SourceGeometry::Point(p) => {
            let weight = geometric_divergence_weight(power_sum, distance3(*p, receiver));
            vec![DiscretizedSource {
                source_id: source.id,
                position: *p,
                li: 1.0,
                weight,
            }]
        }
        SourceGeometry::LineString(pts) => discretize_line(source.id, pts, receiver, power_sum),
        SourceGeometry::MultiLineString(lines) => lines
            .iter()
            .flat_map(|pts| discretize_line(source.id, pts, receiver, power_sum))
            .collect(),
    }
}

fn discretize_line(source_id: u64, pts: &[Point3], receiver: Point3, power_sum: f64) -> Vec<DiscretizedSource> {
    if pts.len() < 2 {
        return pts
            .first()
            .map(|&p| DiscretizedSource {
                source_id,
                position: p,
                li: 1.0,
                weight: geometric_divergence_weight(power_sum, distance3(p, receiver)),
            })
            .into_iter()
            .collect();
    }

    // Locate the segment and parametric position closest to the receiver.
    let mut best = (0usize, Point3::new(0.0, 0.0, 0.0), f64::MAX);
    for i in 0..pts.len() - 1 {
        let (pos, d) = nearest_on_segment(pts[i], pts[i + 1], receiver);
        if d < best.2 {
            best = (i, pos, d);
        }
    }
    let (anchor_seg, anchor_pos, d_rcv) = best;
    let delta = (d_rcv / 2.0).max(1.0);

    let mut positions = vec![anchor_pos];
    // Walk forward from the anchor to the end of the line.
    walk_direction(pts, anchor_seg, anchor_pos, delta, true, &mut positions);
    // Walk backward from the anchor to the start of the line.
    walk_direction(pts, anchor_seg, anchor_pos, delta, false, &mut positions);

    let n = positions.len().max(1);
    let total_len: f64 = pts.windows(2).map(|w| distance3(w[0], w[1])).sum();
    let li = if n > 1 { total_len / (n as f64 - 1.0) } else { total_len.max(1.0) };

    positions
        .into_iter()
        .map(|p| DiscretizedSource {
            source_id,
            position: p,
            li,
            weight: geometric_divergence_weight(power_sum, distance3(p, receiver)),
        })
        .collect()
}

fn walk_direction(
    pts: &[Point3],
    start_seg: usize,
    start_pos: Point3,
    delta: f64,
    forward: bool,
    out: &mut Vec<Point3>,
) {
    let mut remaining = delta;
    let mut cur = start_pos;
    let mut seg = start_seg;
    loop {
        let (seg_start, seg_end) = if forward {
            (cur, pts[seg + 1])
        } else {
            (cur, pts[seg])
        };
        let seg_len = distance3(seg_start, seg_end);
        if seg_len >= remaining {
            let t = remaining / seg_len.max(f64::EPSILON);
            let x = seg_start.x + t * (seg_end.x - seg_start.x);
            let y = seg_start.y + t * (seg_end.y - seg_start.y);
            let z = seg_start.z + t * (seg_end.z - seg_start.z);
            cur = Point3::new(x, y, z);
            out.push(cur);
            remaining = delta;
        } else {
            remaining -= seg_len;
            cur = seg_end;
            if forward {
                if seg + 1 >= pts.len() - 1 {
                    break;
                }
                seg += 1;
            } else {
                if seg == 0 {
                    break;
                }
                seg -= 1;
            }
        }
    }
}

/// Selects and orders the point sources relevant to one receiver: an
/// axis-aligned envelope of `± max_src_dist` filters candidate sources,
/// each is discretized, and the combined list is sorted by descending
/// weight with early stop once the remaining-weight bound (converted to
/// dB) falls under `maximum_error`.
pub fn select_sources_for_receiver(
    sources: &[Source],
    receiver: Point3,
    max_src_dist: f64,
    maximum_error: f64,
) -> Vec<DiscretizedSource> {
    let mut candidates: Vec<DiscretizedSource> = sources
        .iter()
        .filter(|s| within_envelope(s, receiver.xy(), max_src_dist))
        .flat_map(|s| discretize_source(s, receiver))
        .collect();

    candidates.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap());

    let mut suffix = vec![0.0; candidates.len() + 1];
    for i in (0..candidates.len()).rev() {
        suffix[i] = suffix[i + 1] + candidates[i].weight;
    }

    let mut out = Vec::with_capacity(candidates.len());
    for (i, c) in candidates.into_iter().enumerate() {
        out.push(c);
        let remaining = suffix[i + 1];
        if remaining <= 0.0 {
            continue;
        }
        let remaining_db = 10.0 * remaining.log10();
        if remaining_db < maximum_error {
            break;
        }
    }
    out
}

fn within_envelope(source: &Source, receiver: Point, max_src_dist: f64) -> bool {
    let (min, max) = source.geometry.bounds_2d();
    min.x <= receiver.x + max_src_dist
        && max.x >= receiver.x - max_src_dist
        && min.y <= receiver.y + max_src_dist
        && max.y >= receiver.y - max_src_dist
}

/// Runs the full pathfinder over every receiver, fanning out across
/// `config.thread_count` contiguous batches via `rayon`. Within a batch,
/// receivers are visited in ascending index order and, for each receiver,
/// sources in descending weight order. Cancellation is polled at the head
/// of both loops.
pub fn run<S: PathSink>(
    scene: &Scene,
    config: &PathfinderConfig,
    sources: &[Source],
    receivers: &[(u64, Point3)],
    sink: &S,
    progress: &ProgressVisitor,
) -> Result<()> {
    let batch_count = config.thread_count.max(1).min(receivers.len().max(1));
    let batch_size = receivers.len().div_ceil(batch_count.max(1)).max(1);
    let error: Mutex<Option<PathfinderError>> = Mutex::new(None);

    let error_ref = &error;
    rayon::scope(|s| {
        for (chunk_idx, batch) in receivers.chunks(batch_size).enumerate() {
            let start_idx = chunk_idx * batch_size;
            let end_idx = (start_idx + batch.len()).min(receivers.len());
            let batch_sink = sink.sub_process(start_idx, end_idx);
            s.spawn(move |_| {
                if let Err(e) = run_batch(scene, config, sources, batch, batch_sink, progress) {
                    log::warn!("receiver batch aborted: {e}");
                    let mut guard = error_ref.lock().unwrap();
                    if guard.is_none() {
                        *guard = Some(e);
                    }
                    progress.cancel();
                }
            });
        }
    });

    match error.into_inner().unwrap() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn run_batch(
    scene: &Scene,
    config: &PathfinderConfig,
    sources: &[Source],
    receivers: &[(u64, Point3)],
    sink: &dyn PathSink,
    progress: &ProgressVisitor,
) -> Result<()> {
    for &(receiver_id, receiver_pos) in receivers {
        if progress.is_cancelled() {
            return Err(PathfinderError::Cancelled);
        }
        if !scene.contains(receiver_pos.xy()) {
            sink.finalize_receiver(receiver_id)?;
            continue;
        }

        let picked = select_sources_for_receiver(sources, receiver_pos, config.max_src_dist, config.maximum_error);
        for picked_source in picked {
            if progress.is_cancelled() {
                return Err(PathfinderError::Cancelled);
            }
            if distance3(picked_source.position, receiver_pos) < config.min_rec_dist {
                continue;
            }
            let paths = compose::compute_paths(
                scene,
                config,
                picked_source.source_id,
                picked_source.position.xy(),
                receiver_id,
                receiver_pos.xy(),
                config.g_s,
                true,
            )?;
            sink.add_propagation_paths(picked_source.source_id, picked_source.li, receiver_id, paths)?;
        }
        sink.finalize_receiver(receiver_id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneBuilder;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        finalized: Arc<AtomicU64>,
    }

    impl PathSink for CountingSink {
        fn add_propagation_paths(
            &self,
            _source_id: u64,
            _li: f64,
            _receiver_id: u64,
            _paths: Vec<crate::path::PropagationPath>,
        ) -> Result<Vec<f64>> {
            Ok(Vec::new())
        }

        fn finalize_receiver(&self, _receiver_id: u64) -> Result<()> {
            self.finalized.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn point_source_discretizes_to_one_point() {
        let source = Source {
            id: 0,
            geometry: SourceGeometry::Point(Point3::new(10.0, 0.0, 0.05)),
            power: vec![80.0],
        };
        let out = discretize_source(&source, Point3::new(0.0, 0.0, 4.0));
        assert_eq!(out.len(), 1);
        assert!((out[0].li - 1.0).abs() < 1e-9);
    }

    #[test]
    fn line_source_produces_multiple_points_with_density() {
        let source = Source {
            id: 0,
            geometry: SourceGeometry::LineString(vec![
                Point3::new(0.0, -50.0, 0.05),
                Point3::new(0.0, 50.0, 0.05),
            ]),
            power: vec![80.0],
        };
        let out = discretize_source(&source, Point3::new(10.0, 0.0, 4.0));
        assert!(out.len() > 1);
        assert!(out[0].li > 0.0);
    }

    #[test]
    fn run_finalizes_every_receiver_exactly_once() {
        let scene = SceneBuilder::new().finish((Point::new(-1000.0, -1000.0), Point::new(1000.0, 1000.0)));
        let config = PathfinderConfig::default();
        let sources = vec![Source {
            id: 0,
            geometry: SourceGeometry::Point(Point3::new(10.0, 0.0, 0.05)),
            power: vec![80.0],
        }];
        let receivers: Vec<(u64, Point3)> = (0..20)
            .map(|i| (i as u64, Point3::new(0.0, i as f64, 4.0)))
            .collect();
        let finalized = Arc::new(AtomicU64::new(0));
        let sink = CountingSink {
            finalized: finalized.clone(),
        };
        let progress = ProgressVisitor::new();
        run(&scene, &config, &sources, &receivers, &sink, &progress).unwrap();
        assert_eq!(finalized.load(Ordering::SeqCst), 20);
    }
}
