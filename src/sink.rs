//! The abstract receiver of propagation paths, implemented externally
//! (typically the acoustic evaluator). The pathfinder core never persists
//! paths itself; it only hands them off.

use crate::error::Result;
use crate::path::PropagationPath;

/// Destination for computed propagation paths. Implementations must be
/// safe to call concurrently: multiple worker batches may call
/// `add_propagation_paths` for different receivers at the same time.
pub trait PathSink: Send + Sync {
    /// Records the paths found for one (source, receiver) pair, weighted
    /// by the source's line-density coefficient `li`. Returns the
    /// resulting per-frequency-band attenuation, if the sink computes one
    /// eagerly; implementations that only buffer paths may return an
    /// empty vector.
    fn add_propagation_paths(
        &self,
        source_id: u64,
        li: f64,
        receiver_id: u64,
        paths: Vec<PropagationPath>,
    ) -> Result<Vec<f64>>;

    /// Called exactly once per receiver once every source contributing to
    /// it has been processed (or the scan stopped early via
    /// `maximum_error`).
    fn finalize_receiver(&self, receiver_id: u64) -> Result<()>;

    /// Returns the sink a worker batch covering receiver indices
    /// `[start_idx, end_idx)` should report through. The default is an
    /// identity passthrough (every batch shares the same sink); a sink
    /// that partitions its storage per batch (e.g. one writer per shard)
    /// overrides this to hand back a scoped sub-sink instead.
    fn sub_process(&self, start_idx: usize, end_idx: usize) -> &dyn PathSink {
        let _ = (start_idx, end_idx);
        self
    }
}

/// Cooperative cancellation flag, polled at receiver-loop and source-loop
/// heads. Cloning shares the same underlying flag.
#[derive(Clone, Default)]
pub struct ProgressVisitor {
    cancelled: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl ProgressVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, std::sync::atomic::Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_visible_through_clones() {
        let visitor = ProgressVisitor::new();
        let clone = visitor.clone();
        assert!(!clone.is_cancelled());
        visitor.cancel();
        assert!(clone.is_cancelled());
    }
}
