//! The closed set of configuration parameters accepted by the pathfinder.

/// Configuration for a propagation-path computation run.
///
/// This mirrors the closed parameter set the acoustic evaluator and the
/// scheduler agree on; every field here is read-only once a computation
/// starts (the scene and this config are both shared by borrow across
/// worker threads).
#[derive(Debug, Clone, PartialEq)]
pub struct PathfinderConfig {
    /// Maximum order of specular reflections to search for (0 disables
    /// reflection search entirely).
    pub reflexion_order: u32,
    /// Maximum order of diffraction to consider (currently only order 1 is
    /// implemented by the horizontal/vertical edge searches).
    pub diffraction_order: u32,
    /// Whether to search vertical-edge (around-corner) diffraction paths.
    pub compute_horizontal_diffraction: bool,
    /// Whether to search horizontal-edge (over-roof) diffraction paths.
    pub compute_vertical_diffraction: bool,
    /// Maximum source-to-receiver distance considered, in metres.
    pub max_src_dist: f64,
    /// Maximum distance from a wall to the source-receiver segment for the
    /// wall to be considered in the reflection search, in metres.
    pub max_ref_dist: f64,
    /// Receivers closer than this to a source are skipped (degenerate near
    /// field), in metres.
    pub min_rec_dist: f64,
    /// Default ground absorption factor attached at the source point of a
    /// cut profile, in `[0, 1]`.
    pub g_s: f64,
    /// Early-stop threshold, in dB, for source iteration: once the bound on
    /// remaining unvisited sources' contribution falls below this, the
    /// scan for that receiver stops.
    pub maximum_error: f64,
    /// Number of worker batches the receiver list is partitioned into.
    pub thread_count: usize,
    /// Center frequencies, in Hz, of the bands absorption spectra are
    /// indexed by.
    pub freq_lvl: Vec<f64>,
    /// Air temperature, degrees Celsius.
    pub temperature: f64,
    /// Atmospheric pressure, Pa.
    pub pressure: f64,
    /// Relative humidity, percent, in `[0, 100]`.
    pub humidity: f64,
    /// Speed of sound, m/s.
    pub celerity: f64,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            reflexion_order: 1,
            diffraction_order: 1,
            compute_horizontal_diffraction: true,
            compute_vertical_diffraction: true,
            max_src_dist: 150.0,
            max_ref_dist: 50.0,
            min_rec_dist: 1.0,
            g_s: 0.0,
            maximum_error: 0.1,
            thread_count: 1,
            freq_lvl: vec![
                63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0,
            ],
            temperature: 15.0,
            pressure: 101_325.0,
            humidity: 70.0,
            celerity: 340.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_internally_consistent() {
        let cfg = PathfinderConfig::default();
        assert!(cfg.max_ref_dist <= cfg.max_src_dist);
        assert!((0.0..=1.0).contains(&cfg.g_s));
        assert!(!cfg.freq_lvl.is_empty());
    }
}
