//! Engine configuration.

use lumina_core::defaults;

/// Configuration for grouping and resolution.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    /// Maximum Hamming distance at which two hashes count as near
    /// duplicates.
    pub max_hamming_distance: u32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            max_hamming_distance: defaults::MAX_HAMMING_DISTANCE,
        }
    }
}

impl DedupConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `LUMINA_MAX_HAMMING_DISTANCE` | `10` | Near-duplicate distance threshold |
    pub fn from_env() -> Self {
        let max_hamming_distance = std::env::var("LUMINA_MAX_HAMMING_DISTANCE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults::MAX_HAMMING_DISTANCE);

        Self {
            max_hamming_distance,
        }
    }

    /// Set the near-duplicate distance threshold.
    pub fn with_max_hamming_distance(mut self, distance: u32) -> Self {
        self.max_hamming_distance = distance;
        self
    }
}
