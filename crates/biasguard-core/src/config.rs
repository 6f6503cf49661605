//! Detector configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One hour.
pub const DEFAULT_TERM_CACHE_TTL_SECS: u64 = 3600;

/// Settings for a [`BiasDetector`](crate::BiasDetector).
///
/// Deserialisable so a host can embed it in its own configuration file;
/// missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// How long a loaded term library is served before reloading from the store.
    #[serde(default = "default_ttl")]
    pub term_cache_ttl_secs: u64,
}

fn default_ttl() -> u64 {
    DEFAULT_TERM_CACHE_TTL_SECS
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            term_cache_ttl_secs: DEFAULT_TERM_CACHE_TTL_SECS,
        }
    }
}

impl DetectorConfig {
    pub fn term_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.term_cache_ttl_secs)
    }
}
