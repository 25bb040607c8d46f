/// Sync service configuration.
///
/// Bounds on the pending pool and the peer knowledge table. Every bound is
/// optional and unset by default, which leaves the structure unbounded;
/// deployments pick their limits in the node config file.
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum buffered orphans; the oldest received are evicted first.
    pub max_pending_blocks: Option<usize>,

    /// Buffered orphans older than this are evicted.
    pub max_pending_age_secs: Option<u64>,

    /// Buffered orphans at or below `best - max_depth_below_best` are released.
    pub max_depth_below_best: Option<u64>,

    /// Orphans numbered above `best + max_distance_ahead` are dropped unbuffered.
    pub max_distance_ahead: Option<u64>,

    /// Maximum block hashes tracked in peer knowledge (least recently announced evicted).
    pub max_known_blocks: Option<usize>,
}

impl SyncConfig {
    pub fn max_pending_age(&self) -> Option<Duration> {
        self.max_pending_age_secs.map(Duration::from_secs)
    }
}
