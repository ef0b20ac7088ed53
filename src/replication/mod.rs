//! Replication
//!
//! Leader-side delta push fan-out and follower-side startup full sync.
//! Delivery is best-effort: pushes are never retried, failures are logged
//! and invisible to the ingesting client, and a follower that misses a
//! delta stays behind until its next startup resync.

mod push;
mod resync;

pub use push::Replicator;
pub use resync::sync_from_leader;

use std::time::Duration;

/// Configuration for replication
#[derive(Debug, Clone)]
pub struct ReplicationConfig {
    /// Number of push completions to await before a replication round
    /// returns; the rest run detached (0 = fully fire-and-forget)
    pub ack_wait: usize,
    /// Per-push request timeout
    pub push_timeout: Duration,
    /// Poll interval for the startup liveness probe
    pub resync_poll_interval: Duration,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            ack_wait: 1,
            push_timeout: Duration::from_secs(5),
            resync_poll_interval: Duration::from_secs(2),
        }
    }
}
