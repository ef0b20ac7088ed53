//! countdb - Distributed Word-Count Store
//!
//! A minimal distributed word-count store with a single leader and
//! multiple followers. The leader ingests text, owns the source-of-truth
//! word-count table, persists it to a durable snapshot, and pushes
//! incremental deltas to registered followers. Followers mirror the
//! leader's table either over the network (startup full sync plus pushed
//! deltas) or by re-reading the leader's snapshot file from a shared
//! filesystem.
//!
//! # Architecture
//!
//! Replication is asynchronous and best-effort: the leader acknowledges
//! an ingest as soon as its own table is mutated, before any delta is
//! delivered. A follower may lag the leader, and a follower whose pushes
//! all fail stays stale until its next startup resync. This trades
//! delivery guarantees for ingest latency and availability.

pub mod api;
pub mod config;
pub mod error;
pub mod replication;
pub mod store;

pub use config::CountdbConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::CountdbConfig;
    pub use crate::error::{Error, Result};
    pub use crate::replication::{ReplicationConfig, Replicator};
    pub use crate::store::{FollowerStore, LeaderStore, LocalStore, WordCountRead, WordCountTable};
}
