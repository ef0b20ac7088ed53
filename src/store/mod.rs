//! Word-Count Stores
//!
//! One store variant per role. All three hold the same container (a word
//! to occurrence-count table) but their mutation paths differ: the leader
//! ingests raw text, the networked follower merges pushed deltas, and the
//! local follower replaces its table wholesale from the leader's snapshot
//! file. Reads share the [`WordCountRead`] capability.

pub mod snapshot;

mod follower;
mod leader;
mod local;

pub use follower::FollowerStore;
pub use leader::LeaderStore;
pub use local::LocalStore;

use std::collections::HashMap;

/// Mapping from word to occurrence count. Keys are case-sensitive
/// whitespace tokens; counts only ever increase.
pub type WordCountTable = HashMap<String, u64>;

/// Shared read capability implemented by every store variant
#[async_trait::async_trait]
pub trait WordCountRead: Send + Sync {
    /// Current count for `word`, zero if absent
    async fn count(&self, word: &str) -> u64;
}
