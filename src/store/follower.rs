//! Networked Follower Store
//!
//! Populated once by a full sync at startup, then mutated only by
//! additive delta merges. Never reads local disk.

use tokio::sync::RwLock;

use crate::store::{WordCountRead, WordCountTable};

/// Follower-side word-count store
pub struct FollowerStore {
    table: RwLock<WordCountTable>,
}

impl FollowerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            table: RwLock::new(WordCountTable::new()),
        }
    }

    /// Add each entry's increment to the local counts. Deltas are not
    /// deduplicated: applying the same delta twice double-counts.
    pub async fn apply(&self, delta: &WordCountTable) {
        let mut table = self.table.write().await;

        for (word, increment) in delta {
            *table.entry(word.clone()).or_insert(0) += increment;
        }
    }

    /// Replace the entire table, used by the startup full sync
    pub async fn replace(&self, table: WordCountTable) {
        *self.table.write().await = table;
    }
}

impl Default for FollowerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WordCountRead for FollowerStore {
    async fn count(&self, word: &str) -> u64 {
        self.table.read().await.get(word).copied().unwrap_or(0)
    }
}
