//! Filesystem-Derived Follower Store
//!
//! Mirrors the leader through the shared snapshot file alone: no leader
//! address, no network calls. Each refresh replaces the whole table from
//! the file; between refreshes it serves the last successful read.

use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::store::{snapshot, WordCountRead, WordCountTable};

/// Local (filesystem-derived) word-count store
pub struct LocalStore {
    data_dir: PathBuf,
    table: RwLock<WordCountTable>,
}

impl LocalStore {
    /// Create an empty store over the leader's shared data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            table: RwLock::new(WordCountTable::new()),
        }
    }

    /// Re-read the snapshot file and replace the table wholesale. On
    /// failure the previous table stays in place.
    pub async fn refresh(&self) -> Result<()> {
        let table = snapshot::load(&self.data_dir).await?.ok_or_else(|| {
            Error::Snapshot(format!(
                "no snapshot file under {}",
                self.data_dir.display()
            ))
        })?;

        *self.table.write().await = table;

        Ok(())
    }
}

#[async_trait::async_trait]
impl WordCountRead for LocalStore {
    async fn count(&self, word: &str) -> u64 {
        self.table.read().await.get(word).copied().unwrap_or(0)
    }
}
