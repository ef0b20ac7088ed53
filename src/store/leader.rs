//! Leader Store
//!
//! The single source of truth. Owns the word-count table exclusively,
//! tracks whether it has changed since the last successful snapshot, and
//! drives the periodic snapshot loop. Table and dirty flag live under one
//! lock so they change together.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::interval;

use crate::error::Result;
use crate::store::{snapshot, WordCountRead, WordCountTable};

struct Inner {
    table: WordCountTable,
    dirty: bool,
}

/// Leader-side word-count store
pub struct LeaderStore {
    inner: RwLock<Inner>,
    data_dir: PathBuf,
    /// Shutdown signal for the snapshot loop
    shutdown: RwLock<bool>,
}

impl LeaderStore {
    /// Open the store, seeding the table from the snapshot file if one
    /// exists. A missing or unreadable snapshot means a fresh start.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;

        let table = match snapshot::load(&data_dir).await {
            Ok(Some(table)) => {
                tracing::info!(words = table.len(), "restored table from snapshot");
                table
            }
            Ok(None) => {
                tracing::info!("no snapshot file found, starting fresh");
                WordCountTable::new()
            }
            Err(e) => {
                tracing::warn!("snapshot unreadable, starting fresh: {}", e);
                WordCountTable::new()
            }
        };

        Ok(Self {
            inner: RwLock::new(Inner {
                table,
                dirty: false,
            }),
            data_dir,
            shutdown: RwLock::new(false),
        })
    }

    /// Tokenize `text` on whitespace and increment the count of every
    /// token. Returns the per-call delta (token to increment-this-call,
    /// not cumulative totals). Atomic under the write lock: concurrent
    /// ingests serialize and no reader observes a partial ingest.
    pub async fn ingest(&self, text: &str) -> WordCountTable {
        let mut inner = self.inner.write().await;

        let mut delta = WordCountTable::new();
        for word in text.split_whitespace() {
            *inner.table.entry(word.to_string()).or_insert(0) += 1;
            *delta.entry(word.to_string()).or_insert(0) += 1;
        }

        if !delta.is_empty() {
            inner.dirty = true;
        }

        delta
    }

    /// Fresh copy of the entire table, never a live reference
    pub async fn snapshot(&self) -> WordCountTable {
        self.inner.read().await.table.clone()
    }

    /// Write the table to the snapshot file if it changed since the last
    /// successful write. On failure the dirty flag stays set so the next
    /// tick retries. Returns whether a write happened.
    pub async fn persist_if_dirty(&self) -> Result<bool> {
        let mut inner = self.inner.write().await;

        if !inner.dirty {
            return Ok(false);
        }

        snapshot::store(&self.data_dir, &inner.table).await?;
        inner.dirty = false;

        Ok(true)
    }

    /// Periodic snapshot loop. Runs until [`stop`](Self::stop) is called.
    pub async fn run_snapshot_loop(self: Arc<Self>, period: Duration) {
        let mut ticker = interval(period);

        loop {
            ticker.tick().await;

            if *self.shutdown.read().await {
                break;
            }

            if let Err(e) = self.persist_if_dirty().await {
                tracing::error!("failed to write snapshot: {}", e);
            }
        }

        tracing::debug!("snapshot loop stopped");
    }

    /// Stop the snapshot loop
    pub async fn stop(&self) {
        *self.shutdown.write().await = true;
    }
}

#[async_trait::async_trait]
impl WordCountRead for LeaderStore {
    async fn count(&self, word: &str) -> u64 {
        self.inner
            .read()
            .await
            .table
            .get(word)
            .copied()
            .unwrap_or(0)
    }
}
