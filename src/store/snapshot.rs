//! Snapshot Persistence
//!
//! Whole-table JSON snapshot under a fixed file name in the data
//! directory. Overwrite-in-place: no versioning, no checksum, no
//! write-ahead log. The file doubles as the leader's crash-recovery
//! state and the local follower's sole data source.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::WordCountTable;

/// Fixed snapshot file name under the data directory
pub const SNAPSHOT_FILE: &str = "wordcounts.db";

/// Full path of the snapshot file under `dir`
pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE)
}

/// Serialize `table` and overwrite the snapshot file under `dir`.
pub async fn store(dir: &Path, table: &WordCountTable) -> Result<()> {
    let data = serde_json::to_vec(table)?;
    tokio::fs::write(snapshot_path(dir), data).await?;
    Ok(())
}

/// Read and deserialize the snapshot file under `dir`.
///
/// A missing file is a fresh start, reported as `Ok(None)`; any other
/// read or parse failure is an error.
pub async fn load(dir: &Path) -> Result<Option<WordCountTable>> {
    let data = match tokio::fs::read(snapshot_path(dir)).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let table = serde_json::from_slice(&data)?;
    Ok(Some(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut table = HashMap::new();
        table.insert("hello".to_string(), 2u64);
        table.insert("world".to_string(), 1u64);

        store(dir.path(), &table).await.unwrap();

        let restored = load(dir.path()).await.unwrap().unwrap();
        assert_eq!(restored, table);
    }

    #[tokio::test]
    async fn test_missing_file_is_fresh_start() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(snapshot_path(dir.path()), b"not json")
            .await
            .unwrap();

        assert!(load(dir.path()).await.is_err());
    }
}
