//! Follower Startup Full Sync
//!
//! The only retry loop in the system: poll the leader's liveness endpoint
//! until it answers, then pull the full table once and replace the local
//! table wholesale. A failure after the leader is confirmed live is
//! reported to the caller, which logs it and serves anyway.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::store::{FollowerStore, WordCountTable};

/// Block until the leader is live, then replace `store`'s table with the
/// leader's full current table.
pub async fn sync_from_leader(
    leader: &str,
    store: &FollowerStore,
    poll_interval: Duration,
) -> Result<()> {
    let client = reqwest::Client::new();

    wait_for_leader(&client, leader, poll_interval).await;

    let resp = client
        .get(format!("{}/sync", leader))
        .send()
        .await
        .map_err(|e| Error::SyncFailed {
            leader: leader.to_string(),
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(Error::SyncFailed {
            leader: leader.to_string(),
            reason: format!("status {}", resp.status()),
        });
    }

    let table: WordCountTable = resp.json().await.map_err(|e| Error::SyncFailed {
        leader: leader.to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!(leader = %leader, words = table.len(), "full sync complete");
    store.replace(table).await;

    Ok(())
}

/// Poll the leader's liveness endpoint with unbounded retries
async fn wait_for_leader(client: &reqwest::Client, leader: &str, poll_interval: Duration) {
    loop {
        match client.get(format!("{}/health", leader)).send().await {
            Ok(resp) if resp.status().is_success() => return,
            _ => {
                tracing::info!(leader = %leader, "waiting for leader to become available");
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}
