//! Leader-Side Delta Push
//!
//! After each ingest the leader pushes the delta to every registered
//! follower concurrently, waits for the first `ack_wait` pushes to finish
//! (success or failure), and lets the rest run detached. The ingesting
//! client is acknowledged before any of this happens.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::error::{Error, Result};
use crate::replication::ReplicationConfig;
use crate::store::WordCountTable;

/// Pushes ingest deltas to registered follower endpoints
pub struct Replicator {
    client: reqwest::Client,
    replicas: Vec<String>,
    ack_wait: usize,
}

impl Replicator {
    /// Create a replicator over `replicas` (base URLs)
    pub fn new(replicas: Vec<String>, config: &ReplicationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.push_timeout)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            replicas,
            ack_wait: config.ack_wait,
        })
    }

    /// Registered follower endpoints
    pub fn replicas(&self) -> &[String] {
        &self.replicas
    }

    /// Push `delta` to every follower concurrently. Returns once the
    /// first `ack_wait` pushes have finished; the remaining pushes
    /// outlive this call and their failures are logged, not retried.
    pub async fn replicate(&self, delta: WordCountTable) {
        if delta.is_empty() || self.replicas.is_empty() {
            return;
        }

        tracing::info!(words = delta.len(), "replicating delta to followers");

        let delta = Arc::new(delta);
        let mut in_flight = FuturesUnordered::new();

        for replica in &self.replicas {
            let client = self.client.clone();
            let replica = replica.clone();
            let delta = Arc::clone(&delta);

            in_flight.push(tokio::spawn(async move {
                if let Err(e) = push_one(&client, &replica, &delta).await {
                    tracing::error!(replica = %replica, "failed to push delta: {}", e);
                }
            }));
        }

        for _ in 0..self.ack_wait.min(self.replicas.len()) {
            if in_flight.next().await.is_none() {
                break;
            }
        }

        // Dropping the remaining join handles detaches the in-flight
        // pushes; they run to completion on their own.
    }
}

async fn push_one(client: &reqwest::Client, replica: &str, delta: &WordCountTable) -> Result<()> {
    let resp = client
        .post(format!("{}/update", replica))
        .json(delta)
        .send()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    if resp.status() != reqwest::StatusCode::ACCEPTED {
        return Err(Error::Replication(format!(
            "follower answered status {}",
            resp.status()
        )));
    }

    Ok(())
}
