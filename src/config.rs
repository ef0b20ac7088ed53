//! countdb Configuration
//!
//! Configuration structures for the three countdb roles. All roles share
//! one file format; role-irrelevant sections are simply ignored.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main countdb configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdbConfig {
    /// Node-specific configuration
    pub node: NodeConfig,

    /// Replication configuration
    #[serde(default)]
    pub replication: ReplicationSettings,

    /// Snapshot persistence configuration
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Node-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Address to bind the HTTP listener
    pub bind_address: String,

    /// Data directory for the durable snapshot (leader and local follower)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Replication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSettings {
    /// Follower base URLs the leader pushes deltas to
    #[serde(default)]
    pub replicas: Vec<String>,

    /// Leader base URL a networked follower resyncs from
    #[serde(default)]
    pub leader_address: Option<String>,

    /// Number of push completions to await before a replication round
    /// returns (0 = fully detached)
    #[serde(default = "default_ack_wait")]
    pub ack_wait: usize,

    /// Per-push request timeout in seconds
    #[serde(default = "default_push_timeout_secs")]
    pub push_timeout_secs: u64,

    /// Poll interval for the startup liveness probe in milliseconds
    #[serde(default = "default_resync_poll_interval_ms")]
    pub resync_poll_interval_ms: u64,
}

/// Snapshot persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Interval between snapshot ticks in milliseconds
    #[serde(default = "default_snapshot_interval_ms")]
    pub interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_ack_wait() -> usize {
    1
}

fn default_push_timeout_secs() -> u64 {
    5
}

fn default_resync_poll_interval_ms() -> u64 {
    2000
}

fn default_snapshot_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/countdb")
}

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            replicas: Vec::new(),
            leader_address: None,
            ack_wait: default_ack_wait(),
            push_timeout_secs: default_push_timeout_secs(),
            resync_poll_interval_ms: default_resync_poll_interval_ms(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_snapshot_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CountdbConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: CountdbConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.node.bind_address.is_empty() {
            return Err(crate::Error::Config("node.bind_address cannot be empty".into()));
        }

        if self.snapshot.interval_ms == 0 {
            return Err(crate::Error::Config("snapshot.interval_ms must be positive".into()));
        }

        Ok(())
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &PathBuf {
        &self.node.data_dir
    }

    /// Get snapshot interval as Duration
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot.interval_ms)
    }

    /// Get per-push timeout as Duration
    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.replication.push_timeout_secs)
    }

    /// Get liveness-probe poll interval as Duration
    pub fn resync_poll_interval(&self) -> Duration {
        Duration::from_millis(self.replication.resync_poll_interval_ms)
    }
}
