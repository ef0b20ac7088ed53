//! countdb Error Types

use thiserror::Error;

/// Result type alias for countdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// countdb error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Snapshot errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Snapshot serialization error: {0}")]
    SnapshotSerialization(#[from] serde_json::Error),

    // Replication errors
    #[error("Replication error: {0}")]
    Replication(String),

    #[error("Full sync from leader {leader} failed: {reason}")]
    SyncFailed { leader: String, reason: String },

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
