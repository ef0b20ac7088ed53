//! countdb - Distributed Word-Count Store
//!
//! Process bootstrap for the three roles: parse the CLI, load the TOML
//! configuration, initialize logging, and wire the stores, replication
//! tasks, and HTTP listeners together.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use countdb::api;
use countdb::config::CountdbConfig;
use countdb::replication::{sync_from_leader, ReplicationConfig, Replicator};
use countdb::store::{FollowerStore, LeaderStore, LocalStore};

/// countdb - Distributed Word-Count Store
#[derive(Parser)]
#[command(name = "countdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "countdb.toml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the leader node
    Leader,

    /// Start a networked follower
    Follower,

    /// Start a filesystem-derived follower
    LocalFollower,

    /// Initialize a new configuration file
    Init {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "countdb.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { output } = &cli.command {
        return run_init(output);
    }

    let config = CountdbConfig::from_file(&cli.config)?;
    init_logging(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        &config.logging.format,
    );

    match cli.command {
        Commands::Leader => run_leader(config).await,
        Commands::Follower => run_follower(config).await,
        Commands::LocalFollower => run_local_follower(config).await,
        Commands::Validate => {
            println!("configuration OK");
            Ok(())
        }
        Commands::Init { .. } => unreachable!(),
    }
}

fn init_logging(level: &str, format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn replication_config(config: &CountdbConfig) -> ReplicationConfig {
    ReplicationConfig {
        ack_wait: config.replication.ack_wait,
        push_timeout: config.push_timeout(),
        resync_poll_interval: config.resync_poll_interval(),
    }
}

async fn run_leader(config: CountdbConfig) -> anyhow::Result<()> {
    let store = Arc::new(LeaderStore::open(config.data_dir()).await?);
    let replicator = Arc::new(Replicator::new(
        config.replication.replicas.clone(),
        &replication_config(&config),
    )?);

    tracing::info!(
        replicas = replicator.replicas().len(),
        data_dir = %config.data_dir().display(),
        "starting leader"
    );

    let snapshot_task = tokio::spawn(
        Arc::clone(&store).run_snapshot_loop(config.snapshot_interval()),
    );

    let app = api::leader_router(Arc::clone(&store), replicator);
    let result = api::serve(&config.node.bind_address, app).await;

    store.stop().await;
    snapshot_task.await?;

    Ok(result?)
}

async fn run_follower(config: CountdbConfig) -> anyhow::Result<()> {
    let leader = config
        .replication
        .leader_address
        .clone()
        .ok_or_else(|| anyhow::anyhow!("replication.leader_address is required for the follower role"))?;

    let store = Arc::new(FollowerStore::new());

    tracing::info!(leader = %leader, "starting follower");

    // The listener does not wait for the resync: the service accepts
    // connections regardless of resync outcome.
    let poll_interval = config.resync_poll_interval();
    let resync_store = Arc::clone(&store);
    tokio::spawn(async move {
        if let Err(e) = sync_from_leader(&leader, &resync_store, poll_interval).await {
            tracing::error!("startup full sync failed, serving out of sync: {}", e);
        }
    });

    api::serve(&config.node.bind_address, api::follower_router(store)).await?;

    Ok(())
}

async fn run_local_follower(config: CountdbConfig) -> anyhow::Result<()> {
    let store = Arc::new(LocalStore::new(config.data_dir()));

    tracing::info!(
        data_dir = %config.data_dir().display(),
        "starting local follower"
    );

    if let Err(e) = store.refresh().await {
        tracing::warn!("initial snapshot read failed, serving empty table: {}", e);
    }

    api::serve(&config.node.bind_address, api::local_router(store)).await?;

    Ok(())
}

fn run_init(output: &PathBuf) -> anyhow::Result<()> {
    let sample = r#"# countdb configuration

[node]
# Address to bind the HTTP listener
bind_address = "0.0.0.0:9090"
# Data directory for the durable snapshot (leader and local follower)
data_dir = "/var/lib/countdb"

[replication]
# Follower base URLs the leader pushes deltas to
replicas = ["http://follower-1:9091", "http://follower-2:9092"]
# Leader base URL a networked follower resyncs from
# leader_address = "http://leader:9090"
# Push completions awaited per replication round (0 = fully detached)
ack_wait = 1
# Per-push request timeout in seconds
push_timeout_secs = 5
# Liveness-probe poll interval in milliseconds
resync_poll_interval_ms = 2000

[snapshot]
# Interval between snapshot ticks in milliseconds
interval_ms = 1000

[logging]
level = "info"
format = "pretty"
"#;

    std::fs::write(output, sample)?;
    println!("wrote sample configuration to {}", output.display());

    Ok(())
}
