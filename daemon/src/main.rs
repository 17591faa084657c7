//! Rondo daemon — entry point for running a governance node.

use clap::Parser;
use std::path::PathBuf;

use rondo_node::logging::init_logging;
use rondo_node::{NodeConfig, RondoNode, ShutdownSignal};

#[derive(Parser)]
#[command(name = "rondo-daemon", about = "Rondo PoA federation node daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory for the poll log and governance snapshots.
    #[arg(long, env = "RONDO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// This node's federation pubkey (hex).
    #[arg(long, env = "RONDO_OWN_KEY")]
    own_key: Option<String>,

    /// Use compressed devnet timelines (short reorg window and idle timeout).
    #[arg(long, env = "RONDO_DEVNET")]
    devnet: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "RONDO_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "RONDO_LOG_FORMAT")]
    log_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(&path.display().to_string())?,
        None => NodeConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(own_key) = cli.own_key {
        config.own_key = Some(own_key);
    }
    if cli.devnet {
        config.params = rondo_types::PoaParams::devnet_defaults();
    }
    config.log_level = cli.log_level;
    config.log_format = cli.log_format;

    init_logging(&config.log_format, &config.log_level);

    let node = RondoNode::open(&config)?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        members = node.members().len(),
        federation_member = node.is_federation_member(),
        "rondo node started"
    );

    let shutdown = std::sync::Arc::new(ShutdownSignal::new());
    tokio::spawn({
        let shutdown = std::sync::Arc::clone(&shutdown);
        async move { shutdown.listen_for_signals().await }
    });
    shutdown.triggered().await;

    tracing::info!("rondo daemon exited cleanly");
    Ok(())
}
