//! GLINT CLI - run the instrument hub or a simulated instrument

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glint_core::DEFAULT_WS_PORT;
use glint_hub::{Hub, HubConfig};
use glint_store::MemoryStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod config;
mod simulate;

use config::ServiceConfig;

/// GLINT - Gauge Link for Instrument Telemetry
#[derive(Parser)]
#[command(name = "glint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the routing hub
    Serve {
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,

        /// Port number
        #[arg(short = 'P', long, default_value_t = DEFAULT_WS_PORT)]
        port: u16,
    },

    /// Run a simulated instrument against a hub
    Simulate {
        /// Hub base URL
        #[arg(long, default_value = "ws://127.0.0.1:9030")]
        hub: String,

        /// Instrument identifier (random if omitted)
        #[arg(long)]
        id: Option<Uuid>,

        /// Milliseconds between readings
        #[arg(long, default_value = "5000")]
        interval_ms: u64,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    match cli.command {
        Commands::Serve { bind, port } => serve(config, bind, port).await,
        Commands::Simulate {
            hub,
            id,
            interval_ms,
        } => {
            let id = id.unwrap_or_else(Uuid::new_v4);
            simulate::run(&hub, id, interval_ms).await
        }
    }
}

async fn serve(config: ServiceConfig, bind: String, port: u16) -> Result<()> {
    let bind = config.bind.clone().unwrap_or(bind);
    let port = config.port.unwrap_or(port);
    let addr = format!("{}:{}", bind, port);

    let store = Arc::new(MemoryStore::new());
    config.seed(&store)?;

    let hub = Arc::new(Hub::new(HubConfig::default(), store));

    let server = {
        let hub = hub.clone();
        let addr = addr.clone();
        tokio::spawn(async move { hub.serve(&addr).await })
    };

    info!("Hub running on {} (ctrl-c to stop)", addr);

    tokio::select! {
        result = server => {
            result.context("hub task panicked")??;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            hub.stop();
        }
    }

    Ok(())
}
