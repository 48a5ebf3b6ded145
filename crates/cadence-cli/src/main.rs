mod commands;
mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use cadence_api::ApiClient;
use cadence_session::SessionStore;
use cadence_storage::{KeyValueStore, MemoryStore, SqliteStore};

use crate::commands::Command;
use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "cadence", version, about = "Cadence music streaming client")]
struct Cli {
    /// Gateway base URL (overrides CADENCE_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session database file (overrides CADENCE_STORE_PATH).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Keep the session in memory only; nothing survives the process.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=info,cadence_session=info,cadence_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Config
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.store {
        config.store_path = path;
    }

    if cli.ephemeral {
        debug!("Using in-memory session store");
        run(cli.command, &config, MemoryStore::new()).await
    } else {
        let storage = SqliteStore::open(&config.store_path)?;
        run(cli.command, &config, storage).await
    }
}

async fn run<S: KeyValueStore>(command: Command, config: &Config, storage: S) -> anyhow::Result<()> {
    let mut session = SessionStore::new(storage, config.codec());
    if session.restore() {
        debug!("Restored saved session");
    }

    let api = ApiClient::new(config.api_url.as_str(), session.subscribe());
    debug!(api_url = %api.base_url(), "Cadence client ready");

    let result = commands::run(command, &api, &mut session).await;
    session.dispose();
    result
}
