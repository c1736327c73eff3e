//! `vibe-connector` binary: loads configuration and serves the meme API.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vibe_connector::{ConnectorConfig, MemeServer};

#[derive(Debug, Parser)]
#[command(name = "vibe-connector", version, about = "Meme captioning API with daily per-device quotas")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "VIBE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides `server.bind_addr`.
    #[arg(long)]
    listen: Option<String>,

    /// Directory for persisted state, overrides `storage.data_dir`.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Requests per identifier per UTC day, overrides `quota.daily_limit`.
    #[arg(long)]
    daily_limit: Option<u32>,
}

impl Cli {
    fn apply(&self, config: &mut ConnectorConfig) {
        if let Some(listen) = &self.listen {
            config.server.bind_addr = listen.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.storage.meme_dir = dir.join("memes");
            config.storage.data_dir = dir.clone();
        }
        if let Some(limit) = self.daily_limit {
            config.quota.daily_limit = limit;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = ConnectorConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    MemeServer::new(config).run().await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vibe_connector=debug,vibe_state=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
