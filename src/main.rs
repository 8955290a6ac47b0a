use anyhow::Result;
use clap::{Parser, Subcommand};
use docrelay::config::Config;
use docrelay::gateway;
use docrelay::relay::ElasticStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Relay uploaded files into an Elasticsearch index and export them back.
#[derive(Debug, Parser)]
#[command(name = "docrelay", version, about)]
struct Cli {
    /// Config file (TOML). Defaults to the per-user config file if present.
    #[arg(short, long, global = true, env = "DOCRELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Listen port, overrides config
        #[arg(short, long)]
        port: Option<u16>,

        /// Log filter, e.g. `debug` or `docrelay=trace`
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Print the effective configuration with secrets masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_file = dotenvy::dotenv().ok();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        log_level: None,
    }) {
        Command::Config => {
            print!("{}", config.to_redacted_toml()?);
            Ok(())
        }
        Command::Serve { port, log_level } => {
            docrelay::logging::init(&config.logging, log_level.as_deref())?;
            if let Some(path) = &env_file {
                tracing::debug!(path = %path.display(), "Loaded environment file");
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let credentials = config.credentials()?;
            let store = ElasticStore::new(&config.store, credentials)?;
            tracing::info!(
                store = %config.store.url,
                index = %config.store.index,
                uploads = %config.uploads_dir().display(),
                exports = %config.export_dir().display(),
                "Starting docrelay"
            );
            gateway::serve(&config, Arc::new(store)).await
        }
    }
}
