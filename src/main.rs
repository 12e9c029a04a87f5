//! Fanhub Server
//!
//! Run with: cargo run -- serve
//!
//! # Configuration
//!
//! Settings come from a TOML file (`--config`, or the default locations) with
//! `FANHUB_*` environment overrides. `RUST_LOG` takes precedence over the
//! configured log level.

use anyhow::Context;
use clap::{Parser, Subcommand};
use fanhub::api::{serve, AppState};
use fanhub::config::{generate_default_config, Config, LoggingConfig};
use fanhub::diagnostics::SinkKind;
use fanhub::hub::Hub;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fanhub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Real-time WebSocket fan-out hub")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the hub server
    Serve {
        /// Config file (default: search standard locations)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Print hub activity traces to stdout
        #[arg(short, long)]
        trace: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            trace,
        } => {
            let mut config = match config {
                Some(path) => Config::load_with_env(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => Config::load_default().context("loading default config")?,
            };
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if trace {
                config.diagnostics.sink = SinkKind::Stdout;
            }
            config.validate().context("invalid configuration")?;

            init_logging(&config.logging);
            run_server(config).await
        }
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
            Ok(())
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting fanhub v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        outbound_capacity = config.hub.outbound_capacity,
        diagnostics = ?config.diagnostics.sink,
        "Hub configuration"
    );

    let (hub, hub_task) = Hub::spawn(config.hub.clone(), config.diagnostics.sink.build());

    let api_config = config.api_config();
    serve(AppState::new(hub, api_config.clone()), &api_config).await?;

    // Connections still open keep their own hub handles; the loop is not
    // awaited past this point.
    hub_task.abort();
    tracing::info!("Fanhub stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("fanhub={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
