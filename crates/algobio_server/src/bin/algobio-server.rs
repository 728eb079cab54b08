//! AlgoBio classifier server.
//!
//! Loads model artifacts, connects the classification store, optionally
//! registers with Eureka, and serves the HTTP API until SIGTERM or Ctrl+C.

use algobio_core::{LogFormat, init_observability, init_tracing, shutdown_observability};
use algobio_server::{ServiceConfig, run};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for the classifier server.
#[derive(Parser, Debug)]
#[command(name = "algobio-server")]
#[command(about = "AlgoBio Server - DNA sequence classification over HTTP")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ALGOBIO_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the model artifacts
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Database URL (overrides configuration)
    #[arg(long)]
    database_url: Option<String>,

    /// Serve without persisting predictions
    #[arg(long)]
    no_database: bool,

    /// Skip Eureka registration
    #[arg(long)]
    no_registry: bool,

    /// Log format
    #[arg(long, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

impl Args {
    fn apply(self, config: &mut ServiceConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = self.model_dir {
            config.model.dir = dir;
        }
        if let Some(url) = self.database_url {
            config.database.url = Some(url);
        }
        if self.no_database {
            config.database.enabled = false;
        }
        if self.no_registry {
            config.registry.enabled = false;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    match value.to_ascii_lowercase().as_str() {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format '{}', expected text or json", other)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = ServiceConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    init_tracing(config.logging.format).map_err(anyhow::Error::msg)?;
    init_observability("algobio-server", 60).map_err(anyhow::Error::msg)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        model_dir = %config.model.dir.display(),
        database = config.database.enabled,
        registry = config.registry.enabled,
        "Starting AlgoBio server"
    );

    let result = run(config).await;
    if let Err(e) = &result {
        error!(error = %e, "Server exited with error");
    }

    shutdown_observability();
    result.map_err(Into::into)
}
