//! Solver daemon - expression evaluation service
//!
//! Exposes the symbolic math engine over HTTP:
//! - POST /solve evaluates an expression
//! - GET /health reports liveness
//! - GET / describes the service

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solver_daemon::config::DaemonConfig;
use solver_daemon::error::{DaemonError, DaemonResult};
use solver_daemon::server::Server;

/// Solver daemon CLI
#[derive(Parser)]
#[command(name = "solverd")]
#[command(about = "Expression evaluation service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SOLVER_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "SOLVER_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "SOLVER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "SOLVER_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
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

    let mut config =
        DaemonConfig::load(cli.config.as_deref()).map_err(|e| DaemonError::Config(e.to_string()))?;

    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }

    println!("Starting Symbolic Math Server...");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Listening: {}", config.server.listen_addr);

    Server::new(config).run().await
}
