//! # HPCR Controller
//!
//! Hook server for the orchestrator.
//!
//! ## Usage
//!
//! ```bash
//! hpcr-controller --port 8080 --log-level debug
//!
//! # Local development against a .env file holding IBMCLOUD_API_KEY etc.
//! hpcr-controller --env-file .env
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use hpcr_controller::config::ControllerConfig;
use hpcr_controller::controller::{Environment, HookContext};
use hpcr_controller::observability::{init_logging, metrics};
use hpcr_controller::provider::DefaultProviderFactory;
use hpcr_controller::server::{start_server, AppState, BuildInfo};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Metacontroller hooks for Hyper Protect Container Runtime instances
#[derive(Debug, Parser)]
#[command(name = "hpcr-controller", version)]
struct Args {
    /// Port of the hook server
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// .env file merged under the environment of every request
    #[arg(long, env = "HPCR_ENV_FILE")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS client is built
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    let args = Args::parse();

    let mut config = ControllerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }

    init_logging(&config.log_level, &config.log_format)?;

    let build = BuildInfo::current();
    info!("Starting HPCR controller");
    info!(
        "Build info: version={}, datetime={}, git_hash={}",
        build.version,
        build.compile,
        env!("BUILD_GIT_HASH")
    );
    info!(
        "Service prefix [{}], default profile [{}], resync after {}s",
        config.service_prefix, config.default_profile, config.resync_after_secs
    );

    metrics::register_metrics()?;

    let base_env = match &args.env_file {
        Some(path) => {
            let env = Environment::from_dotenv(path)
                .with_context(|| format!("Failed to load environment file {}", path.display()))?;
            info!("Loaded {} base environment entries from {}", env.len(), path.display());
            env
        }
        None => Environment::new(),
    };

    let port = config.port;
    let ctx = HookContext::new(Arc::new(config), Arc::new(DefaultProviderFactory)).with_base_env(base_env);

    start_server(port, AppState { ctx, build }).await
}
