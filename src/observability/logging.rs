//! # Logging
//!
//! Tracing subscriber setup. `RUST_LOG` wins over the configured level.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init_logging(level: &str, format: &str) -> Result<()> {
    let level = level.to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hpcr_controller={level},tower_http={level}").into());

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow!("Failed to initialize tracing subscriber: {e}"))
}
