//! # HTTP Server
//!
//! Hook endpoints for the orchestrator plus metrics and probes.
//!
//! Provides endpoints:
//! - `/sync`, `/finalize`, `/customize` - `HyperProtectInstance` hooks
//! - `/networkref/{sync,finalize,customize}` - `NetworkRef` hooks
//! - `/datadiskref/{sync,finalize,customize}` - `DataDiskRef` hooks
//! - `/ping` - Build information
//! - `/healthz` - Liveness probe (always returns 200)
//! - `/metrics` - Prometheus metrics in text format

pub mod error;
pub mod handlers;

use crate::controller::hooks::{HookContext, HookResource};
use crate::crd::{DataDiskRef, HyperProtectInstance, NetworkRef};
use axum::routing::{get, post};
use axum::Router;
use handlers::{
    customize_handler, finalize_handler, healthz_handler, metrics_handler, ping_handler,
    sync_handler,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build metadata reported by `/ping`
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub compile: &'static str,
}

impl BuildInfo {
    /// Metadata of this binary, injected by the build script
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            compile: env!("BUILD_DATETIME"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub ctx: HookContext,
    pub build: BuildInfo,
}

fn hook_routes<K: HookResource + 'static>() -> Router<AppState> {
    Router::new()
        .route("/sync", post(sync_handler::<K>))
        .route("/finalize", post(finalize_handler::<K>))
        .route("/customize", post(customize_handler::<K>))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(hook_routes::<HyperProtectInstance>())
        .nest("/networkref", hook_routes::<NetworkRef>())
        .nest("/datadiskref", hook_routes::<DataDiskRef>())
        .route("/ping", get(ping_handler))
        .route("/healthz", get(healthz_handler))
        .route("/metrics", get(metrics_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), anyhow::Error> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!("Hook server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
