//! # Hook Handlers
//!
//! Axum handlers translating HTTP requests into hook calls.
//!
//! Bodies are decoded by hand rather than through the `Json` extractor so a malformed
//! request always gets the same `{ "error": ... }` answer.

use crate::controller::hooks::{self, CustomizeRequest, HookResource, SyncRequest};
use crate::observability::metrics;
use crate::server::error::ApiError;
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info_span, warn, Instrument};

const OUTCOME_REJECTED: &str = "rejected";

fn decode<T: serde::de::DeserializeOwned>(hook: &str, body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejecting {} request: {}", hook, e);
        ApiError::from(e)
    })
}

fn hook_name<K: HookResource>(hook: &str) -> String {
    format!("{}/{hook}", K::KIND)
}

pub async fn sync_handler<K: HookResource + 'static>(
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let hook = hook_name::<K>("sync");
    let start = Instant::now();

    let request: SyncRequest<K> = match decode(&hook, &body) {
        Ok(request) => request,
        Err(e) => {
            metrics::record_hook(&hook, OUTCOME_REJECTED, start.elapsed().as_secs_f64());
            return e.into_response();
        }
    };

    let span = info_span!("hook.sync", kind = K::KIND);
    let response = hooks::sync(&state.ctx, request).instrument(span).await;

    let outcome = response
        .status
        .status
        .as_deref()
        .unwrap_or_default()
        .to_ascii_lowercase();
    metrics::record_hook(&hook, &outcome, start.elapsed().as_secs_f64());

    let code = if response.is_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (code, Json(response)).into_response()
}

pub async fn finalize_handler<K: HookResource + 'static>(
    State(state): State<AppState>,
    body: Bytes,
) -> Response {
    let hook = hook_name::<K>("finalize");
    let start = Instant::now();

    let request: SyncRequest<K> = match decode(&hook, &body) {
        Ok(request) => request,
        Err(e) => {
            metrics::record_hook(&hook, OUTCOME_REJECTED, start.elapsed().as_secs_f64());
            return e.into_response();
        }
    };

    let span = info_span!("hook.finalize", kind = K::KIND);
    let response = hooks::finalize(&state.ctx, request).instrument(span).await;

    let outcome = match (response.finalized, response.error.is_some()) {
        (true, _) => "ready",
        (false, true) => "error",
        (false, false) => "pending",
    };
    metrics::record_hook(&hook, outcome, start.elapsed().as_secs_f64());

    Json(response).into_response()
}

pub async fn customize_handler<K: HookResource + 'static>(body: Bytes) -> Response {
    let hook = hook_name::<K>("customize");
    let start = Instant::now();

    let request: CustomizeRequest<K> = match decode(&hook, &body) {
        Ok(request) => request,
        Err(e) => {
            metrics::record_hook(&hook, OUTCOME_REJECTED, start.elapsed().as_secs_f64());
            return e.into_response();
        }
    };

    let response = hooks::customize(&request.parent);
    metrics::record_hook(&hook, "ready", start.elapsed().as_secs_f64());
    Json(response).into_response()
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub version: String,
    pub compile: String,
}

pub async fn ping_handler(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        version: state.build.version.to_string(),
        compile: state.build.compile.to_string(),
    })
}

pub async fn healthz_handler() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = metrics::gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        buffer,
    )
}
