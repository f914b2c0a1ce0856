//! HTTP API surface.
//!
//! A thin axum layer over the registry: start/stop scanning, snapshot,
//! Markdown report, deep inspection, and local-address lookup. All reads
//! go through registry snapshots; handlers never hold the registry lock
//! across I/O.

use crate::inspect;
use crate::registry::Registry;
use crate::report;
use crate::resolver;
use crate::scorer::{self, NetworkQuality};
use crate::types::Host;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use serde::Serialize;
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<Registry>,
}

/// The `/api/scan` payload.
#[derive(Debug, Serialize)]
pub struct ScanSnapshot {
    pub devices: Vec<Host>,
    pub scanning: bool,
    pub quality: NetworkQuality,
}

/// Build the router (separate from `serve` so tests can drive it).
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/scan/start", post(start_scan))
        .route("/api/scan/stop", post(stop_scan))
        .route("/api/scan", get(scan_snapshot))
        .route("/api/report", get(scan_report))
        .route("/api/inspect/{addr}", get(inspect_host))
        .route("/api/local-ip", get(local_ip))
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: ApiState) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("API server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install Ctrl+C handler; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn start_scan(State(state): State<ApiState>) -> Json<serde_json::Value> {
    state.registry.set_enabled(true);
    Json(json!({"status": "started"}))
}

async fn stop_scan(State(state): State<ApiState>) -> Json<serde_json::Value> {
    state.registry.set_enabled(false);
    Json(json!({"status": "stopped"}))
}

async fn scan_snapshot(State(state): State<ApiState>) -> Json<ScanSnapshot> {
    let devices = state.registry.snapshot();
    let quality = scorer::score(&devices);
    Json(ScanSnapshot {
        scanning: state.registry.is_enabled(),
        devices,
        quality,
    })
}

async fn scan_report(State(state): State<ApiState>) -> Response {
    let devices = state.registry.snapshot();
    let quality = scorer::score(&devices);
    let md = report::render(&devices, &quality, Local::now());

    (
        [
            (header::CONTENT_TYPE, "text/markdown"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=network_report.md",
            ),
        ],
        md,
    )
        .into_response()
}

/// Validation happens here, synchronously, before the external tool is
/// ever invoked.
async fn inspect_host(Path(addr): Path<String>) -> Response {
    match addr.parse::<IpAddr>() {
        Ok(address) => Json(inspect::inspect(address).await).into_response(),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid IP address"})),
        )
            .into_response(),
    }
}

async fn local_ip() -> Json<serde_json::Value> {
    let local = resolver::resolve();
    Json(json!({"ip": local.address.to_string()}))
}
