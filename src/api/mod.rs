//! Derived-view read surface.
//!
//! # Responsibilities
//! - Serve the five view queries and the keyed QoS lookup as JSON
//! - Accept the payload-less "raw configuration changed" notification
//! - Wire up middleware (tracing, request timeout)
//!
//! # Design Decisions
//! - Handlers only read the cached snapshot; no handler touches the
//!   raw-store guard, so reads never block on an in-flight sync or saga
//! - Slice/device-group mutation endpoints belong to the external
//!   management API, not this surface

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::service::ConsoleService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ConsoleService>,
}

/// Build the router with all view routes and middleware layers.
pub fn build_router(service: Arc<ConsoleService>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/nfconfig/plmn", get(handlers::plmn))
        .route("/nfconfig/plmn-snssai", get(handlers::plmn_snssai))
        .route("/nfconfig/access-mobility", get(handlers::access_and_mobility))
        .route("/nfconfig/session-management", get(handlers::session_management))
        .route("/nfconfig/policy-control", get(handlers::policy_control))
        .route("/nfconfig/qos/{dnn}/{imsi}", get(handlers::imsi_qos))
        .route("/config/sync", post(handlers::trigger_sync))
        .with_state(ApiState { service })
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serve the router until shutdown, then signal the rest of the process.
pub async fn run(
    listener: TcpListener,
    router: Router,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Read surface listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown.send(());
    tracing::info!("Read surface stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown handler");
    }
}
