//! HTTP API
//!
//! One GET route per cached fetch. Every fetch failure maps to a uniform
//! 503 with no internal detail; a legitimately empty feed result maps to
//! 200 with a `null` body, never to an error.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::FetchResult;
use crate::service::Service;

/// Create the API router with all endpoints
pub fn create_router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/api/v1/market_indices", get(get_market_indices))
        .route("/api/v1/latest_macro", get(get_latest_macro))
        .route("/api/v1/pce", get(get_pce))
        .route("/api/v1/fed_rate", get(get_fed_rate))
        .route("/api/v1/vix", get(get_vix))
        .route("/api/v1/fomc_next", get(get_fomc_next))
        .route("/api/v1/powell_speech", get(get_powell_speech))
        .with_state(service)
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// GET /api/v1/market_indices - UUP price and aggregated US equity volume
async fn get_market_indices(State(service): State<Arc<Service>>) -> Response {
    respond(service.market_indices().await)
}

/// GET /api/v1/latest_macro - Most recently published of CPI and NFP
async fn get_latest_macro(State(service): State<Arc<Service>>) -> Response {
    respond(service.latest_macro().await)
}

/// GET /api/v1/pce - Latest personal consumption expenditures
async fn get_pce(State(service): State<Arc<Service>>) -> Response {
    respond(service.pce().await)
}

/// GET /api/v1/fed_rate - Latest effective federal funds rate
async fn get_fed_rate(State(service): State<Arc<Service>>) -> Response {
    respond(service.fed_rate().await)
}

/// GET /api/v1/vix - Latest VIX close
async fn get_vix(State(service): State<Arc<Service>>) -> Response {
    respond(service.vix().await)
}

/// GET /api/v1/fomc_next - Next scheduled FOMC meeting, or null
async fn get_fomc_next(State(service): State<Arc<Service>>) -> Response {
    respond(service.fomc_next().await)
}

/// GET /api/v1/powell_speech - Next scheduled speech, or null
async fn get_powell_speech(State(service): State<Arc<Service>>) -> Response {
    respond(service.powell_speech().await)
}

/// Map a fetch result onto the wire contract: 200 with the record on
/// success, uniform 503 on any failure. Internal error detail stays in the
/// logs.
fn respond<T: Serialize>(result: FetchResult<T>) -> Response {
    match result {
        Ok(data) => Json(data).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Fetch failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"detail": "Service Unavailable"})),
            )
                .into_response()
        }
    }
}

/// Start the API server
pub async fn start_server(service: Arc<Service>, bind_addr: &str) -> anyhow::Result<()> {
    use anyhow::Context;

    let app = create_router(service);
    let addr: std::net::SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {:?}", bind_addr))?;

    tracing::info!("🌐 Goldapp API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
