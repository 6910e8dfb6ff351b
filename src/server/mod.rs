//! HTTP surface over the engine.
//!
//! Thin consumers call these endpoints and render whatever comes back; the
//! engine itself lives behind the shared state's mutexes.

mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use std::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::location::LocationResolver;
use crate::risk::RiskOrchestrator;

pub fn build_router() -> Router {
    let state = Arc::new(AppState {
        orchestrator: Mutex::new(RiskOrchestrator::new()),
        resolver: Mutex::new(LocationResolver::new()),
    });

    Router::new()
        .route("/api/risk", get(handlers::risk))
        .route("/api/location", get(handlers::location))
        .route("/api/location/manual", post(handlers::save_manual))
        .route(
            "/api/cache",
            get(handlers::cache_metadata).delete(handlers::cache_clear),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16) {
    let app = build_router();
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Wildguard server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    });
}
