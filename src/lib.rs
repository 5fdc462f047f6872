//! Gear rental booking engine.
//!
//! Quotes rentals, checks availability and hands priced bookings to the
//! payment service.

pub mod booking;
pub mod cache;
pub mod config;
pub mod error;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::booking::{BookingStore, PaymentGateway};
use crate::cache::AppCache;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub payments: Arc<dyn PaymentGateway>,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/cache/invalidate/:equipment_id",
            post(booking::routes::invalidate_equipment),
        )
        .nest("/api/booking", booking::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.cache.stats(),
    }))
}
