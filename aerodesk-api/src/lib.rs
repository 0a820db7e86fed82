use axum::{extract::State, http::Method, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod flights;
pub mod reports;
pub mod reservations;
pub mod rules;
pub mod state;

pub use state::{AppState, Repositories};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .merge(flights::routes())
        .merge(reservations::routes())
        .merge(rules::routes())
        .merge(reports::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => (StatusCode::OK, Json(json!({"status": "ok", "storage": "postgres"}))),
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"status": "degraded", "storage": "postgres"})),
                )
            }
        },
        None => (StatusCode::OK, Json(json!({"status": "ok", "storage": "memory"}))),
    }
}
