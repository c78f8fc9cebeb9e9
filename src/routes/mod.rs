pub mod achievements;
pub mod admin;
pub mod courses;
pub mod forum;
pub mod progress;
pub mod users;

use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// `?limit=N` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// The full API, with request tracing and CORS.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(users::router())
        .merge(courses::router())
        .merge(progress::router())
        .merge(achievements::router())
        .merge(forum::router())
        .merge(admin::router())
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
