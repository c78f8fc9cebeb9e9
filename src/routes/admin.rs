use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::extractors::AdminGuard;
use crate::state::AppState;
use crate::store::models::User;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/users", get(list_users))
}

async fn list_users(State(state): State<AppState>, _admin: AdminGuard) -> Json<Vec<User>> {
    Json(state.store.list_users().await)
}
