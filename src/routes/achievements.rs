use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::{AdminGuard, ApiPath, JsonBody};
use crate::state::AppState;
use crate::store::models::{Achievement, EarnedAchievement, Id, NewUserAchievement, UserAchievement};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequest {
    pub achievement_id: Id,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/achievements", get(list_achievements))
        .route(
            "/api/users/{id}/achievements",
            get(user_achievements).post(grant_achievement),
        )
}

/// Re-check rule-based achievements after activity that feeds them
pub(crate) async fn unlock_achievements(state: &AppState, user_id: Id) -> AppResult<()> {
    let unlocked = state.store.evaluate_achievements(user_id).await?;
    if !unlocked.is_empty() {
        tracing::info!(user_id, count = unlocked.len(), "Unlocked achievements");
    }
    Ok(())
}

async fn list_achievements(State(state): State<AppState>) -> Json<Vec<Achievement>> {
    Json(state.store.list_achievements().await)
}

/// GET /api/users/{id}/achievements
/// Earned records joined with their definitions
async fn user_achievements(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Id>,
) -> AppResult<Json<Vec<EarnedAchievement>>> {
    Ok(Json(state.store.user_achievements(user_id).await?))
}

/// POST /api/users/{id}/achievements
/// Manual grant, e.g. for free-form achievement types
async fn grant_achievement(
    State(state): State<AppState>,
    _admin: AdminGuard,
    ApiPath(user_id): ApiPath<Id>,
    JsonBody(body): JsonBody<GrantRequest>,
) -> AppResult<(StatusCode, Json<UserAchievement>)> {
    let earned = state
        .store
        .grant_achievement(NewUserAchievement {
            user_id,
            achievement_id: body.achievement_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(earned)))
}
