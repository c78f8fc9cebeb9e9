use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extractors::{AdminGuard, ApiPath, ApiQuery, JsonBody, MaybeUser, ValidJson};
use crate::routes::achievements::unlock_achievements;
use crate::routes::LimitQuery;
use crate::state::AppState;
use crate::store::models::{Id, NewUser, Role, User};

#[derive(Deserialize)]
pub struct XpAward {
    pub xp: u64,
}

#[derive(Deserialize)]
pub struct StreakUpdate {
    pub streak: u32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/user/{external_id}", get(get_by_external_id))
        .route("/api/users", post(create_user))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/xp", patch(award_xp))
        .route("/api/users/{id}/streak", patch(update_streak))
        .route("/api/users/{id}/promote-instructor", patch(promote_instructor))
        .route("/api/users/{id}/promote-admin", patch(promote_admin))
        .route("/api/leaderboard", get(leaderboard))
}

/// GET /api/user/{external_id}
/// Looks a user up by identity-provider reference
async fn get_by_external_id(
    State(state): State<AppState>,
    ApiPath(external_id): ApiPath<String>,
) -> AppResult<Json<User>> {
    state
        .store
        .get_user_by_external_id(&external_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// POST /api/users
/// New students are open to anyone; other roles go through the admin check
async fn create_user(
    State(state): State<AppState>,
    MaybeUser(acting): MaybeUser,
    ValidJson(payload): ValidJson<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    if payload.role != Role::Student {
        AdminGuard::check(&state, acting)?;
    }
    let user = state.store.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
) -> AppResult<Json<User>> {
    state
        .store
        .get_user(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// PATCH /api/users/{id}/xp
/// Adds the XP delta and recomputes the level
async fn award_xp(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
    JsonBody(body): JsonBody<XpAward>,
) -> AppResult<Json<User>> {
    let user = state.store.award_xp(id, body.xp).await?;
    Ok(Json(user))
}

/// PATCH /api/users/{id}/streak
/// Stores the streak and re-checks streak achievements
async fn update_streak(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
    JsonBody(body): JsonBody<StreakUpdate>,
) -> AppResult<Json<User>> {
    let user = state.store.update_streak(id, body.streak).await?;
    unlock_achievements(&state, id).await?;
    Ok(Json(user))
}

async fn promote_instructor(
    State(state): State<AppState>,
    _admin: AdminGuard,
    ApiPath(id): ApiPath<Id>,
) -> AppResult<Json<User>> {
    let user = state.store.update_role(id, Role::Instructor).await?;
    Ok(Json(user))
}

async fn promote_admin(
    State(state): State<AppState>,
    _admin: AdminGuard,
    ApiPath(id): ApiPath<Id>,
) -> AppResult<Json<User>> {
    let user = state.store.update_role(id, Role::Admin).await?;
    Ok(Json(user))
}

async fn leaderboard(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<Json<Vec<User>>> {
    let api = &state.config.api;
    let limit = api.clamp_limit(query.limit, api.leaderboard_limit);
    Ok(Json(state.store.leaderboard(limit).await))
}
