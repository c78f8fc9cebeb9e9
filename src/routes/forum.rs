use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::error::AppResult;
use crate::extractors::{ApiPath, ApiQuery, ValidJson};
use crate::routes::LimitQuery;
use crate::state::AppState;
use crate::store::models::{ForumPost, ForumPostWithAuthor, Id, NewForumPost};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/forum", get(feed).post(create_post))
        .route("/api/forum/{id}/like", patch(like_post))
}

/// GET /api/forum?limit=N
/// Newest posts first, each with its author
async fn feed(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> AppResult<Json<Vec<ForumPostWithAuthor>>> {
    let api = &state.config.api;
    let limit = api.clamp_limit(query.limit, api.forum_limit);
    Ok(Json(state.store.forum_feed(limit).await?))
}

async fn create_post(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewForumPost>,
) -> AppResult<(StatusCode, Json<ForumPost>)> {
    let post = state.store.create_forum_post(payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /api/forum/{id}/like
/// One like per call; repeat likes are not de-duplicated
async fn like_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<Id>,
) -> AppResult<Json<ForumPost>> {
    Ok(Json(state.store.like_forum_post(post_id).await?))
}
