use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use serde::Serialize;

use crate::error::AppResult;
use crate::extractors::{ApiPath, ValidJson};
use crate::gamification::{XP_LESSON_COMPLETE, XP_QUIZ_CORRECT};
use crate::routes::achievements::unlock_achievements;
use crate::state::AppState;
use crate::store::models::{DayActivity, Id, NewProgress, NewQuizAttempt, QuizAttempt, UserProgress};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourses {
    pub completed_courses: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/progress", post(record_progress))
        .route("/api/users/{id}/progress/{course_id}", get(course_progress))
        .route("/api/users/{id}/weekly-progress", get(weekly_progress))
        .route("/api/users/{id}/completed-courses", get(completed_courses))
        .route("/api/quiz-attempts", post(record_quiz_attempt))
        .route("/api/users/{id}/quizzes/{quiz_id}/attempts", get(quiz_attempts))
}

/// POST /api/progress
/// Upserts the (user, lesson) record; the first completion earns lesson XP
async fn record_progress(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewProgress>,
) -> AppResult<Json<UserProgress>> {
    let user_id = payload.user_id;
    let update = state.store.upsert_progress(payload).await?;

    if update.newly_completed {
        state.store.award_xp(user_id, XP_LESSON_COMPLETE).await?;
        unlock_achievements(&state, user_id).await?;
    }

    Ok(Json(update.progress))
}

async fn course_progress(
    State(state): State<AppState>,
    ApiPath((user_id, course_id)): ApiPath<(Id, Id)>,
) -> Json<Vec<UserProgress>> {
    Json(state.store.user_progress(user_id, course_id).await)
}

/// GET /api/users/{id}/weekly-progress
/// Sunday-to-Saturday activity for the current local week
async fn weekly_progress(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Id>,
) -> Json<Vec<DayActivity>> {
    Json(state.store.weekly_activity(user_id, Local::now()).await)
}

async fn completed_courses(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Id>,
) -> Json<CompletedCourses> {
    Json(CompletedCourses {
        completed_courses: state.store.completed_course_count(user_id).await,
    })
}

/// POST /api/quiz-attempts
/// Records the attempt as reported by the client; correct answers earn quiz XP
async fn record_quiz_attempt(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewQuizAttempt>,
) -> AppResult<(StatusCode, Json<QuizAttempt>)> {
    let attempt = state.store.create_quiz_attempt(payload).await?;

    if attempt.correct {
        state.store.award_xp(attempt.user_id, XP_QUIZ_CORRECT).await?;
        unlock_achievements(&state, attempt.user_id).await?;
    }

    Ok((StatusCode::CREATED, Json(attempt)))
}

async fn quiz_attempts(
    State(state): State<AppState>,
    ApiPath((user_id, quiz_id)): ApiPath<(Id, Id)>,
) -> Json<Vec<QuizAttempt>> {
    Json(state.store.quiz_attempts(user_id, quiz_id).await)
}
