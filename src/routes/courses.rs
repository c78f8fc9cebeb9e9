use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::extractors::{ApiPath, ValidJson};
use crate::state::AppState;
use crate::store::models::{Course, Id, Lesson, NewCourse, NewLesson, NewQuiz, Quiz};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/{id}", get(get_course))
        .route("/api/courses/{id}/lessons", get(course_lessons))
        .route("/api/lessons", post(create_lesson))
        .route("/api/lessons/{id}", get(get_lesson))
        .route("/api/lessons/{id}/quizzes", get(lesson_quizzes))
        .route("/api/quizzes", post(create_quiz))
        .route("/api/quizzes/{id}", get(get_quiz))
}

async fn list_courses(State(state): State<AppState>) -> Json<Vec<Course>> {
    Json(state.store.list_courses().await)
}

async fn get_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
) -> AppResult<Json<Course>> {
    state
        .store
        .get_course(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

async fn create_course(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewCourse>,
) -> AppResult<(StatusCode, Json<Course>)> {
    let course = state.store.create_course(payload).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/courses/{id}/lessons
/// Lessons in their course order
async fn course_lessons(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<Id>,
) -> Json<Vec<Lesson>> {
    Json(state.store.lessons_by_course(course_id).await)
}

async fn get_lesson(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
) -> AppResult<Json<Lesson>> {
    state
        .store
        .get_lesson(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Lesson not found".into()))
}

async fn create_lesson(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewLesson>,
) -> AppResult<(StatusCode, Json<Lesson>)> {
    let lesson = state.store.create_lesson(payload).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

async fn lesson_quizzes(
    State(state): State<AppState>,
    ApiPath(lesson_id): ApiPath<Id>,
) -> Json<Vec<Quiz>> {
    Json(state.store.quizzes_by_lesson(lesson_id).await)
}

async fn get_quiz(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Id>,
) -> AppResult<Json<Quiz>> {
    state
        .store
        .get_quiz(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Quiz not found".into()))
}

async fn create_quiz(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<NewQuiz>,
) -> AppResult<(StatusCode, Json<Quiz>)> {
    let quiz = state.store.create_quiz(payload).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}
