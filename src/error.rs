use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::ValidationErrors;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Flattens validator output into "field: message; field: message".
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid ({})", field, e.code),
            })
        })
        .collect();
    parts.sort();
    if parts.is_empty() {
        "Invalid input".to_string()
    } else {
        parts.join("; ")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, describe(errors)),
            AppError::Store(err) => match err {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                StoreError::InvalidReference { .. } | StoreError::InvalidInput(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                StoreError::Inconsistent(detail) => {
                    tracing::error!("Inconsistent store state: {}", detail);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use validator::Validate;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            response_status(AppError::NotFound("User not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            response_status(StoreError::NotFound { entity: "user", id: 1 }.into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            response_status(AppError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(
            response_status(AppError::Forbidden("admins only".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn bad_input_returns_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(StoreError::InvalidReference { entity: "quiz", id: 3 }.into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn conflict_returns_409() {
        assert_eq!(
            response_status(StoreError::Conflict("taken".into()).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn inconsistent_store_returns_500() {
        assert_eq!(
            response_status(StoreError::Inconsistent("dangling".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "title is required"))]
        title: String,
        #[validate(range(min = 1))]
        order: u32,
    }

    #[test]
    fn validation_message_names_fields() {
        let errors = Sample {
            title: String::new(),
            order: 0,
        }
        .validate()
        .unwrap_err();
        let message = describe(&errors);
        assert!(message.contains("title: title is required"));
        assert!(message.contains("order: invalid (range)"));
        assert_eq!(
            response_status(AppError::Validation(errors)),
            StatusCode::BAD_REQUEST
        );
    }
}
