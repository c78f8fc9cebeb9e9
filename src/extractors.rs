use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;
use crate::store::models::{Id, Role, User};
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// JSON body that is deserialized and then validated. Handlers only ever see
/// input that passed both steps; failures become a 400 with a JSON message.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// JSON body without field validation, for small update payloads.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters with JSON error responses.
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string with JSON error responses.
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// The user named by the `X-User-Id` header, if any.
/// Identity itself is established upstream by the identity provider.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(MaybeUser(None));
        };

        let id: Id = raw
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .ok_or_else(|| AppError::BadRequest("Invalid X-User-Id header".into()))?;

        Ok(MaybeUser(state.store.get_user(id).await))
    }
}

/// Gate for admin endpoints.
///
/// With `auth.enforce_admin` off every request passes and no user is loaded.
/// With it on, the acting user must exist and have the admin role.
pub struct AdminGuard(pub Option<User>);

impl AdminGuard {
    /// Applies the admin rule to an already-resolved acting user, for
    /// handlers that only need an admin for some payloads.
    pub fn check(state: &AppState, acting: Option<User>) -> Result<Self, AppError> {
        if !state.config.auth.enforce_admin {
            return Ok(AdminGuard(None));
        }

        let user = acting.ok_or(AppError::Unauthorized)?;
        if user.role != Role::Admin {
            tracing::warn!(user_id = user.id, "Non-admin attempted admin action");
            return Err(AppError::Forbidden("Admin role required".into()));
        }

        Ok(AdminGuard(Some(user)))
    }
}

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.auth.enforce_admin {
            return Ok(AdminGuard(None));
        }

        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        AdminGuard::check(state, user)
    }
}
