//! Request extractors: the `api-key` credential, and `Json`/`Path` wrappers
//! whose rejections use the API's error envelope.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use domains::{AppError, User};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::handlers::AppState;

pub const API_KEY_HEADER: &str = "api-key";

/// The raw `api-key` header value. Absent or empty headers are rejected
/// with `MissingCredential`.
#[derive(Debug, Clone)]
pub struct ApiKey(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(AppError::MissingCredential)?;
        Ok(ApiKey(key.to_string()))
    }
}

/// The user owning the request's `api-key`. Unknown keys are rejected with
/// `NotFound`; only `/users/me` creates users.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ApiKey(key) = ApiKey::from_request_parts(parts, state).await?;
        let user = state.service.identify(&key).await?;
        Ok(CurrentUser(user))
    }
}

/// `Json<T>` whose deserialization failures become `ValidationError`.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::ValidationError(e.body_text()))?;
        Ok(AppJson(value))
    }
}

/// `Path<T>` whose parse failures (e.g. `/tweets/abc`) become
/// `ValidationError`.
pub struct AppPath<T>(pub T);

impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| AppError::ValidationError(e.body_text()))?;
        Ok(AppPath(value))
    }
}
