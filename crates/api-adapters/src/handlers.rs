//! # Handlers
//!
//! Thin translation between HTTP requests and `MicroblogService` calls.

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::{AppError, TweetId, UserId};
use services::MicroblogService;

use crate::dto::{
    Ack, CreateTweetRequest, FeedResponse, MediaCreated, TweetCreated, UserResponse,
};
use crate::error::ApiError;
use crate::extractors::{ApiKey, AppJson, AppPath, CurrentUser};

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: MicroblogService,
}

type ApiResult<T> = Result<T, ApiError>;

/// `GET /users/me`. The only endpoint that registers unknown keys.
pub async fn me(
    State(state): State<AppState>,
    ApiKey(key): ApiKey,
) -> ApiResult<Json<UserResponse>> {
    let profile = state.service.me(&key).await?;
    Ok(Json(UserResponse::new(profile)))
}

/// `GET /users/{id}`. Needs no credential.
pub async fn user_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<UserId>,
) -> ApiResult<Json<UserResponse>> {
    let profile = state.service.user_profile(id).await?;
    Ok(Json(UserResponse::new(profile)))
}

pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<UserId>,
) -> ApiResult<(StatusCode, Json<Ack>)> {
    state.service.follow_user(&user, id).await?;
    Ok((StatusCode::CREATED, Json(Ack::ok())))
}

pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<UserId>,
) -> ApiResult<Json<Ack>> {
    state.service.unfollow_user(&user, id).await?;
    Ok(Json(Ack::ok()))
}

/// `GET /tweets`. The feed is global; the caller only has to be known.
pub async fn list_tweets(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<Json<FeedResponse>> {
    let tweets = state.service.list_feed().await?;
    Ok(Json(FeedResponse::new(tweets)))
}

pub async fn create_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<CreateTweetRequest>,
) -> ApiResult<(StatusCode, Json<TweetCreated>)> {
    let tweet_id = state.service.create_tweet(&user, body.into()).await?;
    Ok((StatusCode::CREATED, Json(TweetCreated::new(tweet_id))))
}

pub async fn delete_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<TweetId>,
) -> ApiResult<Json<Ack>> {
    state.service.delete_tweet(&user, id).await?;
    Ok(Json(Ack::ok()))
}

pub async fn like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<TweetId>,
) -> ApiResult<(StatusCode, Json<Ack>)> {
    state.service.like_tweet(&user, id).await?;
    Ok((StatusCode::CREATED, Json(Ack::ok())))
}

pub async fn unlike(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<TweetId>,
) -> ApiResult<Json<Ack>> {
    state.service.unlike_tweet(&user, id).await?;
    Ok(Json(Ack::ok()))
}

/// `POST /medias`, multipart with a single `file` field.
pub async fn upload_media(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<MediaCreated>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("could not read upload: {e}")))?;

        let media_id = state.service.attach_media(data, &filename).await?;
        return Ok((StatusCode::CREATED, Json(MediaCreated::new(media_id))));
    }

    Err(AppError::ValidationError(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    ))
    .into())
}

/// `GET /app/images/{name}`. Serves a stored upload.
pub async fn image(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> ApiResult<Response> {
    let data = state.service.fetch_media(&name).await?;
    let content_type = mime_guess::from_path(&name).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, content_type.to_string())], data).into_response())
}
