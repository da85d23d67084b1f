//! # api-adapters
//!
//! The HTTP surface of the microblog. Routes live under `/api`; an optional
//! static directory is served for everything else.

pub mod dto;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extractors;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;

#[cfg(feature = "web-axum")]
pub use router::{api_routes, build_router, RouterOptions};

#[cfg(feature = "web-axum")]
mod router {
    use std::path::PathBuf;

    use axum::extract::DefaultBodyLimit;
    use axum::routing::{delete, get, post};
    use axum::Router;
    use tower_http::services::ServeDir;

    use crate::handlers::{self, AppState};
    use crate::middleware::{cors_policy, standard_middleware};

    /// Room for multipart boundaries and part headers on top of the file.
    const MULTIPART_OVERHEAD: usize = 16 * 1024;

    #[derive(Debug, Clone)]
    pub struct RouterOptions {
        /// Frontend directory served at `/`.
        pub static_dir: Option<PathBuf>,
        pub max_upload_bytes: usize,
        pub cors_allow_any_origin: bool,
    }

    /// The API routes, relative to their mount point.
    pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
        Router::new()
            .route("/users/me", get(handlers::me))
            .route("/users/{id}", get(handlers::user_by_id))
            .route(
                "/users/{id}/follow",
                post(handlers::follow).delete(handlers::unfollow),
            )
            .route(
                "/tweets",
                get(handlers::list_tweets).post(handlers::create_tweet),
            )
            .route("/tweets/{id}", delete(handlers::delete_tweet))
            .route(
                "/tweets/{id}/likes",
                post(handlers::like).delete(handlers::unlike),
            )
            .route(
                "/medias",
                post(handlers::upload_media)
                    .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
            )
            .route("/app/images/{name}", get(handlers::image))
    }

    /// The complete application: `/api`, the optional frontend, CORS and
    /// request tracing.
    pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
        let mut router = Router::new()
            .nest("/api", api_routes(options.max_upload_bytes))
            .with_state(state);

        if let Some(dir) = &options.static_dir {
            let frontend = ServeDir::new(dir).append_index_html_on_directories(true);
            router = router.fallback_service(frontend);
        }

        router
            .layer(cors_policy(options.cors_allow_any_origin))
            .layer(standard_middleware())
    }
}
