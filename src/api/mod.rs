//! HTTP API endpoints
//!
//! REST handlers for the client application plus the WebSocket stream
//! and the Prometheus metrics endpoint. Handlers validate input,
//! resolve the caller through the auth extractor, call one service
//! method, and serialize the result.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use prometheus::{Encoder, TextEncoder};

use crate::AppState;

pub mod bookclubs;
pub mod hashtags;
pub mod posts;
pub mod search;
pub mod stream;
pub mod users;

/// Create the `/api` router
///
/// Every route here requires an authenticated session; handlers enforce
/// it through the `CurrentUser` extractor.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/auth/user", get(users::current_user))
        // Users
        .route("/users/:id", get(users::get_user))
        .route("/users/:id/posts", get(users::user_posts))
        .route("/users/:id/bookclubs", get(users::user_bookclubs))
        .route(
            "/users/:id/follow",
            axum::routing::post(users::follow).delete(users::unfollow),
        )
        .route("/avatar", put(users::update_avatar))
        // Posts
        .route(
            "/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/posts/:id",
            get(posts::get_post).delete(posts::delete_post),
        )
        .route(
            "/posts/:id/like",
            axum::routing::post(posts::like).delete(posts::unlike),
        )
        .route(
            "/posts/:id/repost",
            axum::routing::post(posts::repost).delete(posts::unrepost),
        )
        .route(
            "/posts/:id/comments",
            get(posts::list_comments).post(posts::create_comment),
        )
        .route("/comments/:id", delete(posts::delete_comment))
        // Search
        .route("/search/users", get(search::search_users))
        .route("/search/posts", get(search::search_posts))
        // Hashtags
        .route("/hashtags/trending", get(hashtags::trending))
        .route("/hashtags/:name/posts", get(hashtags::posts_by_tag))
        // Bookclubs
        .route(
            "/bookclubs",
            get(bookclubs::list_bookclubs).post(bookclubs::create_bookclub),
        )
        .route(
            "/bookclubs/:id",
            get(bookclubs::get_bookclub).delete(bookclubs::delete_bookclub),
        )
        .route(
            "/bookclubs/:id/join",
            axum::routing::post(bookclubs::join).delete(bookclubs::leave),
        )
}

/// Metrics endpoint handler
///
/// Returns all metrics in Prometheus text format.
async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = crate::metrics::REGISTRY.gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_text) => (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, encoder.format_type())],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

/// Create metrics router exposing the `/metrics` endpoint
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(metrics_handler))
}
