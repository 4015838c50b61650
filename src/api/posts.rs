//! Post endpoints
//!
//! Feed listing, creation (with hashtag indexing and realtime
//! broadcast), deletion, like/repost toggles, and comments.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{COMMENTS_CREATED_TOTAL, HASHTAGS_INDEXED_TOTAL, POSTS_CREATED_TOTAL};
use crate::service::{HashtagService, PostService};

/// Character cap enforced at the boundary; roughly the 1000-word limit
/// the client advertises.
const MAX_POST_CONTENT_CHARS: usize = 6000;

fn success() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

/// Normalize an optional URL field: empty strings collapse to `None`,
/// anything else must parse.
fn normalize_url_field(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => {
            url::Url::parse(&raw)
                .map_err(|_| AppError::Validation(format!("{} must be a valid URL", field)))?;
            Ok(Some(raw))
        }
    }
}

/// Post creation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    pub image_url: Option<String>,
}

/// GET /api/posts
///
/// All posts, newest first, resolved for the caller.
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<Vec<crate::data::PostView>>, AppError> {
    let service = PostService::new(state.db.clone());
    let views = service.list_all(Some(&session.user_id)).await?;
    Ok(Json(views))
}

/// POST /api/posts
///
/// Creates a post, indexes its hashtags, broadcasts the resolved view
/// to connected clients, and returns it.
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<crate::data::PostView>, AppError> {
    if req.content.is_empty() {
        return Err(AppError::Validation("Post cannot be empty".to_string()));
    }
    if req.content.chars().count() > MAX_POST_CONTENT_CHARS {
        return Err(AppError::Validation(
            "Post exceeds 1000 word limit".to_string(),
        ));
    }
    let image_url = normalize_url_field(req.image_url, "imageUrl")?;

    let service = PostService::new(state.db.clone());
    let hashtags = HashtagService::new(state.db.clone());

    let post = service
        .create(&session.user_id, req.content, image_url)
        .await?;

    let indexed = hashtags.index_post(&post.id, &post.content).await?;
    HASHTAGS_INDEXED_TOTAL.inc_by(indexed as u64);

    let view = service
        .get_view(&post.id, Some(&session.user_id))
        .await?
        .ok_or(AppError::NotFound)?;

    // Best-effort fan-out to every connected viewer
    state.broadcaster.broadcast_new_post(&view)?;
    POSTS_CREATED_TOTAL.inc();

    Ok(Json(view))
}

/// GET /api/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<crate::data::PostView>, AppError> {
    let service = PostService::new(state.db.clone());
    let view = service
        .get_view(&id, Some(&session.user_id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(view))
}

/// DELETE /api/posts/:id
///
/// Author only.
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = PostService::new(state.db.clone());
    service.delete(&id, &session.user_id).await?;
    Ok(success())
}

/// POST /api/posts/:id/like
pub async fn like(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = PostService::new(state.db.clone());
    service.like(&session.user_id, &id).await?;
    Ok(success())
}

/// DELETE /api/posts/:id/like
pub async fn unlike(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = PostService::new(state.db.clone());
    service.unlike(&session.user_id, &id).await?;
    Ok(success())
}

/// POST /api/posts/:id/repost
pub async fn repost(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = PostService::new(state.db.clone());
    service.repost(&session.user_id, &id).await?;
    Ok(success())
}

/// DELETE /api/posts/:id/repost
pub async fn unrepost(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = PostService::new(state.db.clone());
    service.unrepost(&session.user_id, &id).await?;
    Ok(success())
}

/// Comment creation request
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// GET /api/posts/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<crate::data::CommentView>>, AppError> {
    let service = PostService::new(state.db.clone());
    let comments = service.comments(&id).await?;
    Ok(Json(comments))
}

/// POST /api/posts/:id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<crate::data::Comment>, AppError> {
    if req.content.is_empty() {
        return Err(AppError::Validation(
            "Comment cannot be empty".to_string(),
        ));
    }

    let service = PostService::new(state.db.clone());
    let comment = service
        .create_comment(&session.user_id, &id, req.content)
        .await?;
    COMMENTS_CREATED_TOTAL.inc();

    Ok(Json(comment))
}

/// DELETE /api/comments/:id
///
/// Author only.
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = PostService::new(state.db.clone());
    service.delete_comment(&id, &session.user_id).await?;
    Ok(success())
}
