//! User endpoints
//!
//! Profile lookup with stats, per-user posts and bookclubs,
//! follow/unfollow, and avatar updates.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{BookclubService, PostService, SocialService};

/// GET /api/auth/user
///
/// The caller's own user record.
pub async fn current_user(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<crate::data::User>, AppError> {
    let user = state
        .db
        .get_user(&session.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

/// GET /api/users/:id
///
/// A user with stats and the caller's follow state.
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<crate::data::UserView>, AppError> {
    let service = SocialService::new(state.db.clone());
    let view = service
        .user_stats(&id, Some(&session.user_id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(view))
}

/// GET /api/users/:id/posts
pub async fn user_posts(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<crate::data::PostView>>, AppError> {
    let service = PostService::new(state.db.clone());
    let views = service.list_user(&id, Some(&session.user_id)).await?;
    Ok(Json(views))
}

/// GET /api/users/:id/bookclubs
pub async fn user_bookclubs(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<crate::data::BookclubView>>, AppError> {
    let service = BookclubService::new(state.db.clone());
    let views = service.list_user(&id, Some(&session.user_id)).await?;
    Ok(Json(views))
}

/// POST /api/users/:id/follow
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = SocialService::new(state.db.clone());
    service.follow(&session.user_id, &id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/users/:id/follow
pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = SocialService::new(state.db.clone());
    service.unfollow(&session.user_id, &id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Avatar update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarRequest {
    pub avatar_url: String,
}

/// PUT /api/avatar
///
/// Records an opaque image path on the caller's profile. Where the
/// image actually lives is the object store's concern.
pub async fn update_avatar(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<UpdateAvatarRequest>,
) -> Result<Json<crate::data::User>, AppError> {
    if req.avatar_url.is_empty() {
        return Err(AppError::Validation("avatarUrl is required".to_string()));
    }

    let service = SocialService::new(state.db.clone());
    let user = service
        .update_avatar(&session.user_id, &req.avatar_url)
        .await?;
    Ok(Json(user))
}
