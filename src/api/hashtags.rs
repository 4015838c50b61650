//! Hashtag endpoints

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::HashtagService;

const DEFAULT_TRENDING_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub limit: Option<usize>,
}

/// GET /api/hashtags/trending
///
/// Top hashtags by current link count. A missing or non-positive
/// `limit` falls back to the default of 10.
pub async fn trending(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<crate::data::TrendingHashtag>>, AppError> {
    let limit = params
        .limit
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_TRENDING_LIMIT);

    let service = HashtagService::new(state.db.clone());
    let tags = service.trending(limit).await?;
    Ok(Json(tags))
}

/// GET /api/hashtags/:name/posts
///
/// Posts carrying a tag, case-insensitive lookup. Unknown tags yield
/// an empty list.
pub async fn posts_by_tag(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<Vec<crate::data::PostView>>, AppError> {
    let service = HashtagService::new(state.db.clone());
    let views = service
        .posts_by_tag(&name, Some(&session.user_id))
        .await?;
    Ok(Json(views))
}
