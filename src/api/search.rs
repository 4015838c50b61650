//! Search endpoints
//!
//! Substring search over users and posts. Queries shorter than two
//! characters return an empty list rather than an error.

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{PostService, SocialService};

const USER_SEARCH_LIMIT: usize = 20;
const POST_SEARCH_LIMIT: usize = 50;
const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

fn normalized_query(params: &SearchParams) -> Option<String> {
    let query = params.q.as_deref()?.trim().to_string();
    if query.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    Some(query)
}

/// GET /api/search/users
pub async fn search_users(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<crate::data::User>>, AppError> {
    let Some(query) = normalized_query(&params) else {
        return Ok(Json(vec![]));
    };

    let service = SocialService::new(state.db.clone());
    let users = service.search_users(&query, USER_SEARCH_LIMIT).await?;
    Ok(Json(users))
}

/// GET /api/search/posts
pub async fn search_posts(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<crate::data::PostView>>, AppError> {
    let Some(query) = normalized_query(&params) else {
        return Ok(Json(vec![]));
    };

    let service = PostService::new(state.db.clone());
    let views = service
        .search(&query, POST_SEARCH_LIMIT, Some(&session.user_id))
        .await?;
    Ok(Json(views))
}
