//! Bookclub endpoints
//!
//! Lifecycle and membership. The creator-cannot-leave and creator-only
//! deletion rules are enforced by the service; handlers only validate
//! the input shape.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::{BookclubService, NewBookclub};

const MAX_NAME_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 500;
const MAX_BOOK_CHARS: usize = 200;
const MAX_AUTHOR_CHARS: usize = 100;

fn success() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true }))
}

/// Bookclub creation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookclubRequest {
    pub name: String,
    pub description: String,
    pub current_book: String,
    pub current_author: String,
    pub author_website: Option<String>,
    pub book_cover_url: Option<String>,
}

fn required_field(
    value: &str,
    field: &str,
    max_chars: usize,
) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(())
}

fn optional_url_field(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
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

impl CreateBookclubRequest {
    fn validate(self) -> Result<NewBookclub, AppError> {
        required_field(&self.name, "name", MAX_NAME_CHARS)?;
        required_field(&self.description, "description", MAX_DESCRIPTION_CHARS)?;
        required_field(&self.current_book, "currentBook", MAX_BOOK_CHARS)?;
        required_field(&self.current_author, "currentAuthor", MAX_AUTHOR_CHARS)?;

        Ok(NewBookclub {
            name: self.name,
            description: self.description,
            current_book: self.current_book,
            current_author: self.current_author,
            author_website: optional_url_field(self.author_website, "authorWebsite")?,
            book_cover_url: optional_url_field(self.book_cover_url, "bookCoverUrl")?,
        })
    }
}

/// GET /api/bookclubs
pub async fn list_bookclubs(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<Vec<crate::data::BookclubView>>, AppError> {
    let service = BookclubService::new(state.db.clone());
    let views = service.list_all(Some(&session.user_id)).await?;
    Ok(Json(views))
}

/// POST /api/bookclubs
pub async fn create_bookclub(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<CreateBookclubRequest>,
) -> Result<Json<crate::data::Bookclub>, AppError> {
    let fields = req.validate()?;

    let service = BookclubService::new(state.db.clone());
    let bookclub = service.create(&session.user_id, fields).await?;
    Ok(Json(bookclub))
}

/// GET /api/bookclubs/:id
pub async fn get_bookclub(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<crate::data::BookclubView>, AppError> {
    let service = BookclubService::new(state.db.clone());
    let view = service
        .get_view(&id, Some(&session.user_id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(view))
}

/// DELETE /api/bookclubs/:id
///
/// Creator only.
pub async fn delete_bookclub(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = BookclubService::new(state.db.clone());
    service.delete(&id, &session.user_id).await?;
    Ok(success())
}

/// POST /api/bookclubs/:id/join
pub async fn join(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = BookclubService::new(state.db.clone());
    service.join(&session.user_id, &id).await?;
    Ok(success())
}

/// DELETE /api/bookclubs/:id/join
///
/// Rejected for the creator; they can only delete the bookclub.
pub async fn leave(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = BookclubService::new(state.db.clone());
    service.leave(&session.user_id, &id).await?;
    Ok(success())
}
