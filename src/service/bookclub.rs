//! Bookclub service
//!
//! Bookclub lifecycle and membership. Creation writes the bookclub row
//! and the creator's membership in one transaction; the creator's state
//! is fixed at role `creator` from creation until deletion, and the
//! leave operation refuses to remove it.

use std::sync::Arc;

use crate::data::{Bookclub, BookclubView, Database, EntityId, MemberRole};
use crate::error::AppError;

use super::views::resolve_bookclub_views;

/// Validated bookclub fields supplied at creation
#[derive(Debug, Clone)]
pub struct NewBookclub {
    pub name: String,
    pub description: String,
    pub current_book: String,
    pub current_author: String,
    pub author_website: Option<String>,
    pub book_cover_url: Option<String>,
}

/// Bookclub service
pub struct BookclubService {
    db: Arc<Database>,
}

impl BookclubService {
    /// Create new bookclub service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a bookclub
    ///
    /// The creator's membership row (role `creator`) is inserted in the
    /// same transaction as the bookclub row; no partial state is ever
    /// observable.
    pub async fn create(
        &self,
        creator_id: &str,
        fields: NewBookclub,
    ) -> Result<Bookclub, AppError> {
        let now = chrono::Utc::now();
        let bookclub = Bookclub {
            id: EntityId::new().0,
            name: fields.name,
            description: fields.description,
            creator_id: creator_id.to_string(),
            current_book: fields.current_book,
            current_author: fields.current_author,
            author_website: fields.author_website,
            book_cover_url: fields.book_cover_url,
            created_at: now,
        };

        self.db.insert_bookclub_with_creator(&bookclub, now).await?;

        tracing::info!(bookclub_id = %bookclub.id, creator_id = %creator_id, "Bookclub created");
        Ok(bookclub)
    }

    /// Get a bookclub resolved to its full view
    pub async fn get_view(
        &self,
        bookclub_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<BookclubView>, AppError> {
        let Some(bookclub) = self.db.get_bookclub(bookclub_id).await? else {
            return Ok(None);
        };

        let mut views = resolve_bookclub_views(&self.db, vec![bookclub], viewer_id).await?;
        Ok(views.pop())
    }

    /// All bookclubs, newest first, resolved to views
    pub async fn list_all(&self, viewer_id: Option<&str>) -> Result<Vec<BookclubView>, AppError> {
        let bookclubs = self.db.get_all_bookclubs().await?;
        resolve_bookclub_views(&self.db, bookclubs, viewer_id).await
    }

    /// Bookclubs a user belongs to, newest first, resolved to views
    pub async fn list_user(
        &self,
        user_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<BookclubView>, AppError> {
        let bookclubs = self.db.get_user_bookclubs(user_id).await?;
        resolve_bookclub_views(&self.db, bookclubs, viewer_id).await
    }

    /// Join a bookclub (idempotent; joining twice is a successful no-op)
    pub async fn join(&self, user_id: &str, bookclub_id: &str) -> Result<(), AppError> {
        self.db
            .get_bookclub(bookclub_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.db
            .insert_bookclub_member(bookclub_id, user_id, MemberRole::Member, chrono::Utc::now())
            .await
    }

    /// Leave a bookclub (idempotent for non-members)
    ///
    /// The creator cannot leave; they can only delete the bookclub.
    pub async fn leave(&self, user_id: &str, bookclub_id: &str) -> Result<(), AppError> {
        let bookclub = self
            .db
            .get_bookclub(bookclub_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if bookclub.creator_id == user_id {
            return Err(AppError::Forbidden);
        }

        self.db.delete_bookclub_member(bookclub_id, user_id).await
    }

    /// Delete a bookclub (creator only; memberships cascade)
    pub async fn delete(&self, bookclub_id: &str, actor_id: &str) -> Result<(), AppError> {
        let bookclub = self
            .db
            .get_bookclub(bookclub_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if bookclub.creator_id != actor_id {
            return Err(AppError::Forbidden);
        }

        self.db.delete_bookclub(bookclub_id).await?;

        tracing::info!(bookclub_id = %bookclub_id, "Bookclub deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    use crate::data::User;

    async fn create_test_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-bookclub.db");
        let db = Database::connect(&db_path).await.unwrap();
        (Arc::new(db), temp_dir)
    }

    async fn seed_user(db: &Database, id: &str) {
        let now = Utc::now();
        db.upsert_user(&User {
            id: id.to_string(),
            email: Some(format!("{}@example.com", id)),
            first_name: Some(id.to_string()),
            last_name: None,
            profile_image_url: None,
            bio: None,
            location: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    }

    fn fields(name: &str) -> NewBookclub {
        NewBookclub {
            name: name.to_string(),
            description: "Small-press fiction".to_string(),
            current_book: "The Long Way".to_string(),
            current_author: "B. Chambers".to_string(),
            author_website: None,
            book_cover_url: None,
        }
    }

    #[tokio::test]
    async fn membership_lifecycle_scenario() {
        let (db, _temp_dir) = create_test_db().await;
        seed_user(&db, "u").await;
        seed_user(&db, "v").await;
        let service = BookclubService::new(db.clone());

        // U creates bookclub B: exactly one member with role creator
        let bookclub = service.create("u", fields("Indie Reads")).await.unwrap();
        let view = service
            .get_view(&bookclub.id, Some("u"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.counts.members, 1);
        assert!(view.is_member);
        assert!(view.is_creator);

        // V joins: member count 2, V is a member but not the creator
        service.join("v", &bookclub.id).await.unwrap();
        service.join("v", &bookclub.id).await.unwrap(); // idempotent
        let view = service
            .get_view(&bookclub.id, Some("v"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.counts.members, 2);
        assert!(view.is_member);
        assert!(!view.is_creator);

        // U attempts to leave: rejected
        let rejected = service.leave("u", &bookclub.id).await.unwrap_err();
        assert!(matches!(rejected, AppError::Forbidden));

        // V leaves: member count back to 1
        service.leave("v", &bookclub.id).await.unwrap();
        let view = service
            .get_view(&bookclub.id, Some("v"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.counts.members, 1);
        assert!(!view.is_member);
    }

    #[tokio::test]
    async fn join_and_leave_missing_bookclub_is_not_found() {
        let (db, _temp_dir) = create_test_db().await;
        seed_user(&db, "u").await;
        let service = BookclubService::new(db);

        assert!(matches!(
            service.join("u", "missing").await.unwrap_err(),
            AppError::NotFound
        ));
        assert!(matches!(
            service.leave("u", "missing").await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[tokio::test]
    async fn delete_is_creator_only_and_cascades() {
        let (db, _temp_dir) = create_test_db().await;
        seed_user(&db, "u").await;
        seed_user(&db, "v").await;
        let service = BookclubService::new(db.clone());

        let bookclub = service.create("u", fields("Indie Reads")).await.unwrap();
        service.join("v", &bookclub.id).await.unwrap();

        let forbidden = service.delete(&bookclub.id, "v").await.unwrap_err();
        assert!(matches!(forbidden, AppError::Forbidden));

        service.delete(&bookclub.id, "u").await.unwrap();
        assert!(service.get_view(&bookclub.id, None).await.unwrap().is_none());
        assert!(service.list_user("v", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_user_returns_memberships_only() {
        let (db, _temp_dir) = create_test_db().await;
        seed_user(&db, "u").await;
        seed_user(&db, "v").await;
        let service = BookclubService::new(db.clone());

        let own = service.create("u", fields("First Club")).await.unwrap();
        let other = service.create("v", fields("Second Club")).await.unwrap();

        let clubs = service.list_user("u", Some("u")).await.unwrap();
        assert_eq!(clubs.len(), 1);
        assert_eq!(clubs[0].bookclub.id, own.id);

        service.join("u", &other.id).await.unwrap();
        let clubs = service.list_user("u", Some("u")).await.unwrap();
        assert_eq!(clubs.len(), 2);
    }
}
