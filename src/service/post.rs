//! Post service
//!
//! Handles post operations including create, delete, view assembly,
//! and the idempotent like/repost toggles, plus comments.

use std::sync::Arc;

use crate::data::{Comment, CommentView, Database, EntityId, Post, PostView};
use crate::error::AppError;

use super::views::{resolve_comment_views, resolve_post_views};

/// Number of non-empty whitespace-delimited tokens in the trimmed content.
///
/// Computed once at creation and stored; never recomputed.
pub(crate) fn count_words(content: &str) -> i64 {
    content.trim().split_whitespace().count() as i64
}

/// Post service
pub struct PostService {
    db: Arc<Database>,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // =========================================================================
    // CRUD Operations
    // =========================================================================

    /// Create a new post
    ///
    /// Length validation happens at the API boundary; this stores
    /// whatever it is given and derives the word count.
    pub async fn create(
        &self,
        author_id: &str,
        content: String,
        image_url: Option<String>,
    ) -> Result<Post, AppError> {
        let post = Post {
            id: EntityId::new().0,
            user_id: author_id.to_string(),
            word_count: count_words(&content),
            content,
            image_url,
            created_at: chrono::Utc::now(),
        };

        self.db.insert_post(&post).await?;
        Ok(post)
    }

    /// Get a post resolved to its full view
    ///
    /// # Returns
    /// `None` if the post no longer exists (absence, not error).
    pub async fn get_view(
        &self,
        post_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<PostView>, AppError> {
        let Some(post) = self.db.get_post(post_id).await? else {
            return Ok(None);
        };

        let mut views = resolve_post_views(&self.db, vec![post], viewer_id).await?;
        Ok(views.pop())
    }

    /// All posts, newest first, resolved to views
    pub async fn list_all(&self, viewer_id: Option<&str>) -> Result<Vec<PostView>, AppError> {
        let posts = self.db.get_all_posts().await?;
        resolve_post_views(&self.db, posts, viewer_id).await
    }

    /// A user's posts, newest first, resolved to views
    pub async fn list_user(
        &self,
        author_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<PostView>, AppError> {
        let posts = self.db.get_user_posts(author_id).await?;
        resolve_post_views(&self.db, posts, viewer_id).await
    }

    /// Posts whose content matches the query, resolved to views
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        viewer_id: Option<&str>,
    ) -> Result<Vec<PostView>, AppError> {
        let posts = self.db.search_posts(query, limit).await?;
        resolve_post_views(&self.db, posts, viewer_id).await
    }

    /// Delete a post
    ///
    /// Only the author may delete. Dependent like/repost/comment/link
    /// rows are removed by the store's cascade rules.
    pub async fn delete(&self, post_id: &str, actor_id: &str) -> Result<(), AppError> {
        let post = self.db.get_post(post_id).await?.ok_or(AppError::NotFound)?;
        if post.user_id != actor_id {
            return Err(AppError::Forbidden);
        }

        self.db.delete_post(post_id).await?;
        Ok(())
    }

    // =========================================================================
    // Like / Repost toggles
    // =========================================================================

    /// Like a post (idempotent; liking twice is a successful no-op)
    pub async fn like(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        self.ensure_post_exists(post_id).await?;
        self.db.insert_like(user_id, post_id, chrono::Utc::now()).await
    }

    /// Unlike a post (idempotent; unliking a never-liked post succeeds)
    pub async fn unlike(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        self.db.delete_like(user_id, post_id).await
    }

    /// Repost a post (idempotent)
    pub async fn repost(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        self.ensure_post_exists(post_id).await?;
        self.db
            .insert_repost(user_id, post_id, chrono::Utc::now())
            .await
    }

    /// Undo repost (idempotent)
    pub async fn unrepost(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        self.db.delete_repost(user_id, post_id).await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Comment on a post
    pub async fn create_comment(
        &self,
        user_id: &str,
        post_id: &str,
        content: String,
    ) -> Result<Comment, AppError> {
        self.ensure_post_exists(post_id).await?;

        let comment = Comment {
            id: EntityId::new().0,
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            content,
            created_at: chrono::Utc::now(),
        };

        self.db.insert_comment(&comment).await?;
        Ok(comment)
    }

    /// Comments on a post, newest first, with authors attached
    pub async fn comments(&self, post_id: &str) -> Result<Vec<CommentView>, AppError> {
        let comments = self.db.get_post_comments(post_id).await?;
        resolve_comment_views(&self.db, comments).await
    }

    /// Delete a comment (author only)
    pub async fn delete_comment(&self, comment_id: &str, actor_id: &str) -> Result<(), AppError> {
        let comment = self
            .db
            .get_comment(comment_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if comment.user_id != actor_id {
            return Err(AppError::Forbidden);
        }

        self.db.delete_comment(comment_id).await?;
        Ok(())
    }

    async fn ensure_post_exists(&self, post_id: &str) -> Result<(), AppError> {
        self.db
            .get_post(post_id)
            .await?
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}
