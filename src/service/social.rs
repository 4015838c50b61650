//! Social graph service
//!
//! Follow/unfollow and the derived user stats view. The self-follow
//! guard lives here, inside the operation, so no caller has to
//! remember it; the data layer itself stays permissive.

use std::sync::Arc;

use crate::data::{Database, User, UserCounts, UserView};
use crate::error::AppError;

/// Social graph service
pub struct SocialService {
    db: Arc<Database>,
}

impl SocialService {
    /// Create new social service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Follow a user (idempotent; following twice is a successful no-op)
    ///
    /// Rejects self-follows and unknown targets.
    pub async fn follow(&self, follower_id: &str, following_id: &str) -> Result<(), AppError> {
        if follower_id == following_id {
            return Err(AppError::Validation(
                "Cannot follow yourself".to_string(),
            ));
        }

        self.db
            .get_user(following_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.db
            .insert_follow(follower_id, following_id, chrono::Utc::now())
            .await
    }

    /// Unfollow a user (idempotent; no existence check)
    pub async fn unfollow(&self, follower_id: &str, following_id: &str) -> Result<(), AppError> {
        self.db.delete_follow(follower_id, following_id).await
    }

    /// A user with post/following/follower counts and the viewer's
    /// follow state
    ///
    /// `is_following` is false when the viewer is absent or is the user
    /// themselves.
    pub async fn user_stats(
        &self,
        user_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<UserView>, AppError> {
        let Some(user) = self.db.get_user(user_id).await? else {
            return Ok(None);
        };

        let counts = UserCounts {
            posts: self.db.count_user_posts(user_id).await?,
            following: self.db.count_following(user_id).await?,
            followers: self.db.count_followers(user_id).await?,
        };

        let is_following = match viewer_id {
            Some(viewer) if viewer != user_id => self.db.is_following(viewer, user_id).await?,
            _ => false,
        };

        Ok(Some(UserView {
            user,
            counts,
            is_following,
        }))
    }

    /// Search users by name or email substring
    pub async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<User>, AppError> {
        self.db.search_users(query, limit).await
    }

    /// Record a new avatar path for a user
    pub async fn update_avatar(&self, user_id: &str, avatar_url: &str) -> Result<User, AppError> {
        let updated = self
            .db
            .update_user_avatar(user_id, avatar_url, chrono::Utc::now())
            .await?;
        if !updated {
            return Err(AppError::NotFound);
        }

        self.db.get_user(user_id).await?.ok_or(AppError::NotFound)
    }
}
