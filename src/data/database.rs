//! SQLite database operations
//!
//! All database access goes through this module.
//! Idempotent membership writes (likes, reposts, follows, bookclub
//! members, post-hashtag links) rely on primary-key constraints and
//! `INSERT OR IGNORE`, never on check-then-insert.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// SQLite limits the number of bound parameters, so IN-queries are
/// chunked at this size.
const IN_QUERY_CHUNK_SIZE: usize = 100;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// Foreign keys are enabled on every connection: the cascade rules
    /// in the schema carry the row-lifecycle invariants (deleting a post
    /// removes its likes/reposts/comments/hashtag links).
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Get user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get multiple users by IDs (batch operation to avoid N+1)
    pub async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut all_users = Vec::new();

        for chunk in ids.chunks(IN_QUERY_CHUNK_SIZE) {
            let mut query_builder =
                QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE id IN (");
            {
                let mut separated = query_builder.separated(", ");
                for id in chunk {
                    separated.push_bind(id);
                }
            }
            query_builder.push(")");

            let users = query_builder
                .build_query_as::<User>()
                .fetch_all(&self.pool)
                .await?;
            all_users.extend(users);
        }

        Ok(all_users)
    }

    /// Create or update a user
    ///
    /// Insert-or-update keyed on the user ID. A conflicting insert
    /// refreshes the profile fields and `updated_at` but preserves
    /// `created_at`.
    ///
    /// # Returns
    /// The stored user row
    pub async fn upsert_user(&self, user: &User) -> Result<User, AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, profile_image_url,
                bio, location, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                profile_image_url = excluded.profile_image_url,
                bio = excluded.bio,
                location = excluded.location,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.profile_image_url)
        .bind(&user.bio)
        .bind(&user.location)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        let stored = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&user.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    /// Update a user's avatar path by user ID.
    ///
    /// # Returns
    /// `true` if updated, `false` if no matching user row exists.
    pub async fn update_user_avatar(
        &self,
        user_id: &str,
        profile_image_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET profile_image_url = ?, updated_at = ? WHERE id = ?",
        )
        .bind(profile_image_url)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Search users by name or email substring (case-insensitive)
    pub async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<User>, AppError> {
        let pattern = format!("%{}%", query);
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE first_name LIKE ? OR last_name LIKE ? OR email LIKE ?
            LIMIT ?
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count posts authored by a user.
    pub async fn count_user_posts(&self, user_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Get post by ID
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// Insert a new post
    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, content, image_url, word_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.word_count)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get all posts, newest first
    pub async fn get_all_posts(&self) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    /// Get a user's posts, newest first
    pub async fn get_user_posts(&self, user_id: &str) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Search posts by content substring, newest first
    pub async fn search_posts(&self, query: &str, limit: usize) -> Result<Vec<Post>, AppError> {
        let pattern = format!("%{}%", query);
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE content LIKE ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Delete post by ID
    ///
    /// Likes, reposts, comments, and hashtag links are removed by the
    /// store's cascade rules, not by explicit statements here.
    pub async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Likes / Reposts
    // =========================================================================

    /// Insert like (insert-if-absent; duplicate is a no-op)
    pub async fn insert_like(
        &self,
        user_id: &str,
        post_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(post_id)
            .bind(created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete like (delete-if-present; missing row is a no-op)
    pub async fn delete_like(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Check if a user has liked a post
    pub async fn is_liked(&self, user_id: &str, post_id: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = ? AND post_id = ?")
                .bind(user_id)
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Insert repost (insert-if-absent; duplicate is a no-op)
    pub async fn insert_repost(
        &self,
        user_id: &str,
        post_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR IGNORE INTO reposts (user_id, post_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(post_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete repost (delete-if-present; missing row is a no-op)
    pub async fn delete_repost(&self, user_id: &str, post_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reposts WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Check if a user has reposted a post
    pub async fn is_reposted(&self, user_id: &str, post_id: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reposts WHERE user_id = ? AND post_id = ?")
                .bind(user_id)
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Count rows of a membership table grouped by post, restricted to
    /// the given post IDs.
    async fn count_by_post_batch(
        &self,
        table: &str,
        post_ids: &[String],
    ) -> Result<HashMap<String, i64>, AppError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut counts = HashMap::new();

        for chunk in post_ids.chunks(IN_QUERY_CHUNK_SIZE) {
            let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
                "SELECT post_id, COUNT(*) AS count FROM {} WHERE post_id IN (",
                table
            ));
            {
                let mut separated = query_builder.separated(", ");
                for post_id in chunk {
                    separated.push_bind(post_id);
                }
            }
            query_builder.push(") GROUP BY post_id");

            let rows = query_builder
                .build_query_as::<(String, i64)>()
                .fetch_all(&self.pool)
                .await?;
            counts.extend(rows);
        }

        Ok(counts)
    }

    /// Like counts for the given posts (one grouped query per chunk)
    pub async fn count_likes_by_post(
        &self,
        post_ids: &[String],
    ) -> Result<HashMap<String, i64>, AppError> {
        self.count_by_post_batch("likes", post_ids).await
    }

    /// Repost counts for the given posts
    pub async fn count_reposts_by_post(
        &self,
        post_ids: &[String],
    ) -> Result<HashMap<String, i64>, AppError> {
        self.count_by_post_batch("reposts", post_ids).await
    }

    /// Comment counts for the given posts
    pub async fn count_comments_by_post(
        &self,
        post_ids: &[String],
    ) -> Result<HashMap<String, i64>, AppError> {
        self.count_by_post_batch("comments", post_ids).await
    }

    /// Subset of the given posts the user is a member of in `table`.
    async fn membership_post_ids_batch(
        &self,
        table: &str,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut members = HashSet::new();

        for chunk in post_ids.chunks(IN_QUERY_CHUNK_SIZE) {
            let mut query_builder = QueryBuilder::<Sqlite>::new(format!(
                "SELECT post_id FROM {} WHERE user_id = ",
                table
            ));
            query_builder.push_bind(user_id);
            query_builder.push(" AND post_id IN (");
            {
                let mut separated = query_builder.separated(", ");
                for post_id in chunk {
                    separated.push_bind(post_id);
                }
            }
            query_builder.push(")");

            let ids = query_builder
                .build_query_scalar::<String>()
                .fetch_all(&self.pool)
                .await?;
            members.extend(ids);
        }

        Ok(members)
    }

    /// Posts among the given IDs that the user has liked
    pub async fn liked_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        self.membership_post_ids_batch("likes", user_id, post_ids)
            .await
    }

    /// Posts among the given IDs that the user has reposted
    pub async fn reposted_post_ids(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        self.membership_post_ids_batch("reposts", user_id, post_ids)
            .await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Insert a new comment
    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO comments (id, user_id, post_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.user_id)
        .bind(&comment.post_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get comment by ID
    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    /// Get comments for a post, newest first
    pub async fn get_post_comments(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE post_id = ? ORDER BY created_at DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Delete comment by ID
    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Follow relationships
    // =========================================================================

    /// Insert follow edge (insert-if-absent; duplicate is a no-op)
    pub async fn insert_follow(
        &self,
        follower_id: &str,
        following_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower_id)
        .bind(following_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete follow edge (delete-if-present; missing row is a no-op)
    pub async fn delete_follow(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Check if one user follows another
    pub async fn is_following(
        &self,
        follower_id: &str,
        following_id: &str,
    ) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND following_id = ?",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Count accounts a user follows.
    pub async fn count_following(&self, user_id: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count accounts following a user.
    pub async fn count_followers(&self, user_id: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE following_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // =========================================================================
    // Hashtags
    // =========================================================================

    /// Insert a hashtag dictionary entry if absent, then read back the
    /// canonical row.
    ///
    /// The insert is atomic at the statement level; the conflict path
    /// falls back to the read, so under concurrent identical inserts
    /// both callers observe the same row.
    pub async fn insert_hashtag_if_absent(&self, hashtag: &Hashtag) -> Result<Hashtag, AppError> {
        sqlx::query("INSERT OR IGNORE INTO hashtags (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&hashtag.id)
            .bind(&hashtag.name)
            .bind(hashtag.created_at)
            .execute(&self.pool)
            .await?;

        let stored = sqlx::query_as::<_, Hashtag>("SELECT * FROM hashtags WHERE name = ?")
            .bind(&hashtag.name)
            .fetch_one(&self.pool)
            .await?;

        Ok(stored)
    }

    /// Get hashtag by exact (lowercase) name
    pub async fn get_hashtag_by_name(&self, name: &str) -> Result<Option<Hashtag>, AppError> {
        let hashtag = sqlx::query_as::<_, Hashtag>("SELECT * FROM hashtags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(hashtag)
    }

    /// Link a post to a hashtag (insert-if-absent; duplicate is a no-op)
    pub async fn insert_post_hashtag(
        &self,
        post_id: &str,
        hashtag_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR IGNORE INTO post_hashtags (post_id, hashtag_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(post_id)
        .bind(hashtag_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Hashtags ordered by current link count, descending.
    ///
    /// The inner join excludes dictionary entries with zero links; ties
    /// break on name ascending so the order is deterministic.
    pub async fn get_trending_hashtags(
        &self,
        limit: usize,
    ) -> Result<Vec<TrendingHashtag>, AppError> {
        let trending = sqlx::query_as::<_, TrendingHashtag>(
            r#"
            SELECT h.name AS name, COUNT(ph.post_id) AS count
            FROM hashtags h
            JOIN post_hashtags ph ON ph.hashtag_id = h.id
            GROUP BY h.id, h.name
            ORDER BY count DESC, h.name ASC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(trending)
    }

    /// Posts linked to a hashtag, newest first
    pub async fn get_posts_by_hashtag(&self, hashtag_id: &str) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.* FROM posts p
            JOIN post_hashtags ph ON ph.post_id = p.id
            WHERE ph.hashtag_id = ?
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(hashtag_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Count links for a post (used by tests to observe cascades)
    pub async fn count_post_hashtag_links(&self, post_id: &str) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post_hashtags WHERE post_id = ?")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // =========================================================================
    // Bookclubs
    // =========================================================================

    /// Insert a bookclub and its creator membership atomically.
    ///
    /// Uses an IMMEDIATE transaction so no caller can observe the
    /// bookclub without its creator member row.
    pub async fn insert_bookclub_with_creator(
        &self,
        bookclub: &Bookclub,
        joined_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<(), AppError> = async {
            sqlx::query(
                r#"
                INSERT INTO bookclubs (
                    id, name, description, creator_id, current_book,
                    current_author, author_website, book_cover_url, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&bookclub.id)
            .bind(&bookclub.name)
            .bind(&bookclub.description)
            .bind(&bookclub.creator_id)
            .bind(&bookclub.current_book)
            .bind(&bookclub.current_author)
            .bind(&bookclub.author_website)
            .bind(&bookclub.book_cover_url)
            .bind(bookclub.created_at)
            .execute(&mut *conn)
            .await?;

            sqlx::query(
                "INSERT INTO bookclub_members (bookclub_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
            )
            .bind(&bookclub.id)
            .bind(&bookclub.creator_id)
            .bind(MemberRole::Creator.as_str())
            .bind(joined_at)
            .execute(&mut *conn)
            .await?;

            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(())
            }
            Err(error) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(error)
            }
        }
    }

    /// Get bookclub by ID
    pub async fn get_bookclub(&self, id: &str) -> Result<Option<Bookclub>, AppError> {
        let bookclub = sqlx::query_as::<_, Bookclub>("SELECT * FROM bookclubs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bookclub)
    }

    /// Get all bookclubs, newest first
    pub async fn get_all_bookclubs(&self) -> Result<Vec<Bookclub>, AppError> {
        let bookclubs =
            sqlx::query_as::<_, Bookclub>("SELECT * FROM bookclubs ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(bookclubs)
    }

    /// Bookclubs a user is a member of, newest first
    pub async fn get_user_bookclubs(&self, user_id: &str) -> Result<Vec<Bookclub>, AppError> {
        let bookclubs = sqlx::query_as::<_, Bookclub>(
            r#"
            SELECT b.* FROM bookclubs b
            JOIN bookclub_members m ON m.bookclub_id = b.id
            WHERE m.user_id = ?
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookclubs)
    }

    /// Insert a membership row (insert-if-absent; duplicate is a no-op)
    pub async fn insert_bookclub_member(
        &self,
        bookclub_id: &str,
        user_id: &str,
        role: MemberRole,
        joined_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR IGNORE INTO bookclub_members (bookclub_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(bookclub_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(joined_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a membership row (delete-if-present; missing row is a no-op)
    pub async fn delete_bookclub_member(
        &self,
        bookclub_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM bookclub_members WHERE bookclub_id = ? AND user_id = ?")
            .bind(bookclub_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get a single membership row
    pub async fn get_bookclub_member(
        &self,
        bookclub_id: &str,
        user_id: &str,
    ) -> Result<Option<BookclubMember>, AppError> {
        let member = sqlx::query_as::<_, BookclubMember>(
            "SELECT * FROM bookclub_members WHERE bookclub_id = ? AND user_id = ?",
        )
        .bind(bookclub_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Count members of a bookclub.
    pub async fn count_bookclub_members(&self, bookclub_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookclub_members WHERE bookclub_id = ?",
        )
        .bind(bookclub_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Member counts for the given bookclubs (one grouped query per chunk)
    pub async fn count_members_by_bookclub(
        &self,
        bookclub_ids: &[String],
    ) -> Result<HashMap<String, i64>, AppError> {
        if bookclub_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut counts = HashMap::new();

        for chunk in bookclub_ids.chunks(IN_QUERY_CHUNK_SIZE) {
            let mut query_builder = QueryBuilder::<Sqlite>::new(
                "SELECT bookclub_id, COUNT(*) AS count FROM bookclub_members WHERE bookclub_id IN (",
            );
            {
                let mut separated = query_builder.separated(", ");
                for bookclub_id in chunk {
                    separated.push_bind(bookclub_id);
                }
            }
            query_builder.push(") GROUP BY bookclub_id");

            let rows = query_builder
                .build_query_as::<(String, i64)>()
                .fetch_all(&self.pool)
                .await?;
            counts.extend(rows);
        }

        Ok(counts)
    }

    /// Bookclubs among the given IDs the user is a member of
    pub async fn member_bookclub_ids(
        &self,
        user_id: &str,
        bookclub_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if bookclub_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut members = HashSet::new();

        for chunk in bookclub_ids.chunks(IN_QUERY_CHUNK_SIZE) {
            let mut query_builder =
                QueryBuilder::<Sqlite>::new("SELECT bookclub_id FROM bookclub_members WHERE user_id = ");
            query_builder.push_bind(user_id);
            query_builder.push(" AND bookclub_id IN (");
            {
                let mut separated = query_builder.separated(", ");
                for bookclub_id in chunk {
                    separated.push_bind(bookclub_id);
                }
            }
            query_builder.push(")");

            let ids = query_builder
                .build_query_scalar::<String>()
                .fetch_all(&self.pool)
                .await?;
            members.extend(ids);
        }

        Ok(members)
    }

    /// Delete bookclub by ID
    ///
    /// Membership rows are removed by cascade.
    pub async fn delete_bookclub(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM bookclubs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
