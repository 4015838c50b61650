//! Data models
//!
//! Rust structs representing database entities and the derived view
//! models returned by the API. All models use ULID for IDs and chrono
//! for timestamps. JSON field names are camelCase to match the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// Created on first OAuth login (upsert by provider-prefixed id).
/// Never hard-deleted through the API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Opaque path/URL to the avatar image
    pub profile_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Post
// =============================================================================

/// A short text/image post
///
/// `word_count` is derived once at creation from the submitted content
/// and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    /// Author (owning user)
    pub user_id: String,
    pub content: String,
    /// Opaque path/URL to an attached image
    pub image_url: Option<String>,
    pub word_count: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Hashtag
// =============================================================================

/// Dictionary entry for a hashtag
///
/// Created lazily the first time any post mentions it; never deleted.
/// `name` is the lowercase canonical form without the leading `#`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hashtag {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Comment
// =============================================================================

/// A comment on a post (cascade-deleted with the post)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Bookclub
// =============================================================================

/// A bookclub centered on an indie author
///
/// The creator is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bookclub {
    pub id: String,
    pub name: String,
    pub description: String,
    pub creator_id: String,
    pub current_book: String,
    pub current_author: String,
    pub author_website: Option<String>,
    pub book_cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Bookclub membership row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookclubMember {
    pub bookclub_id: String,
    pub user_id: String,
    /// "creator" or "member"
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

/// Membership roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRole {
    Creator,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Member => "member",
        }
    }
}

// =============================================================================
// View models
// =============================================================================

/// Aggregate counts attached to a post view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCounts {
    pub likes: i64,
    pub reposts: i64,
    pub comments: i64,
}

/// A post enriched with its author, aggregate counts, and
/// viewer-relative flags
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author: User,
    #[serde(rename = "_count")]
    pub counts: PostCounts,
    pub is_liked: bool,
    pub is_reposted: bool,
}

/// A comment enriched with its author
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: User,
}

/// Aggregate counts attached to a user view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub posts: i64,
    pub following: i64,
    pub followers: i64,
}

/// A user enriched with counts and the viewer's follow state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "_count")]
    pub counts: UserCounts,
    pub is_following: bool,
}

/// Aggregate counts attached to a bookclub view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookclubCounts {
    pub members: i64,
}

/// A bookclub enriched with its creator, member count, and the viewer's
/// membership flags
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookclubView {
    #[serde(flatten)]
    pub bookclub: Bookclub,
    pub creator: User,
    #[serde(rename = "_count")]
    pub counts: BookclubCounts,
    pub is_member: bool,
    pub is_creator: bool,
}

/// One trending entry: hashtag name and its current link count
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrendingHashtag {
    pub name: String,
    pub count: i64,
}
