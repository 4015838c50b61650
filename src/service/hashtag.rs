//! Hashtag service
//!
//! Derives the hashtag index from post text and serves trending and
//! tag-lookup queries. Tags are immutable once created; the dictionary
//! is keyed by the literal lowercase string, so there is no fuzzy
//! matching, stemming, or merging.

use std::collections::HashSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::data::{Database, EntityId, Hashtag, PostView, TrendingHashtag};
use crate::error::AppError;

use super::views::resolve_post_views;

lazy_static! {
    /// A `#` immediately followed by one or more word characters.
    static ref HASHTAG_PATTERN: Regex = Regex::new(r"#(\w+)").expect("pattern compiles");
}

/// Extract hashtag names from content: lowercase, deduplicated
/// case-insensitively, in order of first appearance.
pub(crate) fn extract_hashtags(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    HASHTAG_PATTERN
        .captures_iter(content)
        .map(|captures| captures[1].to_lowercase())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Hashtag service
pub struct HashtagService {
    db: Arc<Database>,
}

impl HashtagService {
    /// Create new hashtag service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Index a post's hashtags
    ///
    /// For each unique tag in the content: insert the dictionary entry
    /// if absent (re-reading the existing row on conflict), then link
    /// the post to it. Both writes are insert-if-absent, so re-indexing
    /// the same post is harmless.
    ///
    /// # Returns
    /// Number of tags linked
    pub async fn index_post(&self, post_id: &str, content: &str) -> Result<usize, AppError> {
        let names = extract_hashtags(content);
        if names.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now();
        for name in &names {
            let hashtag = self
                .db
                .insert_hashtag_if_absent(&Hashtag {
                    id: EntityId::new().0,
                    name: name.clone(),
                    created_at: now,
                })
                .await?;

            self.db
                .insert_post_hashtag(post_id, &hashtag.id, now)
                .await?;
        }

        tracing::debug!(post_id = %post_id, tags = names.len(), "Indexed post hashtags");
        Ok(names.len())
    }

    /// Top hashtags by current link count
    ///
    /// Tags with zero links are excluded even though their dictionary
    /// rows still exist; ties break on name ascending.
    pub async fn trending(&self, limit: usize) -> Result<Vec<TrendingHashtag>, AppError> {
        self.db.get_trending_hashtags(limit).await
    }

    /// Posts carrying a tag, newest first, resolved to full views
    ///
    /// Lookup is case-insensitive exact; an unknown tag yields an empty
    /// list, not an error.
    pub async fn posts_by_tag(
        &self,
        name: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<PostView>, AppError> {
        let canonical = name.to_lowercase();
        let Some(hashtag) = self.db.get_hashtag_by_name(&canonical).await? else {
            return Ok(vec![]);
        };

        let posts = self.db.get_posts_by_hashtag(&hashtag.id).await?;
        resolve_post_views(&self.db, posts, viewer_id).await
    }
}
