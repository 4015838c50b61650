//! View model assembly
//!
//! Resolves lists of entities to their enriched views (author, aggregate
//! counts, viewer-relative flags) with a fixed number of queries per
//! list: one author batch, one grouped count per relation, and one
//! membership batch per viewer flag. The assembled field shape is
//! identical to assembling each row individually.

use std::collections::HashMap;

use crate::data::{
    Bookclub, BookclubCounts, BookclubView, Comment, CommentView, Database, Post, PostCounts,
    PostView, User,
};
use crate::error::AppError;

fn dedup_preserving_order(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

async fn users_by_id(db: &Database, ids: &[String]) -> Result<HashMap<String, User>, AppError> {
    let users = db.get_users_by_ids(ids).await?;
    Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
}

/// Resolve posts to full views for an optional viewer.
///
/// Posts whose author row no longer exists are dropped from the result,
/// mirroring the absence-not-error convention.
pub(crate) async fn resolve_post_views(
    db: &Database,
    posts: Vec<Post>,
    viewer_id: Option<&str>,
) -> Result<Vec<PostView>, AppError> {
    if posts.is_empty() {
        return Ok(vec![]);
    }

    let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let author_ids = dedup_preserving_order(posts.iter().map(|p| p.user_id.clone()));

    let authors = users_by_id(db, &author_ids).await?;
    let like_counts = db.count_likes_by_post(&post_ids).await?;
    let repost_counts = db.count_reposts_by_post(&post_ids).await?;
    let comment_counts = db.count_comments_by_post(&post_ids).await?;

    let (liked, reposted) = match viewer_id {
        Some(viewer) => (
            db.liked_post_ids(viewer, &post_ids).await?,
            db.reposted_post_ids(viewer, &post_ids).await?,
        ),
        None => Default::default(),
    };

    let views = posts
        .into_iter()
        .filter_map(|post| {
            let author = authors.get(&post.user_id)?.clone();
            let counts = PostCounts {
                likes: like_counts.get(&post.id).copied().unwrap_or(0),
                reposts: repost_counts.get(&post.id).copied().unwrap_or(0),
                comments: comment_counts.get(&post.id).copied().unwrap_or(0),
            };
            let is_liked = liked.contains(&post.id);
            let is_reposted = reposted.contains(&post.id);
            Some(PostView {
                post,
                author,
                counts,
                is_liked,
                is_reposted,
            })
        })
        .collect();

    Ok(views)
}

/// Resolve comments to views with their authors attached.
pub(crate) async fn resolve_comment_views(
    db: &Database,
    comments: Vec<Comment>,
) -> Result<Vec<CommentView>, AppError> {
    if comments.is_empty() {
        return Ok(vec![]);
    }

    let author_ids = dedup_preserving_order(comments.iter().map(|c| c.user_id.clone()));
    let authors = users_by_id(db, &author_ids).await?;

    let views = comments
        .into_iter()
        .filter_map(|comment| {
            let author = authors.get(&comment.user_id)?.clone();
            Some(CommentView { comment, author })
        })
        .collect();

    Ok(views)
}

/// Resolve bookclubs to full views for an optional viewer.
pub(crate) async fn resolve_bookclub_views(
    db: &Database,
    bookclubs: Vec<Bookclub>,
    viewer_id: Option<&str>,
) -> Result<Vec<BookclubView>, AppError> {
    if bookclubs.is_empty() {
        return Ok(vec![]);
    }

    let bookclub_ids: Vec<String> = bookclubs.iter().map(|b| b.id.clone()).collect();
    let creator_ids = dedup_preserving_order(bookclubs.iter().map(|b| b.creator_id.clone()));

    let creators = users_by_id(db, &creator_ids).await?;
    let member_counts = db.count_members_by_bookclub(&bookclub_ids).await?;
    let memberships = match viewer_id {
        Some(viewer) => db.member_bookclub_ids(viewer, &bookclub_ids).await?,
        None => Default::default(),
    };

    let views = bookclubs
        .into_iter()
        .filter_map(|bookclub| {
            let creator = creators.get(&bookclub.creator_id)?.clone();
            let counts = BookclubCounts {
                members: member_counts.get(&bookclub.id).copied().unwrap_or(0),
            };
            let is_member = memberships.contains(&bookclub.id);
            let is_creator = viewer_id == Some(bookclub.creator_id.as_str());
            Some(BookclubView {
                bookclub,
                creator,
                counts,
                is_member,
                is_creator,
            })
        })
        .collect();

    Ok(views)
}
