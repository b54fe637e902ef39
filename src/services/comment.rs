//! Story comments — a flat list with one level of replies.
//!
//! DESIGN
//! ======
//! Comments are fetched in two passes (top-level newest-first, replies
//! oldest-first) and joined in process, the same shape the web client
//! assembled. Replies cannot be replied to: a comment whose parent is
//! itself a reply is rejected at insert time.

use std::collections::HashMap;

use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("story not found: {0}")]
    StoryNotFound(Uuid),
    #[error("comment not found: {0}")]
    CommentNotFound(Uuid),
    #[error("comments are disabled for this story")]
    CommentsDisabled,
    #[error("comment text is empty")]
    EmptyText,
    #[error("invalid parent comment")]
    InvalidParent,
    #[error("not allowed to delete this comment")]
    Forbidden,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub story_id: Uuid,
    pub author: CommentAuthor,
    pub text: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: String,
    /// Always empty on replies; only top-level comments carry children.
    pub replies: Vec<CommentNode>,
}

fn comment_node(r: &sqlx::postgres::PgRow) -> CommentNode {
    CommentNode {
        id: r.get("id"),
        story_id: r.get("story_id"),
        author: CommentAuthor {
            id: r.get("author_id"),
            username: r.get("username"),
            avatar_url: r.get("avatar_url"),
        },
        text: r.get("text"),
        parent_comment_id: r.get("parent_comment_id"),
        created_at: r.get("created_at"),
        replies: Vec::new(),
    }
}

/// Attach replies to their parents by `parent_comment_id`. Replies whose
/// parent is not in `parents` are dropped (they cannot occur through the
/// write path; the FK promotes orphans to top level instead).
pub(crate) fn attach_replies(parents: Vec<CommentNode>, replies: Vec<CommentNode>) -> Vec<CommentNode> {
    let mut by_parent: HashMap<Uuid, Vec<CommentNode>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_comment_id {
            by_parent.entry(parent_id).or_default().push(reply);
        }
    }

    parents
        .into_iter()
        .map(|mut parent| {
            if let Some(children) = by_parent.remove(&parent.id) {
                parent.replies = children;
            }
            parent
        })
        .collect()
}

const COMMENT_COLUMNS: &str = r#"c.id, c.story_id, c.user_id AS author_id, p.username, p.avatar_url,
       c.text, c.parent_comment_id,
       to_char(c.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#;

/// Fetch a story's comment thread.
pub async fn list_comments(pool: &PgPool, story_id: Uuid) -> Result<Vec<CommentNode>, CommentError> {
    let parents = sqlx::query(&format!(
        r"SELECT {COMMENT_COLUMNS}
          FROM story_comments c
          JOIN profiles p ON p.id = c.user_id
          WHERE c.story_id = $1 AND c.parent_comment_id IS NULL
          ORDER BY c.created_at DESC",
    ))
    .bind(story_id)
    .fetch_all(pool)
    .await?;

    let replies = sqlx::query(&format!(
        r"SELECT {COMMENT_COLUMNS}
          FROM story_comments c
          JOIN profiles p ON p.id = c.user_id
          WHERE c.story_id = $1 AND c.parent_comment_id IS NOT NULL
          ORDER BY c.created_at ASC",
    ))
    .bind(story_id)
    .fetch_all(pool)
    .await?;

    Ok(attach_replies(
        parents.iter().map(comment_node).collect(),
        replies.iter().map(comment_node).collect(),
    ))
}

/// Add a comment or a single-level reply.
pub async fn add_comment(
    pool: &PgPool,
    story_id: Uuid,
    user_id: Uuid,
    text: &str,
    parent_comment_id: Option<Uuid>,
) -> Result<Uuid, CommentError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommentError::EmptyText);
    }

    let story = sqlx::query("SELECT comments_enabled FROM stories WHERE id = $1")
        .bind(story_id)
        .fetch_optional(pool)
        .await?
        .ok_or(CommentError::StoryNotFound(story_id))?;
    if !story.get::<bool, _>("comments_enabled") {
        return Err(CommentError::CommentsDisabled);
    }

    if let Some(parent_id) = parent_comment_id {
        let parent = sqlx::query("SELECT story_id, parent_comment_id FROM story_comments WHERE id = $1")
            .bind(parent_id)
            .fetch_optional(pool)
            .await?
            .ok_or(CommentError::InvalidParent)?;
        let parent_story: Uuid = parent.get("story_id");
        let grandparent: Option<Uuid> = parent.get("parent_comment_id");
        if parent_story != story_id || grandparent.is_some() {
            return Err(CommentError::InvalidParent);
        }
    }

    let row = sqlx::query(
        "INSERT INTO story_comments (story_id, user_id, text, parent_comment_id)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(story_id)
    .bind(user_id)
    .bind(text)
    .bind(parent_comment_id)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

/// Delete a comment. Allowed for the comment's author or the story's owner;
/// removes exactly that row (replies are promoted by the FK).
pub async fn delete_comment(pool: &PgPool, comment_id: Uuid, user_id: Uuid) -> Result<(), CommentError> {
    let row = sqlx::query(
        r"SELECT c.user_id AS author_id, s.user_id AS owner_id
          FROM story_comments c
          JOIN stories s ON s.id = c.story_id
          WHERE c.id = $1",
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await?
    .ok_or(CommentError::CommentNotFound(comment_id))?;

    let author_id: Uuid = row.get("author_id");
    let owner_id: Uuid = row.get("owner_id");
    if user_id != author_id && user_id != owner_id {
        return Err(CommentError::Forbidden);
    }

    sqlx::query("DELETE FROM story_comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "comment_test.rs"]
mod tests;
