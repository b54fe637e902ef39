//! Story service — creation, editing, active-story queries, views and likes.
//!
//! DESIGN
//! ======
//! A story is active iff `now < expires_at`; every query here filters on
//! that comparison rather than deleting expired rows. Views are insert-only
//! and unique per (story, viewer); likes are a toggled pair table.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::media;

/// `to_char` pattern producing the ISO-8601 UTC instants the API speaks.
const TS_FORMAT: &str = "YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"";

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("story not found: {0}")]
    NotFound(Uuid),
    #[error("story has no usable media")]
    InvalidMedia,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Text,
}

impl MediaType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Text => "text",
        }
    }
}

/// Inline payload stored in `media_url` for text stories. Field names match
/// the JSON the legacy client wrote, so old rows keep decoding.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextStoryPayload {
    pub text: String,
    pub bgcolor: String,
    pub color: String,
    #[serde(rename = "fontSize")]
    pub font_size: String,
}

/// Input for story creation.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub media_type: MediaType,
    /// Required for image/video stories; ignored for text.
    pub media_url: Option<String>,
    /// Required for text stories; ignored otherwise.
    pub text: Option<TextStoryPayload>,
    pub link_url: Option<String>,
    /// Natural video length in seconds, when known.
    pub duration_secs: Option<f64>,
    pub comments_enabled: bool,
}

/// Compute the `media_url` column value for a new story: serialized payload
/// for text stories, the (Dropbox-normalized) URL otherwise.
pub fn storage_url(new: &NewStory) -> Result<String, StoryError> {
    match new.media_type {
        MediaType::Text => {
            let payload = new.text.as_ref().ok_or(StoryError::InvalidMedia)?;
            if payload.text.trim().is_empty() {
                return Err(StoryError::InvalidMedia);
            }
            serde_json::to_string(payload).map_err(|_| StoryError::InvalidMedia)
        }
        MediaType::Image | MediaType::Video => {
            let url = new
                .media_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .ok_or(StoryError::InvalidMedia)?;
            Ok(media::transform_dropbox_url(url))
        }
    }
}

/// Story row as stored, with formatted timestamps.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub media_type: String,
    pub media_url: String,
    pub link_url: Option<String>,
    pub duration_secs: Option<f64>,
    pub comments_enabled: bool,
    pub created_at: String,
    pub expires_at: String,
}

fn story_row(r: &sqlx::postgres::PgRow) -> StoryRow {
    StoryRow {
        id: r.get("id"),
        user_id: r.get("user_id"),
        media_type: r.get("media_type"),
        media_url: r.get("media_url"),
        link_url: r.get("link_url"),
        duration_secs: r.get("duration_secs"),
        comments_enabled: r.get("comments_enabled"),
        created_at: r.get("created_at"),
        expires_at: r.get("expires_at"),
    }
}

/// Insert a story expiring 24 hours from now.
pub async fn create_story(pool: &PgPool, user_id: Uuid, new: &NewStory) -> Result<StoryRow, StoryError> {
    let media_url = storage_url(new)?;

    let row = sqlx::query(&format!(
        r"INSERT INTO stories (user_id, media_type, media_url, link_url, duration_secs, comments_enabled, expires_at)
          VALUES ($1, $2, $3, $4, $5, $6, now() + interval '24 hours')
          RETURNING id, user_id, media_type, media_url, link_url, duration_secs, comments_enabled,
                    to_char(created_at AT TIME ZONE 'UTC', '{TS_FORMAT}') AS created_at,
                    to_char(expires_at AT TIME ZONE 'UTC', '{TS_FORMAT}') AS expires_at",
    ))
    .bind(user_id)
    .bind(new.media_type.as_str())
    .bind(&media_url)
    .bind(&new.link_url)
    .bind(new.duration_secs)
    .bind(new.comments_enabled)
    .fetch_one(pool)
    .await?;

    Ok(story_row(&row))
}

/// Rewrite the media and link fields of an owned story. The expiry window is
/// untouched: editing never extends a story's life.
pub async fn update_story(
    pool: &PgPool,
    user_id: Uuid,
    story_id: Uuid,
    media_url: &str,
    link_url: Option<&str>,
) -> Result<(), StoryError> {
    let media_url = media::transform_dropbox_url(media_url.trim());
    if media_url.is_empty() {
        return Err(StoryError::InvalidMedia);
    }

    let result = sqlx::query(
        "UPDATE stories SET media_url = $3, link_url = $4 WHERE id = $1 AND user_id = $2",
    )
    .bind(story_id)
    .bind(user_id)
    .bind(&media_url)
    .bind(link_url)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoryError::NotFound(story_id));
    }
    Ok(())
}

/// Delete an owned story, active or expired.
pub async fn delete_story(pool: &PgPool, user_id: Uuid, story_id: Uuid) -> Result<(), StoryError> {
    let result = sqlx::query("DELETE FROM stories WHERE id = $1 AND user_id = $2")
        .bind(story_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoryError::NotFound(story_id));
    }
    Ok(())
}

/// A story in the viewer payload, with counters and the viewer's own flags.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ViewerStory {
    #[serde(flatten)]
    pub story: StoryRow,
    pub likes: i64,
    pub views: i64,
    pub viewer_has_liked: bool,
    pub viewer_has_viewed: bool,
}

/// Fetch an owner's active stories in playback order with per-story
/// aggregates and the viewer's liked/viewed flags.
pub async fn viewer_stories(
    pool: &PgPool,
    owner_id: Uuid,
    viewer_id: Uuid,
) -> Result<Vec<ViewerStory>, StoryError> {
    let rows = sqlx::query(&format!(
        r"SELECT s.id, s.user_id, s.media_type, s.media_url, s.link_url, s.duration_secs, s.comments_enabled,
                 to_char(s.created_at AT TIME ZONE 'UTC', '{TS_FORMAT}') AS created_at,
                 to_char(s.expires_at AT TIME ZONE 'UTC', '{TS_FORMAT}') AS expires_at,
                 (SELECT COUNT(*) FROM story_likes l WHERE l.story_id = s.id)                          AS likes,
                 (SELECT COUNT(*) FROM story_views v WHERE v.story_id = s.id)                          AS views,
                 EXISTS(SELECT 1 FROM story_likes l WHERE l.story_id = s.id AND l.user_id = $2)        AS viewer_has_liked,
                 EXISTS(SELECT 1 FROM story_views v WHERE v.story_id = s.id AND v.viewer_id = $2)      AS viewer_has_viewed
          FROM stories s
          WHERE s.user_id = $1 AND s.expires_at > now()
          ORDER BY s.created_at ASC",
    ))
    .bind(owner_id)
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| ViewerStory {
            story: story_row(r),
            likes: r.get("likes"),
            views: r.get("views"),
            viewer_has_liked: r.get("viewer_has_liked"),
            viewer_has_viewed: r.get("viewer_has_viewed"),
        })
        .collect())
}

/// An owned story in the manage screen, with its counters.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OwnedStory {
    #[serde(flatten)]
    pub story: StoryRow,
    pub likes: i64,
    pub views: i64,
}

/// Fetch the caller's own active stories with view/like counts.
pub async fn my_stories(pool: &PgPool, user_id: Uuid) -> Result<Vec<OwnedStory>, StoryError> {
    let rows = sqlx::query(&format!(
        r"SELECT s.id, s.user_id, s.media_type, s.media_url, s.link_url, s.duration_secs, s.comments_enabled,
                 to_char(s.created_at AT TIME ZONE 'UTC', '{TS_FORMAT}') AS created_at,
                 to_char(s.expires_at AT TIME ZONE 'UTC', '{TS_FORMAT}') AS expires_at,
                 (SELECT COUNT(*) FROM story_likes l WHERE l.story_id = s.id) AS likes,
                 (SELECT COUNT(*) FROM story_views v WHERE v.story_id = s.id) AS views
          FROM stories s
          WHERE s.user_id = $1 AND s.expires_at > now()
          ORDER BY s.created_at ASC",
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| OwnedStory { story: story_row(r), likes: r.get("likes"), views: r.get("views") })
        .collect())
}

/// Record that the viewer saw a story. At most one row per (story, viewer)
/// ever exists; repeat viewings are absorbed by the pair primary key.
pub async fn record_view(pool: &PgPool, story_id: Uuid, viewer_id: Uuid) -> Result<(), StoryError> {
    let active: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM stories WHERE id = $1 AND expires_at > now())",
    )
    .bind(story_id)
    .fetch_one(pool)
    .await?;
    if !active {
        return Err(StoryError::NotFound(story_id));
    }

    sqlx::query("INSERT INTO story_views (story_id, viewer_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(story_id)
        .bind(viewer_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resulting like state after a toggle.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes: i64,
}

/// Toggle the viewer's like on a story: remove it when present, add it when
/// absent. Two toggles in a row restore the original state.
pub async fn toggle_like(pool: &PgPool, story_id: Uuid, user_id: Uuid) -> Result<LikeState, StoryError> {
    let active: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM stories WHERE id = $1 AND expires_at > now())",
    )
    .bind(story_id)
    .fetch_one(pool)
    .await?;
    if !active {
        return Err(StoryError::NotFound(story_id));
    }

    let removed = sqlx::query("DELETE FROM story_likes WHERE story_id = $1 AND user_id = $2")
        .bind(story_id)
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();

    let liked = if removed == 0 {
        sqlx::query("INSERT INTO story_likes (story_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(story_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        true
    } else {
        false
    };

    let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM story_likes WHERE story_id = $1")
        .bind(story_id)
        .fetch_one(pool)
        .await?;

    Ok(LikeState { liked, likes })
}

#[cfg(test)]
#[path = "story_test.rs"]
mod tests;
