//! Stories-bar feed: followed profiles with active stories and their ring
//! state.
//!
//! DESIGN
//! ======
//! The web client computed this with one query per followed profile; here a
//! single aggregate joins follows to active stories and the viewer's view
//! rows. A profile with no active story never appears (the bar's "none"
//! ring is absence), and unseen profiles sort before seen ones.

use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Ring color shown around a profile in the stories bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RingState {
    /// At least one active story the viewer has not seen.
    Unseen,
    /// Every active story already has this viewer's view row.
    Seen,
}

/// Ring state from aggregate counts. Callers guarantee `active > 0`.
#[must_use]
pub fn ring_state(active_stories: i64, seen_stories: i64) -> RingState {
    if seen_stories >= active_stories {
        RingState::Seen
    } else {
        RingState::Unseen
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FeedEntry {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub active_stories: i64,
    pub ring: RingState,
}

/// Followed profiles with at least one active story, unseen first.
pub async fn story_feed(pool: &PgPool, viewer_id: Uuid) -> Result<Vec<FeedEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r"SELECT p.id, p.username, p.avatar_url,
                 COUNT(s.id)        AS active_stories,
                 COUNT(v.story_id)  AS seen_stories
          FROM follows f
          JOIN profiles p ON p.id = f.following_id
          LEFT JOIN stories s ON s.user_id = p.id AND s.expires_at > now()
          LEFT JOIN story_views v ON v.story_id = s.id AND v.viewer_id = $1
          WHERE f.follower_id = $1
          GROUP BY p.id, p.username, p.avatar_url
          HAVING COUNT(s.id) > 0
          ORDER BY (COUNT(v.story_id) >= COUNT(s.id)) ASC, p.username ASC",
    )
    .bind(viewer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| {
            let active_stories: i64 = r.get("active_stories");
            let seen_stories: i64 = r.get("seen_stories");
            FeedEntry {
                id: r.get("id"),
                username: r.get("username"),
                avatar_url: r.get("avatar_url"),
                active_stories,
                ring: ring_state(active_stories, seen_stories),
            }
        })
        .collect())
}

#[cfg(test)]
#[path = "feed_test.rs"]
mod tests;
