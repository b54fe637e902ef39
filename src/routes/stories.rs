//! Story routes — feed, viewer payload, CRUD, views and likes.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::playback;
use crate::routes::auth::AuthUser;
use crate::services::feed;
use crate::services::profile;
use crate::services::story::{self, StoryError};
use crate::state::AppState;

pub(crate) fn story_error_to_status(err: &StoryError) -> StatusCode {
    match err {
        StoryError::NotFound(_) => StatusCode::NOT_FOUND,
        StoryError::InvalidMedia => StatusCode::BAD_REQUEST,
        StoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_and_map(err: &StoryError) -> StatusCode {
    if matches!(err, StoryError::Database(_)) {
        tracing::error!(error = %err, "story operation failed");
    }
    story_error_to_status(err)
}

// =============================================================================
// FEED
// =============================================================================

/// `GET /api/feed/stories` — followed profiles with active stories and
/// their ring state, unseen first.
pub async fn story_feed(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<feed::FeedEntry>>, StatusCode> {
    let entries = feed::story_feed(&state.pool, auth.user.id).await.map_err(|e| {
        tracing::error!(error = %e, "story feed query failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(entries))
}

// =============================================================================
// VIEWER PAYLOAD
// =============================================================================

#[derive(Serialize)]
pub struct ViewerOwner {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Serialize)]
pub struct ViewerStoryResponse {
    #[serde(flatten)]
    pub story: story::ViewerStory,
    /// How long the client should display this slide, mirroring the
    /// playback rules (fixed for image/text, natural length for video).
    pub display_duration_secs: f64,
}

#[derive(Serialize)]
pub struct ViewerStoriesResponse {
    pub owner: ViewerOwner,
    pub stories: Vec<ViewerStoryResponse>,
}

pub(crate) fn display_duration_secs(media_type: &str, duration_secs: Option<f64>) -> f64 {
    let kind = playback::SlideKind::parse(media_type).unwrap_or(playback::SlideKind::Image);
    let video_duration = duration_secs
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(Duration::from_secs_f64);
    let slide = playback::Slide { story_id: Uuid::nil(), kind, video_duration };
    slide.play_time().as_secs_f64()
}

/// `GET /api/users/:username/stories` — an owner's active stories in
/// playback order, with counters and the viewer's flags.
pub async fn viewer_stories(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ViewerStoriesResponse>, StatusCode> {
    let owner = profile::by_username(&state.pool, &username)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let stories = story::viewer_stories(&state.pool, owner.id, auth.user.id)
        .await
        .map_err(|e| log_and_map(&e))?;

    let stories = stories
        .into_iter()
        .map(|s| {
            let display = display_duration_secs(&s.story.media_type, s.story.duration_secs);
            ViewerStoryResponse { story: s, display_duration_secs: display }
        })
        .collect();

    Ok(Json(ViewerStoriesResponse {
        owner: ViewerOwner { id: owner.id, username: owner.username, avatar_url: owner.avatar_url },
        stories,
    }))
}

// =============================================================================
// CRUD
// =============================================================================

fn default_comments_enabled() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CreateStoryBody {
    pub media_type: story::MediaType,
    pub media_url: Option<String>,
    pub text: Option<story::TextStoryPayload>,
    pub link_url: Option<String>,
    pub duration_secs: Option<f64>,
    #[serde(default = "default_comments_enabled")]
    pub comments_enabled: bool,
}

/// `POST /api/stories` — create a story expiring in 24 hours.
pub async fn create_story(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateStoryBody>,
) -> Result<(StatusCode, Json<story::StoryRow>), StatusCode> {
    let new = story::NewStory {
        media_type: body.media_type,
        media_url: body.media_url,
        text: body.text,
        link_url: body.link_url,
        duration_secs: body.duration_secs.filter(|d| d.is_finite() && *d > 0.0),
        comments_enabled: body.comments_enabled,
    };

    let row = story::create_story(&state.pool, auth.user.id, &new)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Deserialize)]
pub struct UpdateStoryBody {
    pub media_url: String,
    pub link_url: Option<String>,
}

/// `PATCH /api/stories/:id` — rewrite media/link fields; the expiry window
/// is never extended.
pub async fn update_story(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(story_id): Path<Uuid>,
    Json(body): Json<UpdateStoryBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    story::update_story(&state.pool, auth.user.id, story_id, &body.media_url, body.link_url.as_deref())
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `DELETE /api/stories/:id` — owner-only delete, active or expired.
pub async fn delete_story(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    story::delete_story(&state.pool, auth.user.id, story_id)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/stories` — the caller's active stories with counters.
pub async fn my_stories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<story::OwnedStory>>, StatusCode> {
    let rows = story::my_stories(&state.pool, auth.user.id)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(Json(rows))
}

// =============================================================================
// INTERACTIONS
// =============================================================================

/// `POST /api/stories/:id/view` — record the viewer's view, at most once
/// per (story, viewer).
pub async fn record_view(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    story::record_view(&state.pool, story_id, auth.user.id)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/stories/:id/like` — toggle the viewer's like.
pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(story_id): Path<Uuid>,
) -> Result<Json<story::LikeState>, StatusCode> {
    let like = story::toggle_like(&state.pool, story_id, auth.user.id)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(Json(like))
}

#[cfg(test)]
#[path = "stories_test.rs"]
mod tests;
