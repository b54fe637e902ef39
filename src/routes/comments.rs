//! Comment routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::comment::{self, CommentError};
use crate::state::AppState;

pub(crate) fn comment_error_to_status(err: &CommentError) -> StatusCode {
    match err {
        CommentError::StoryNotFound(_) | CommentError::CommentNotFound(_) => StatusCode::NOT_FOUND,
        CommentError::EmptyText | CommentError::InvalidParent => StatusCode::BAD_REQUEST,
        CommentError::CommentsDisabled | CommentError::Forbidden => StatusCode::FORBIDDEN,
        CommentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_and_map(err: &CommentError) -> StatusCode {
    if matches!(err, CommentError::Database(_)) {
        tracing::error!(error = %err, "comment operation failed");
    }
    comment_error_to_status(err)
}

/// `GET /api/stories/:id/comments` — the story's comment thread.
pub async fn list_comments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(story_id): Path<Uuid>,
) -> Result<Json<Vec<comment::CommentNode>>, StatusCode> {
    let thread = comment::list_comments(&state.pool, story_id)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(Json(thread))
}

#[derive(Deserialize)]
pub struct AddCommentBody {
    pub text: String,
    pub parent_comment_id: Option<Uuid>,
}

/// `POST /api/stories/:id/comments` — add a comment or a one-level reply.
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(story_id): Path<Uuid>,
    Json(body): Json<AddCommentBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let id = comment::add_comment(&state.pool, story_id, auth.user.id, &body.text, body.parent_comment_id)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// `DELETE /api/comments/:id` — author or story owner only.
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    comment::delete_comment(&state.pool, comment_id, auth.user.id)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "comments_test.rs"]
mod tests;
