//! Profile and follow-graph routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::AuthUser;
use crate::services::profile::{self, ProfileError};
use crate::state::AppState;

fn profile_error_response(err: &ProfileError) -> Response {
    let status = match err {
        ProfileError::NotFound => StatusCode::NOT_FOUND,
        ProfileError::SelfFollow | ProfileError::Username(_) => StatusCode::BAD_REQUEST,
        ProfileError::UsernameTaken => StatusCode::CONFLICT,
        ProfileError::Database(_) => {
            tracing::error!(error = %err, "profile operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    // Username rejections carry the client-facing message.
    if let ProfileError::Username(e) = err {
        return (status, Json(serde_json::json!({ "error": e.user_message() }))).into_response();
    }
    status.into_response()
}

/// `GET /api/users/:username/profile` — public profile with aggregates.
pub async fn public_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<profile::PublicProfile>, Response> {
    let payload = profile::public_profile(&state.pool, &username, auth.user.id)
        .await
        .map_err(|e| profile_error_response(&e))?;
    Ok(Json(payload))
}

#[derive(Deserialize)]
pub struct UpdateProfileBody {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// `PATCH /api/profile` — update the caller's own username/avatar.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<serde_json::Value>, Response> {
    profile::update_profile(
        &state.pool,
        auth.user.id,
        body.username.as_deref(),
        body.avatar_url.as_deref(),
    )
    .await
    .map_err(|e| profile_error_response(&e))?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /api/users/:id/follow` — follow a profile.
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    profile::follow(&state.pool, auth.user.id, user_id)
        .await
        .map_err(|e| profile_error_response(&e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/users/:id/follow` — unfollow a profile.
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    profile::unfollow(&state.pool, auth.user.id, user_id)
        .await
        .map_err(|e| profile_error_response(&e))?;
    Ok(StatusCode::NO_CONTENT)
}
