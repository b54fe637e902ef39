//! Dropbox routes — OAuth connection flow and media bridge endpoints.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use time::Duration;

use crate::routes::auth::{AuthUser, cookie_secure};
use crate::services::dropbox::{self, DropboxError};
use crate::services::session;
use crate::state::AppState;

const OAUTH_STATE_COOKIE_NAME: &str = "dropbox_oauth_state";

fn dropbox_error_to_status(err: &DropboxError) -> StatusCode {
    match err {
        DropboxError::NotConnected => StatusCode::PRECONDITION_FAILED,
        DropboxError::TokenExchange(_) | DropboxError::Api(_) => StatusCode::BAD_GATEWAY,
        DropboxError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_and_map(err: &DropboxError) -> StatusCode {
    match err {
        DropboxError::NotConnected => {}
        other => tracing::error!(error = %other, "dropbox call failed"),
    }
    dropbox_error_to_status(err)
}

async fn require_token(state: &AppState, auth: &AuthUser) -> Result<String, StatusCode> {
    dropbox::token_for(&state.pool, auth.user.id)
        .await
        .map_err(|e| log_and_map(&DropboxError::Db(e)))?
        .ok_or_else(|| log_and_map(&DropboxError::NotConnected))
}

// =============================================================================
// OAUTH FLOW
// =============================================================================

/// `GET /auth/dropbox` — redirect to the Dropbox authorization page.
pub async fn dropbox_redirect(State(state): State<AppState>, _auth: AuthUser) -> Response {
    let Some(config) = &state.dropbox else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Dropbox not configured").into_response();
    };

    let oauth_state = session::generate_token();
    let secure = cookie_secure();
    let cookie = Cookie::build((OAUTH_STATE_COOKIE_NAME, oauth_state.clone()))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(secure)
        .max_age(Duration::minutes(10));

    let jar = CookieJar::new().add(cookie);
    (jar, Redirect::temporary(&config.authorize_url(&oauth_state))).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: Option<String>,
}

/// `GET /auth/dropbox/callback` — verify state, exchange the code, store
/// the token on the caller's profile, and send them back to the app.
pub async fn dropbox_callback(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(config) = &state.dropbox else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Dropbox not configured").into_response();
    };
    let secure = cookie_secure();

    // Verify OAuth CSRF state from cookie.
    let Some(callback_state) = params.state.as_deref() else {
        return (StatusCode::BAD_REQUEST, "missing oauth state").into_response();
    };
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(Cookie::value)
        .unwrap_or_default();
    if expected_state.is_empty() || expected_state != callback_state {
        return (StatusCode::UNAUTHORIZED, "invalid oauth state").into_response();
    }

    let access_token = match dropbox::exchange_code(config, &params.code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "dropbox code exchange failed");
            return (StatusCode::BAD_GATEWAY, "Dropbox code exchange failed").into_response();
        }
    };

    if let Err(e) = dropbox::store_token(&state.pool, auth.user.id, &access_token).await {
        tracing::error!(error = %e, "dropbox token store failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to store Dropbox token").into_response();
    }

    let clear_oauth_state_cookie = Cookie::build((OAUTH_STATE_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO);

    let jar = jar.add(clear_oauth_state_cookie);
    (jar, Redirect::temporary("/")).into_response()
}

/// `POST /api/dropbox/disconnect` — forget the stored token.
pub async fn disconnect(State(state): State<AppState>, auth: AuthUser) -> Result<StatusCode, StatusCode> {
    dropbox::clear_token(&state.pool, auth.user.id)
        .await
        .map_err(|e| log_and_map(&DropboxError::Db(e)))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// MEDIA BRIDGE
// =============================================================================

#[derive(Deserialize)]
pub struct ListFilesQuery {
    #[serde(default)]
    pub path: String,
}

/// `GET /api/dropbox/files?path=` — list a folder.
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<Vec<dropbox::DropboxEntry>>, StatusCode> {
    let token = require_token(&state, &auth).await?;
    let entries = dropbox::list_folder(&token, &query.path)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(Json(entries))
}

#[derive(Deserialize)]
pub struct SharedLinkBody {
    pub path: String,
}

/// `POST /api/dropbox/shared-link` — directly-embeddable link for a file.
pub async fn shared_link(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SharedLinkBody>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let token = require_token(&state, &auth).await?;
    let url = dropbox::shared_link(&token, &body.path)
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(Json(serde_json::json!({ "url": url })))
}

#[derive(Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub folder: String,
    pub file_name: String,
}

/// `POST /api/dropbox/upload?file_name=` — upload the raw request body.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<dropbox::DropboxEntry>, StatusCode> {
    if query.file_name.is_empty() || body.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let token = require_token(&state, &auth).await?;
    let path = dropbox::upload_path(&query.folder, &query.file_name);
    let entry = dropbox::upload(&token, &path, body.to_vec())
        .await
        .map_err(|e| log_and_map(&e))?;
    Ok(Json(entry))
}
