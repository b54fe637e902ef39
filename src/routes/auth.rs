//! Auth routes — registration, login, session management, password resets.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use time::Duration;

use crate::rate_limit::RateLimitError;
use crate::services::auth::{self as auth_svc, AuthError};
use crate::services::session;
use crate::state::AppState;

const COOKIE_NAME: &str = "session_token";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("DROPBOX_REDIRECT_URI")
        .map(|uri| uri.starts_with("https://"))
        .unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: session::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn auth_error_to_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidCredentials | AuthError::ResetFailed => StatusCode::UNAUTHORIZED,
        AuthError::EmailTaken | AuthError::UsernameTaken => StatusCode::CONFLICT,
        AuthError::InvalidEmail | AuthError::Username(_) | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
        AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AuthError::EmailDelivery(_) => StatusCode::BAD_GATEWAY,
        AuthError::Hashing | AuthError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn auth_error_response(err: &AuthError) -> Response {
    let status = auth_error_to_status(err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "auth operation failed");
    }
    (status, Json(serde_json::json!({ "error": auth_svc::user_message(err) }))).into_response()
}

fn rate_limited(err: &RateLimitError) -> Response {
    tracing::warn!(error = %err, "auth attempt rate limited");
    auth_error_response(&AuthError::RateLimited)
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/register` — create an account and log it in.
pub async fn register(State(state): State<AppState>, Json(body): Json<RegisterBody>) -> Response {
    if let Err(e) = state.auth_limiter.check_and_record(&body.email.to_ascii_lowercase()) {
        return rate_limited(&e);
    }

    let account = auth_svc::NewAccount {
        username: &body.username,
        email: &body.email,
        password: &body.password,
    };
    let user_id = match auth_svc::register(&state.pool, account).await {
        Ok(id) => id,
        Err(e) => return auth_error_response(&e),
    };

    let token = match session::create_session(&state.pool, user_id).await {
        Ok(t) => t,
        Err(e) => return auth_error_response(&AuthError::Db(e)),
    };

    let jar = CookieJar::new().add(session_cookie(token));
    (StatusCode::CREATED, jar, Json(serde_json::json!({ "id": user_id }))).into_response()
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/login` — verify credentials, set the session cookie.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> Response {
    if let Err(e) = state.auth_limiter.check_and_record(&body.email.to_ascii_lowercase()) {
        return rate_limited(&e);
    }

    let user_id = match auth_svc::login(&state.pool, &body.email, &body.password).await {
        Ok(id) => id,
        Err(e) => return auth_error_response(&e),
    };

    let token = match session::create_session(&state.pool, user_id).await {
        Ok(t) => t,
        Err(e) => return auth_error_response(&AuthError::Db(e)),
    };

    let jar = CookieJar::new().add(session_cookie(token));
    (jar, Json(serde_json::json!({ "id": user_id }))).into_response()
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<session::SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let _ = session::delete_session(&state.pool, &auth.token).await;

    let jar = CookieJar::new().add(clear_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct UpdatePasswordBody {
    pub current_password: String,
    pub new_password: String,
}

/// `POST /api/auth/password` — change password for a logged-in user.
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdatePasswordBody>,
) -> Response {
    match auth_svc::change_password(&state.pool, auth.user.id, &body.current_password, &body.new_password).await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => auth_error_response(&e),
    }
}

#[derive(Deserialize)]
pub struct RequestResetBody {
    pub email: String,
}

/// `POST /api/auth/reset/request-code` — issue and email a reset code.
///
/// Answers 204 whether or not the email has an account, so the endpoint
/// cannot be used to enumerate accounts.
pub async fn request_reset_code(
    State(state): State<AppState>,
    Json(body): Json<RequestResetBody>,
) -> Response {
    if let Err(e) = state.auth_limiter.check_and_record(&body.email.to_ascii_lowercase()) {
        return rate_limited(&e);
    }

    let code = match auth_svc::request_reset_code(&state.pool, &body.email).await {
        Ok(code) => code,
        Err(e) => return auth_error_response(&e),
    };

    if let Some(code) = code {
        match &state.mailer {
            Some(mailer) => {
                if let Err(e) = auth_svc::send_reset_code_email(mailer, &body.email, &code).await {
                    tracing::error!(error = %e, "reset code delivery failed");
                }
            }
            None => tracing::warn!("reset code issued but no mailer is configured"),
        }
    }

    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
pub struct ConfirmResetBody {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// `POST /api/auth/reset/confirm` — consume a reset code, set the new
/// password, and revoke existing sessions.
pub async fn confirm_reset(State(state): State<AppState>, Json(body): Json<ConfirmResetBody>) -> Response {
    if let Err(e) = state.auth_limiter.check_and_record(&body.email.to_ascii_lowercase()) {
        return rate_limited(&e);
    }

    match auth_svc::confirm_reset(&state.pool, &body.email, &body.code, &body.new_password).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => auth_error_response(&e),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
