//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The service is API-only: every page of the web client talks to these
//! endpoints. CORS is open because the client is served from a separate
//! origin; auth rides on the HttpOnly session cookie.

pub mod auth;
pub mod comments;
pub mod dropbox;
pub mod profiles;
pub mod site_config;
pub mod stories;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/password", post(auth::update_password))
        .route("/api/auth/reset/request-code", post(auth::request_reset_code))
        .route("/api/auth/reset/confirm", post(auth::confirm_reset))
        .route("/api/feed/stories", get(stories::story_feed))
        .route("/api/stories", get(stories::my_stories).post(stories::create_story))
        .route(
            "/api/stories/{id}",
            patch(stories::update_story).delete(stories::delete_story),
        )
        .route("/api/stories/{id}/view", post(stories::record_view))
        .route("/api/stories/{id}/like", post(stories::toggle_like))
        .route(
            "/api/stories/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route("/api/comments/{id}", delete(comments::delete_comment))
        .route("/api/users/{username}/stories", get(stories::viewer_stories))
        .route("/api/users/{username}/profile", get(profiles::public_profile))
        .route("/api/profile", patch(profiles::update_profile))
        .route(
            "/api/users/{id}/follow",
            post(profiles::follow).delete(profiles::unfollow),
        )
        .route(
            "/api/site-configuration",
            get(site_config::get_config).patch(site_config::update_config),
        )
        .route("/api/locations", get(site_config::list_locations))
        .route("/auth/dropbox", get(dropbox::dropbox_redirect))
        .route("/auth/dropbox/callback", get(dropbox::dropbox_callback))
        .route("/api/dropbox/files", get(dropbox::list_files))
        .route("/api/dropbox/shared-link", post(dropbox::shared_link))
        .route("/api/dropbox/upload", post(dropbox::upload))
        .route("/api/dropbox/disconnect", post(dropbox::disconnect))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
