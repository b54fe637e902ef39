//! Site-configuration routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::routes::auth::AuthUser;
use crate::services::site_config::{self, SiteConfigError, SiteConfigUpdate};
use crate::state::AppState;

fn config_error_to_status(err: &SiteConfigError) -> StatusCode {
    match err {
        SiteConfigError::Missing => StatusCode::NOT_FOUND,
        SiteConfigError::Database(_) => {
            tracing::error!(error = %err, "site configuration query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `GET /api/site-configuration` — the theming singleton with defaults
/// applied. Readable without authentication: the login screen needs it.
pub async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<site_config::SiteConfig>, StatusCode> {
    let config = site_config::get_config(&state.pool)
        .await
        .map_err(|e| config_error_to_status(&e))?;
    Ok(Json(config))
}

/// `PATCH /api/site-configuration` — admin-only partial update.
pub async fn update_config(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<SiteConfigUpdate>,
) -> Result<Json<site_config::SiteConfig>, StatusCode> {
    if !auth.user.is_admin {
        return Err(StatusCode::FORBIDDEN);
    }

    site_config::update_config(&state.pool, &update)
        .await
        .map_err(|e| config_error_to_status(&e))?;

    let config = site_config::get_config(&state.pool)
        .await
        .map_err(|e| config_error_to_status(&e))?;
    Ok(Json(config))
}

/// `GET /api/locations` — read-only list for the admin location picker.
pub async fn list_locations(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<site_config::LocationRow>>, StatusCode> {
    let rows = site_config::list_locations(&state.pool).await.map_err(|e| {
        tracing::error!(error = %e, "locations query failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(rows))
}
