//! Dropbox media bridge — OAuth code exchange, token storage, and the
//! handful of content API calls the app needs.
//!
//! ARCHITECTURE
//! ============
//! The client used to talk to Dropbox directly with an implicit-grant token
//! kept in browser storage. Here the token is obtained with the
//! authorization-code flow and stored on the profile row, and the API calls
//! are plain HTTP against the documented endpoints.

use sqlx::PgPool;
use uuid::Uuid;

use crate::media;

const AUTHORIZE_URL: &str = "https://www.dropbox.com/oauth2/authorize";
const TOKEN_URL: &str = "https://api.dropboxapi.com/oauth2/token";
const API_URL: &str = "https://api.dropboxapi.com/2";
const CONTENT_URL: &str = "https://content.dropboxapi.com/2";

/// Dropbox app configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct DropboxConfig {
    pub app_key: String,
    pub app_secret: String,
    pub redirect_uri: String,
}

impl DropboxConfig {
    /// Load from `DROPBOX_APP_KEY`, `DROPBOX_APP_SECRET`,
    /// `DROPBOX_REDIRECT_URI`. Returns `None` if any are missing (the media
    /// bridge will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let app_key = std::env::var("DROPBOX_APP_KEY").ok()?;
        let app_secret = std::env::var("DROPBOX_APP_SECRET").ok()?;
        let redirect_uri = std::env::var("DROPBOX_REDIRECT_URI").ok()?;
        Some(Self { app_key, app_secret, redirect_uri })
    }

    /// Build the Dropbox authorization URL.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?client_id={}&redirect_uri={}&response_type=code&token_access_type=offline&state={state}",
            self.app_key, self.redirect_uri
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DropboxError {
    #[error("dropbox account not connected")]
    NotConnected,
    #[error("dropbox token exchange failed: {0}")]
    TokenExchange(String),
    #[error("dropbox api error: {0}")]
    Api(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange an OAuth code for an access token.
pub async fn exchange_code(config: &DropboxConfig, code: &str) -> Result<String, DropboxError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(TOKEN_URL)
        .form(&[
            ("code", code),
            ("grant_type", "authorization_code"),
            ("client_id", config.app_key.as_str()),
            ("client_secret", config.app_secret.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| DropboxError::TokenExchange(e.to_string()))?;

    let body = resp
        .text()
        .await
        .map_err(|e| DropboxError::TokenExchange(e.to_string()))?;
    let token_resp: TokenResponse = serde_json::from_str(&body)
        .map_err(|_| DropboxError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

// =============================================================================
// TOKEN STORAGE
// =============================================================================

/// Persist the user's access token on their profile row.
pub async fn store_token(pool: &PgPool, user_id: Uuid, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET dropbox_token = $2, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Forget the user's access token.
pub async fn clear_token(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET dropbox_token = NULL, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Fetch the user's stored access token, if connected.
pub async fn token_for(pool: &PgPool, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
    let token: Option<Option<String>> =
        sqlx::query_scalar("SELECT dropbox_token FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(token.flatten())
}

// =============================================================================
// CONTENT API
// =============================================================================

/// A folder listing entry, flattened from Dropbox metadata.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DropboxEntry {
    pub id: String,
    pub name: String,
    pub path: String,
    pub is_folder: bool,
    pub size: Option<u64>,
}

pub(crate) fn parse_entry(entry: &serde_json::Value) -> Option<DropboxEntry> {
    let name = entry.get("name")?.as_str()?.to_owned();
    let is_folder = entry.get(".tag").and_then(serde_json::Value::as_str) == Some("folder");
    let path = entry
        .get("path_display")
        .and_then(serde_json::Value::as_str)
        .or_else(|| entry.get("path_lower").and_then(serde_json::Value::as_str))
        .unwrap_or_default()
        .to_owned();
    let id = entry
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or(&name)
        .to_owned();
    let size = if is_folder {
        None
    } else {
        entry.get("size").and_then(serde_json::Value::as_u64)
    };
    Some(DropboxEntry { id, name, path, is_folder, size })
}

pub(crate) fn parse_entries(body: &serde_json::Value) -> Vec<DropboxEntry> {
    body.get("entries")
        .and_then(serde_json::Value::as_array)
        .map(|entries| entries.iter().filter_map(parse_entry).collect())
        .unwrap_or_default()
}

/// The upload path Dropbox expects: `/name` at the root, `folder/name` below.
#[must_use]
pub(crate) fn upload_path(folder: &str, file_name: &str) -> String {
    if folder.is_empty() {
        format!("/{file_name}")
    } else {
        format!("{folder}/{file_name}")
    }
}

async fn api_call(
    token: &str,
    endpoint: &str,
    args: serde_json::Value,
) -> Result<serde_json::Value, DropboxError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{API_URL}/{endpoint}"))
        .header("Authorization", format!("Bearer {token}"))
        .json(&args)
        .send()
        .await
        .map_err(|e| DropboxError::Api(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(DropboxError::Api(format!("{status}: {body}")));
    }

    resp.json().await.map_err(|e| DropboxError::Api(e.to_string()))
}

/// List a folder's entries.
pub async fn list_folder(token: &str, path: &str) -> Result<Vec<DropboxEntry>, DropboxError> {
    let body = api_call(
        token,
        "files/list_folder",
        serde_json::json!({ "path": path, "include_media_info": true }),
    )
    .await?;
    Ok(parse_entries(&body))
}

pub(crate) fn pick_shared_link(listed: &serde_json::Value) -> Option<String> {
    listed
        .get("links")?
        .as_array()?
        .first()?
        .get("url")?
        .as_str()
        .map(str::to_owned)
}

/// Return a directly-embeddable shared link for a file, reusing an existing
/// link when one exists and creating one otherwise.
pub async fn shared_link(token: &str, path: &str) -> Result<String, DropboxError> {
    let listed = api_call(
        token,
        "sharing/list_shared_links",
        serde_json::json!({ "path": path, "direct_only": true }),
    )
    .await?;
    if let Some(url) = pick_shared_link(&listed) {
        return Ok(media::direct_link_url(&url));
    }

    let created = api_call(
        token,
        "sharing/create_shared_link_with_settings",
        serde_json::json!({ "path": path }),
    )
    .await?;
    let url = created
        .get("url")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| DropboxError::Api("shared link response missing url".into()))?;
    Ok(media::direct_link_url(url))
}

/// Upload a file and return its metadata.
pub async fn upload(token: &str, path: &str, bytes: Vec<u8>) -> Result<DropboxEntry, DropboxError> {
    let arg = serde_json::json!({ "path": path, "mode": "add", "autorename": true });
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{CONTENT_URL}/files/upload"))
        .header("Authorization", format!("Bearer {token}"))
        .header("Dropbox-API-Arg", arg.to_string())
        .header("Content-Type", "application/octet-stream")
        .body(bytes)
        .send()
        .await
        .map_err(|e| DropboxError::Api(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(DropboxError::Api(format!("{status}: {body}")));
    }

    let body: serde_json::Value = resp.json().await.map_err(|e| DropboxError::Api(e.to_string()))?;
    parse_entry(&body).ok_or_else(|| DropboxError::Api("upload response missing metadata".into()))
}

#[cfg(test)]
#[path = "dropbox_test.rs"]
mod tests;
