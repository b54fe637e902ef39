//! Profiles and the follow graph.
//!
//! Username rules are the profile's only invariant the database cannot
//! express: letters, digits, `.` and `_`, at most 30 characters, separators
//! neither at the edges nor doubled.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::media;

pub const USERNAME_MAX_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("username is required")]
    Empty,
    #[error("username longer than 30 characters")]
    TooLong,
    #[error("username has characters outside letters, digits, '.' and '_'")]
    InvalidChars,
    #[error("username starts or ends with '.' or '_'")]
    EdgeSeparator,
    #[error("username repeats '.' or '_' consecutively")]
    RepeatedSeparator,
}

impl UsernameError {
    /// pt-BR message shown to the user, matching the client's copy.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Empty => "Nome de usuário é obrigatório.",
            Self::TooLong => "Nome de usuário deve ter no máximo 30 caracteres.",
            Self::InvalidChars => "Use apenas letras, números, pontos (.) e underscores (_).",
            Self::EdgeSeparator => "Pontos e underscores não podem estar no início ou no fim.",
            Self::RepeatedSeparator => "Pontos e underscores não podem estar repetidos em sequência.",
        }
    }
}

/// Validate a username against the account rules.
///
/// # Errors
///
/// Returns the first rule the name violates, in the order the rules are
/// listed on [`UsernameError`].
pub fn validate_username(username: &str) -> Result<(), UsernameError> {
    if username.is_empty() {
        return Err(UsernameError::Empty);
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(UsernameError::TooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return Err(UsernameError::InvalidChars);
    }
    let is_separator = |c: char| c == '.' || c == '_';
    // Both edges exist: the empty case returned above.
    if username.starts_with(is_separator) || username.ends_with(is_separator) {
        return Err(UsernameError::EdgeSeparator);
    }
    if username.contains("..") || username.contains("__") {
        return Err(UsernameError::RepeatedSeparator);
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,
    #[error("cannot follow yourself")]
    SelfFollow,
    #[error(transparent)]
    Username(#[from] UsernameError),
    #[error("username already taken")]
    UsernameTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Minimal profile row used to resolve usernames.
#[derive(Debug, Clone)]
pub struct ProfileRef {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Public profile payload with social-graph aggregates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub member_since: Option<String>,
    pub followers: i64,
    pub following: i64,
    pub active_stories: i64,
    pub followed_by_viewer: bool,
}

/// Resolve a profile by username.
pub async fn by_username(pool: &PgPool, username: &str) -> Result<Option<ProfileRef>, sqlx::Error> {
    let row = sqlx::query("SELECT id, username, avatar_url FROM profiles WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| ProfileRef {
        id: r.get("id"),
        username: r.get("username"),
        avatar_url: r.get("avatar_url"),
    }))
}

/// Fetch a public profile with follower/following/story aggregates.
pub async fn public_profile(
    pool: &PgPool,
    username: &str,
    viewer_id: Uuid,
) -> Result<PublicProfile, ProfileError> {
    let row = sqlx::query(
        r"SELECT id, username, avatar_url,
                 to_char(created_at, 'YYYY-MM-DD') AS member_since
          FROM profiles WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or(ProfileError::NotFound)?;

    let id: Uuid = row.get("id");

    let stats = sqlx::query(
        r"SELECT
              (SELECT COUNT(*) FROM follows WHERE following_id = $1)                          AS followers,
              (SELECT COUNT(*) FROM follows WHERE follower_id = $1)                           AS following,
              (SELECT COUNT(*) FROM stories WHERE user_id = $1 AND expires_at > now())        AS active_stories,
              EXISTS(SELECT 1 FROM follows WHERE follower_id = $2 AND following_id = $1)      AS followed_by_viewer",
    )
    .bind(id)
    .bind(viewer_id)
    .fetch_one(pool)
    .await?;

    Ok(PublicProfile {
        id,
        username: row.get("username"),
        avatar_url: row.get("avatar_url"),
        member_since: row.get("member_since"),
        followers: stats.get("followers"),
        following: stats.get("following"),
        active_stories: stats.get("active_stories"),
        followed_by_viewer: stats.get("followed_by_viewer"),
    })
}

/// Update the caller's own profile fields. Avatar URLs are normalized for
/// direct embedding before storage.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    username: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<(), ProfileError> {
    if let Some(username) = username {
        validate_username(username)?;
    }
    let avatar_url = avatar_url.map(media::transform_dropbox_url);

    let result = sqlx::query(
        r"UPDATE profiles
          SET username = COALESCE($2, username),
              avatar_url = COALESCE($3, avatar_url),
              updated_at = now()
          WHERE id = $1",
    )
    .bind(user_id)
    .bind(username)
    .bind(avatar_url)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Err(ProfileError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            if matches!(&e, sqlx::Error::Database(db) if db.constraint() == Some("profiles_username_key")) {
                Err(ProfileError::UsernameTaken)
            } else {
                Err(ProfileError::Database(e))
            }
        }
    }
}

/// Follow a profile. Re-following is a no-op.
pub async fn follow(pool: &PgPool, follower_id: Uuid, following_id: Uuid) -> Result<(), ProfileError> {
    if follower_id == following_id {
        return Err(ProfileError::SelfFollow);
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)")
        .bind(following_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(ProfileError::NotFound);
    }

    sqlx::query(
        "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(follower_id)
    .bind(following_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Unfollow a profile. Unfollowing someone not followed is a no-op.
pub async fn unfollow(pool: &PgPool, follower_id: Uuid, following_id: Uuid) -> Result<(), ProfileError> {
    sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
