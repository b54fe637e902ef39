//! Account auth service — registration, login, password changes, and
//! password-reset codes.
//!
//! ARCHITECTURE
//! ============
//! Passwords are stored as argon2 hashes. Reset codes are short-lived
//! six-character codes linked to an email, sha256-hashed at rest, with a
//! failed-attempt lockout. User-facing messages go through [`user_message`]:
//! the web client always showed localized pt-BR toasts, so the translation
//! table lives here rather than in every caller.

use rand::Rng;
use resend_rs::Resend;
use resend_rs::types::CreateEmailBaseOptions;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::services::password;
use crate::services::profile::{self, UsernameError};
use crate::services::session;

pub const MIN_PASSWORD_LEN: usize = 6;

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_FAILED_ATTEMPTS: i32 = 5;
const RESET_EMAIL_TEMPLATE: &str = include_str!("../../templates/reset_code.html");

/// Resend configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub api_key: String,
    pub from: String,
}

impl MailerConfig {
    /// Load from `RESEND_API_KEY` and `RESEND_FROM`. Returns `None` if
    /// either is missing (reset emails will be disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        let from = std::env::var("RESEND_FROM").ok()?;
        Some(Self { api_key, from })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error(transparent)]
    Username(#[from] UsernameError),
    #[error("password too short")]
    WeakPassword,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error("expired or incorrect reset code")]
    ResetFailed,
    #[error("too many attempts")]
    RateLimited,
    #[error("password hashing failed")]
    Hashing,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("email delivery failed: {0}")]
    EmailDelivery(String),
}

/// pt-BR user-facing message for an auth error, mirroring the translation
/// table the web client applied to backend error strings.
#[must_use]
pub fn user_message(err: &AuthError) -> String {
    match err {
        AuthError::InvalidEmail => "Email inválido.".to_owned(),
        AuthError::Username(e) => e.user_message().to_owned(),
        AuthError::WeakPassword => "A senha deve ter pelo menos 6 caracteres.".to_owned(),
        AuthError::InvalidCredentials => "Credenciais inválidas. Verifique seu email e senha.".to_owned(),
        AuthError::EmailTaken => "Este email já está registrado.".to_owned(),
        AuthError::UsernameTaken => "Este nome de usuário já está em uso.".to_owned(),
        AuthError::ResetFailed => "Código inválido ou expirado.".to_owned(),
        AuthError::RateLimited => "Muitas tentativas. Tente novamente mais tarde.".to_owned(),
        other => format!("Erro: {other}"),
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn normalize_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.len() != CODE_LEN
        || !normalized
            .chars()
            .all(|c| CODE_ALPHABET.contains(&(c as u8)))
    {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn generate_reset_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}

#[must_use]
pub fn hash_reset_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    let bytes = hasher.finalize();
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

fn constraint_name(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}

pub struct NewAccount<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Create an account. Returns the new profile id.
pub async fn register(pool: &PgPool, account: NewAccount<'_>) -> Result<Uuid, AuthError> {
    let email = normalize_email(account.email).ok_or(AuthError::InvalidEmail)?;
    profile::validate_username(account.username)?;
    if account.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }

    let password_hash = password::hash_password(account.password).map_err(|_| AuthError::Hashing)?;

    let result = sqlx::query(
        "INSERT INTO profiles (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(account.username)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row.get("id")),
        Err(e) => match constraint_name(&e) {
            Some("profiles_email_key") => Err(AuthError::EmailTaken),
            Some("profiles_username_key") => Err(AuthError::UsernameTaken),
            _ => Err(AuthError::Db(e)),
        },
    }
}

/// Verify credentials. Returns the profile id on success.
pub async fn login(pool: &PgPool, email: &str, plain_password: &str) -> Result<Uuid, AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidCredentials)?;

    let row = sqlx::query("SELECT id, password_hash FROM profiles WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Err(AuthError::InvalidCredentials);
    };
    let stored: String = row.get("password_hash");
    if !password::verify_password(plain_password, &stored) {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(row.get("id"))
}

/// Change the password of a logged-in user after re-verifying the current one.
pub async fn change_password(
    pool: &PgPool,
    user_id: Uuid,
    current: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }

    let stored: Option<String> = sqlx::query_scalar("SELECT password_hash FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    let Some(stored) = stored else {
        return Err(AuthError::InvalidCredentials);
    };
    if !password::verify_password(current, &stored) {
        return Err(AuthError::InvalidCredentials);
    }

    let password_hash = password::hash_password(new_password).map_err(|_| AuthError::Hashing)?;
    sqlx::query("UPDATE profiles SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .bind(&password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Issue a reset code for an email. Returns `None` when no account matches,
/// so the route can answer identically either way.
pub async fn request_reset_code(pool: &PgPool, email: &str) -> Result<Option<String>, AuthError> {
    let normalized = normalize_email(email).ok_or(AuthError::InvalidEmail)?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE email = $1)")
        .bind(&normalized)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Ok(None);
    }

    sqlx::query("DELETE FROM password_reset_codes WHERE email = $1 AND consumed_at IS NULL")
        .bind(&normalized)
        .execute(pool)
        .await?;

    let code = generate_reset_code();
    let code_hash = hash_reset_code(&code);

    sqlx::query("INSERT INTO password_reset_codes (email, code_hash) VALUES ($1, $2)")
        .bind(&normalized)
        .bind(code_hash)
        .execute(pool)
        .await?;

    Ok(Some(code))
}

/// Consume a reset code and set a new password. Every session of the
/// account is revoked.
pub async fn confirm_reset(
    pool: &PgPool,
    email: &str,
    code: &str,
    new_password: &str,
) -> Result<Uuid, AuthError> {
    let normalized_email = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    let normalized_code = normalize_code(code).ok_or(AuthError::ResetFailed)?;
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    let code_hash = hash_reset_code(&normalized_code);

    let consumed = sqlx::query(
        r"UPDATE password_reset_codes
          SET consumed_at = now()
          WHERE id = (
              SELECT id
              FROM password_reset_codes
              WHERE email = $1
                AND consumed_at IS NULL
                AND expires_at > now()
              ORDER BY created_at DESC
              LIMIT 1
          )
          AND code_hash = $2
          RETURNING id",
    )
    .bind(&normalized_email)
    .bind(&code_hash)
    .fetch_optional(pool)
    .await?;

    if consumed.is_none() {
        // Count the miss; after enough misses the code consumes itself.
        sqlx::query(
            r"UPDATE password_reset_codes
              SET attempts = attempts + 1,
                  consumed_at = CASE WHEN attempts + 1 >= $2 THEN now() ELSE consumed_at END
              WHERE id = (
                  SELECT id
                  FROM password_reset_codes
                  WHERE email = $1
                    AND consumed_at IS NULL
                    AND expires_at > now()
                  ORDER BY created_at DESC
                  LIMIT 1
              )",
        )
        .bind(&normalized_email)
        .bind(MAX_FAILED_ATTEMPTS)
        .execute(pool)
        .await?;
        return Err(AuthError::ResetFailed);
    }

    let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM profiles WHERE email = $1")
        .bind(&normalized_email)
        .fetch_optional(pool)
        .await?;
    let Some(user_id) = user_id else {
        return Err(AuthError::ResetFailed);
    };

    let password_hash = password::hash_password(new_password).map_err(|_| AuthError::Hashing)?;
    sqlx::query("UPDATE profiles SET password_hash = $2, updated_at = now() WHERE id = $1")
        .bind(user_id)
        .bind(&password_hash)
        .execute(pool)
        .await?;

    session::delete_user_sessions(pool, user_id).await?;

    Ok(user_id)
}

/// Deliver a reset code via Resend.
pub async fn send_reset_code_email(
    mailer: &MailerConfig,
    to_email: &str,
    code: &str,
) -> Result<(), AuthError> {
    let resend = Resend::new(&mailer.api_key);
    let to = [to_email];
    let subject = "Seu código de recuperação de senha";
    let html = render_reset_code_template(to_email, code);

    let email = CreateEmailBaseOptions::new(&mailer.from, to, subject).with_html(&html);
    resend
        .emails
        .send(email)
        .await
        .map_err(|e| AuthError::EmailDelivery(e.to_string()))?;
    Ok(())
}

#[must_use]
pub fn render_reset_code_template(email: &str, code: &str) -> String {
    RESET_EMAIL_TEMPLATE
        .replace("{{EMAIL}}", email)
        .replace("{{CODE}}", code)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
