//! Site configuration — the singleton theming row every page reads.
//!
//! DESIGN
//! ======
//! The row is created by the initial migration and only ever updated.
//! Reads apply the client's historical fallback values so the API always
//! hands out a fully-populated theme; writes are partial (only provided
//! fields change) and bump `version`.

use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const DEFAULT_NAVBAR_TITLE: &str = "Vale Notícias";
pub const DEFAULT_LOGIN_CARD_COLOR: &str = "#0F0F10";
pub const DEFAULT_LOGIN_BUTTON_COLOR: &str = "#CB5EEE";
pub const DEFAULT_LOGIN_BUTTON_TEXT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_LOGIN_DEVELOPER_TEXT: &str = "2025 | Desenvolvido por Vinícius Dev";
pub const DEFAULT_LOGIN_QUOTE: &str = "No futuro, a tecnologia nos permitirá criar realidades \
alternativas tão convincentes que será difícil distinguir o que é real do que é simulado.";
pub const DEFAULT_LOGIN_QUOTE_AUTHOR: &str = "Jaron Lanier";
pub const DEFAULT_LOGIN_QUOTE_AUTHOR_TITLE: &str =
    "Cientista da computação e especialista em realidade virtual.";

#[derive(Debug, thiserror::Error)]
pub enum SiteConfigError {
    #[error("site configuration row missing")]
    Missing,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The theming row as served to clients.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SiteConfig {
    pub id: Uuid,
    pub theme_name: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub navbar_color: Option<String>,
    pub navbar_logo_type: String,
    pub navbar_logo_text: Option<String>,
    pub navbar_logo_image: Option<String>,
    /// Derived: logo text, falling back to the site name.
    pub navbar_title: String,
    pub language: String,
    pub enable_dark_mode: bool,
    pub font_size: String,
    pub high_contrast: bool,
    pub button_primary_color: Option<String>,
    pub button_secondary_color: Option<String>,
    pub footer_copyright_text: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_author: Option<String>,
    pub meta_image: Option<String>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub weather_api_key: Option<String>,
    pub login_background_image: Option<String>,
    pub login_card_background_color: String,
    pub login_button_color: String,
    pub login_button_text_color: String,
    pub login_developer_text: String,
    pub login_quote_text: String,
    pub login_quote_author: String,
    pub login_quote_author_title: String,
    pub version: i32,
    pub updated_at: String,
}

/// Raw nullable login/navbar fields as stored, before defaults.
#[derive(Debug, Clone, Default)]
pub struct LoginTheme {
    pub navbar_logo_text: Option<String>,
    pub login_card_background_color: Option<String>,
    pub login_button_color: Option<String>,
    pub login_button_text_color: Option<String>,
    pub login_developer_text: Option<String>,
    pub login_quote_text: Option<String>,
    pub login_quote_author: Option<String>,
    pub login_quote_author_title: Option<String>,
}

/// Resolved login/navbar fields with every fallback applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLoginTheme {
    pub navbar_title: String,
    pub login_card_background_color: String,
    pub login_button_color: String,
    pub login_button_text_color: String,
    pub login_developer_text: String,
    pub login_quote_text: String,
    pub login_quote_author: String,
    pub login_quote_author_title: String,
}

/// Apply the client's historical default values.
#[must_use]
pub fn apply_defaults(theme: LoginTheme) -> ResolvedLoginTheme {
    ResolvedLoginTheme {
        navbar_title: theme
            .navbar_logo_text
            .unwrap_or_else(|| DEFAULT_NAVBAR_TITLE.to_owned()),
        login_card_background_color: theme
            .login_card_background_color
            .unwrap_or_else(|| DEFAULT_LOGIN_CARD_COLOR.to_owned()),
        login_button_color: theme
            .login_button_color
            .unwrap_or_else(|| DEFAULT_LOGIN_BUTTON_COLOR.to_owned()),
        login_button_text_color: theme
            .login_button_text_color
            .unwrap_or_else(|| DEFAULT_LOGIN_BUTTON_TEXT_COLOR.to_owned()),
        login_developer_text: theme
            .login_developer_text
            .unwrap_or_else(|| DEFAULT_LOGIN_DEVELOPER_TEXT.to_owned()),
        login_quote_text: theme
            .login_quote_text
            .unwrap_or_else(|| DEFAULT_LOGIN_QUOTE.to_owned()),
        login_quote_author: theme
            .login_quote_author
            .unwrap_or_else(|| DEFAULT_LOGIN_QUOTE_AUTHOR.to_owned()),
        login_quote_author_title: theme
            .login_quote_author_title
            .unwrap_or_else(|| DEFAULT_LOGIN_QUOTE_AUTHOR_TITLE.to_owned()),
    }
}

/// Fetch the singleton configuration row with defaults applied.
pub async fn get_config(pool: &PgPool) -> Result<SiteConfig, SiteConfigError> {
    let row = sqlx::query(
        r#"SELECT id, theme_name, primary_color, secondary_color, background_color, text_color,
                  navbar_color, navbar_logo_type, navbar_logo_text, navbar_logo_image,
                  language, enable_dark_mode, font_size, high_contrast,
                  button_primary_color, button_secondary_color, footer_copyright_text,
                  meta_title, meta_description, meta_author, meta_image,
                  location_city, location_state, location_country, location_lat, location_lng,
                  weather_api_key,
                  login_background_image, login_card_background_color, login_button_color,
                  login_button_text_color, login_developer_text, login_quote_text,
                  login_quote_author, login_quote_author_title,
                  version,
                  to_char(updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
           FROM site_configuration
           LIMIT 1"#,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(SiteConfigError::Missing)?;

    let theme = apply_defaults(LoginTheme {
        navbar_logo_text: row.get("navbar_logo_text"),
        login_card_background_color: row.get("login_card_background_color"),
        login_button_color: row.get("login_button_color"),
        login_button_text_color: row.get("login_button_text_color"),
        login_developer_text: row.get("login_developer_text"),
        login_quote_text: row.get("login_quote_text"),
        login_quote_author: row.get("login_quote_author"),
        login_quote_author_title: row.get("login_quote_author_title"),
    });

    Ok(SiteConfig {
        id: row.get("id"),
        theme_name: row.get("theme_name"),
        primary_color: row.get("primary_color"),
        secondary_color: row.get("secondary_color"),
        background_color: row.get("background_color"),
        text_color: row.get("text_color"),
        navbar_color: row.get("navbar_color"),
        navbar_logo_type: row.get("navbar_logo_type"),
        navbar_logo_text: row.get("navbar_logo_text"),
        navbar_logo_image: row.get("navbar_logo_image"),
        navbar_title: theme.navbar_title,
        language: row.get("language"),
        enable_dark_mode: row.get("enable_dark_mode"),
        font_size: row.get("font_size"),
        high_contrast: row.get("high_contrast"),
        button_primary_color: row.get("button_primary_color"),
        button_secondary_color: row.get("button_secondary_color"),
        footer_copyright_text: row.get("footer_copyright_text"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        meta_author: row.get("meta_author"),
        meta_image: row.get("meta_image"),
        location_city: row.get("location_city"),
        location_state: row.get("location_state"),
        location_country: row.get("location_country"),
        location_lat: row.get("location_lat"),
        location_lng: row.get("location_lng"),
        weather_api_key: row.get("weather_api_key"),
        login_background_image: row.get("login_background_image"),
        login_card_background_color: theme.login_card_background_color,
        login_button_color: theme.login_button_color,
        login_button_text_color: theme.login_button_text_color,
        login_developer_text: theme.login_developer_text,
        login_quote_text: theme.login_quote_text,
        login_quote_author: theme.login_quote_author,
        login_quote_author_title: theme.login_quote_author_title,
        version: row.get("version"),
        updated_at: row.get("updated_at"),
    })
}

/// Partial update of the theming row. Only provided fields change.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SiteConfigUpdate {
    pub theme_name: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub navbar_color: Option<String>,
    pub navbar_logo_type: Option<String>,
    pub navbar_logo_text: Option<String>,
    pub navbar_logo_image: Option<String>,
    pub language: Option<String>,
    pub enable_dark_mode: Option<bool>,
    pub font_size: Option<String>,
    pub high_contrast: Option<bool>,
    pub button_primary_color: Option<String>,
    pub button_secondary_color: Option<String>,
    pub footer_copyright_text: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_author: Option<String>,
    pub meta_image: Option<String>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub weather_api_key: Option<String>,
    pub login_background_image: Option<String>,
    pub login_card_background_color: Option<String>,
    pub login_button_color: Option<String>,
    pub login_button_text_color: Option<String>,
    pub login_developer_text: Option<String>,
    pub login_quote_text: Option<String>,
    pub login_quote_author: Option<String>,
    pub login_quote_author_title: Option<String>,
}

/// Apply a partial update and bump the version.
pub async fn update_config(pool: &PgPool, update: &SiteConfigUpdate) -> Result<(), SiteConfigError> {
    let result = sqlx::query(
        r"UPDATE site_configuration SET
              theme_name = COALESCE($1, theme_name),
              primary_color = COALESCE($2, primary_color),
              secondary_color = COALESCE($3, secondary_color),
              background_color = COALESCE($4, background_color),
              text_color = COALESCE($5, text_color),
              navbar_color = COALESCE($6, navbar_color),
              navbar_logo_type = COALESCE($7, navbar_logo_type),
              navbar_logo_text = COALESCE($8, navbar_logo_text),
              navbar_logo_image = COALESCE($9, navbar_logo_image),
              language = COALESCE($10, language),
              enable_dark_mode = COALESCE($11, enable_dark_mode),
              font_size = COALESCE($12, font_size),
              high_contrast = COALESCE($13, high_contrast),
              button_primary_color = COALESCE($14, button_primary_color),
              button_secondary_color = COALESCE($15, button_secondary_color),
              footer_copyright_text = COALESCE($16, footer_copyright_text),
              meta_title = COALESCE($17, meta_title),
              meta_description = COALESCE($18, meta_description),
              meta_author = COALESCE($19, meta_author),
              meta_image = COALESCE($20, meta_image),
              location_city = COALESCE($21, location_city),
              location_state = COALESCE($22, location_state),
              location_country = COALESCE($23, location_country),
              location_lat = COALESCE($24, location_lat),
              location_lng = COALESCE($25, location_lng),
              weather_api_key = COALESCE($26, weather_api_key),
              login_background_image = COALESCE($27, login_background_image),
              login_card_background_color = COALESCE($28, login_card_background_color),
              login_button_color = COALESCE($29, login_button_color),
              login_button_text_color = COALESCE($30, login_button_text_color),
              login_developer_text = COALESCE($31, login_developer_text),
              login_quote_text = COALESCE($32, login_quote_text),
              login_quote_author = COALESCE($33, login_quote_author),
              login_quote_author_title = COALESCE($34, login_quote_author_title),
              version = version + 1,
              updated_at = now()",
    )
    .bind(&update.theme_name)
    .bind(&update.primary_color)
    .bind(&update.secondary_color)
    .bind(&update.background_color)
    .bind(&update.text_color)
    .bind(&update.navbar_color)
    .bind(&update.navbar_logo_type)
    .bind(&update.navbar_logo_text)
    .bind(&update.navbar_logo_image)
    .bind(&update.language)
    .bind(update.enable_dark_mode)
    .bind(&update.font_size)
    .bind(update.high_contrast)
    .bind(&update.button_primary_color)
    .bind(&update.button_secondary_color)
    .bind(&update.footer_copyright_text)
    .bind(&update.meta_title)
    .bind(&update.meta_description)
    .bind(&update.meta_author)
    .bind(&update.meta_image)
    .bind(&update.location_city)
    .bind(&update.location_state)
    .bind(&update.location_country)
    .bind(update.location_lat)
    .bind(update.location_lng)
    .bind(&update.weather_api_key)
    .bind(&update.login_background_image)
    .bind(&update.login_card_background_color)
    .bind(&update.login_button_color)
    .bind(&update.login_button_text_color)
    .bind(&update.login_developer_text)
    .bind(&update.login_quote_text)
    .bind(&update.login_quote_author)
    .bind(&update.login_quote_author_title)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(SiteConfigError::Missing);
    }
    Ok(())
}

/// A selectable city for the admin location picker.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LocationRow {
    pub id: Uuid,
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Read-only list of known locations.
pub async fn list_locations(pool: &PgPool) -> Result<Vec<LocationRow>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, city, state, country, lat, lng FROM locations ORDER BY city ASC")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| LocationRow {
            id: r.get("id"),
            city: r.get("city"),
            state: r.get("state"),
            country: r.get("country"),
            lat: r.get("lat"),
            lng: r.get("lng"),
        })
        .collect())
}

#[cfg(test)]
#[path = "site_config_test.rs"]
mod tests;
