use vale_stories::services::auth::MailerConfig;
use vale_stories::services::dropbox::DropboxConfig;
use vale_stories::{db, routes, state};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Both integrations are optional: the service runs without them, the
    // related endpoints answer 503.
    let dropbox = match DropboxConfig::from_env() {
        Some(config) => {
            tracing::info!("Dropbox media bridge configured");
            Some(config)
        }
        None => {
            tracing::warn!("Dropbox env vars not set — media bridge disabled");
            None
        }
    };
    let mailer = match MailerConfig::from_env() {
        Some(config) => {
            tracing::info!(from = %config.from, "reset-code mailer configured");
            Some(config)
        }
        None => {
            tracing::warn!("RESEND env vars not set — reset-code email disabled");
            None
        }
    };

    let state = state::AppState::new(pool, dropbox, mailer);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "vale-stories listening");
    axum::serve(listener, app).await.expect("server failed");
}
