use std::path::PathBuf;

use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use wabridge_server::{build_router, storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wabridge_server=info,tower_http=info".into()),
        )
        .init();

    // Data directory
    let data_dir = std::env::var("WABRIDGE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    tracing::info!("data directory: {}", data_dir.display());

    // Initialize database
    let db = storage::init_db(&data_dir)?;
    tracing::info!("database initialized");

    // Lazily create the admin settings singleton on first start
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());
    storage::ensure_admin_settings(&db, &admin_password)?;

    let mut app = build_router(db);

    // Serve static files from the web build if present
    let web_dir = std::env::var("WABRIDGE_WEB_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("web/build"));
    if web_dir.exists() {
        tracing::info!("serving static files from {}", web_dir.display());
        let index_html = web_dir.join("index.html");
        app = app.fallback_service(ServeDir::new(&web_dir).fallback(ServeFile::new(index_html)));
    }

    let app = app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    tracing::info!("starting server on port {port}");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
