use std::{path::Path, sync::Arc};

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

mod config;
mod db;
mod error;
mod handlers;
mod models;

use crate::config::Config;
use crate::db::{JsonFileStore, Store};

/// Shared application state. The store is injected so tests can swap in a fake.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gpu_inventory=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let store = JsonFileStore::new(&config.database_path);
    info!(path = %store.path().display(), "Using GPU database file");
    if !store.path().exists() {
        warn!(
            path = %store.path().display(),
            "GPU database file does not exist yet; reads will fail until it is created"
        );
    }

    let public_dir = config.public_dir.is_dir().then_some(config.public_dir.as_path());
    match public_dir {
        Some(dir) => info!(dir = %dir.display(), "Serving static assets"),
        None => info!(dir = %config.public_dir.display(), "No static asset directory; API only"),
    }

    let state = AppState {
        store: Arc::new(store),
    };
    let app = build_router(state, public_dir);

    let addr = format!("{}:{}", config.host, config.port);
    info!("GPU inventory listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, public_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/api/health", get(handlers::health))

        // ── GPU inventory ───────────────────────────────────────────────────
        .route("/api/gpu-database", get(handlers::gpus::get_database))
        .route(
            "/api/gpus",
            get(handlers::gpus::list_gpus).post(handlers::gpus::create_gpu),
        )
        .route("/api/gpus/:id", patch(handlers::gpus::update_gpu_status));

    // ── Static assets: list view at "/", everything else from the directory ─
    if let Some(dir) = public_dir {
        app = app
            .route_service("/", ServeFile::new(dir.join("list-view.html")))
            .fallback_service(ServeDir::new(dir));
    }

    app
        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
