mod config;
mod db;
mod embedding_client;
mod errors;
mod evaluations;
mod extraction;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::matching::encoder::load_encoder;
use crate::matching::semantic::SemanticMatcher;
use crate::matching::skills::SkillVocabulary;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: missing required env vars abort startup
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Relevance API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    let vocabulary = SkillVocabulary::load(config.skill_vocabulary_path.as_deref())?;
    info!("Skill vocabulary loaded ({} patterns)", vocabulary.len());

    // Loaded once and shared by every request
    let encoder = load_encoder(&config).await?;
    let semantic = SemanticMatcher::new(
        encoder,
        Duration::from_secs(config.embedding_timeout_secs),
    );

    let state = AppState {
        db,
        config: config.clone(),
        semantic,
        vocabulary: Arc::new(vocabulary),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
