mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod interview;
mod ml_client;
mod models;
mod resume;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::db::create_pool;
use crate::ml_client::MlClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PrepDesk API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and run migrations
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize ML client
    let ml = MlClient::new(
        &config.ml_service_url,
        Duration::from_secs(config.ml_timeout_secs),
    )
    .context("Failed to build ML service client")?;
    info!("ML client initialized ({})", config.ml_service_url);

    let cors = build_cors(&config)?;

    let state = AppState {
        interviews: store.clone(),
        resumes: store.clone(),
        users: store,
        ml: Arc::new(ml),
        tokens: TokenKeys::new(&config.jwt_secret, config.jwt_expiry_days),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS for the browser frontend. `*` allows any origin.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.cors_origin.trim() == "*" {
        return Ok(cors.allow_origin(Any));
    }
    let origin: HeaderValue = config
        .cors_origin
        .parse()
        .with_context(|| format!("CORS_ORIGIN is not a valid origin: '{}'", config.cors_origin))?;
    Ok(cors.allow_origin(origin))
}
