//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but request-level
//! errors go through `shares::ShareError` / `kernel::error::AppError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use shares::{InMemoryShareRepository, LedgerSeed, ShareConfig, share_router};
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,shares=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = share_config()?;
    let repo = load_ledger().await?;

    // CORS configuration
    let frontend_origins =
        env::var("FRONTEND_ORIGINS").unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .merge(share_router(repo, config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn share_config() -> anyhow::Result<ShareConfig> {
    let mut config = ShareConfig::default();

    if let Ok(raw) = env::var("TRUST_FORWARDED_FOR") {
        config.trust_forwarded_for = raw
            .trim()
            .parse()
            .context("TRUST_FORWARDED_FOR must be `true` or `false`")?;
    }
    if let Ok(raw) = env::var("MAX_BODY_BYTES") {
        config.max_body_bytes = raw
            .trim()
            .parse()
            .context("MAX_BODY_BYTES must be a byte count")?;
    }

    tracing::info!(
        trust_forwarded_for = config.trust_forwarded_for,
        max_body_bytes = config.max_body_bytes,
        "Share endpoint configured"
    );

    Ok(config)
}

async fn load_ledger() -> anyhow::Result<InMemoryShareRepository> {
    let Ok(path) = env::var("SEED_PATH") else {
        tracing::warn!("SEED_PATH not set, starting with an empty ledger");
        return Ok(InMemoryShareRepository::new());
    };

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read seed file {path}"))?;
    let seed: LedgerSeed = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse seed file {path}"))?;

    tracing::info!(path = %path, "Loaded ledger seed");

    Ok(InMemoryShareRepository::from_seed(seed))
}
