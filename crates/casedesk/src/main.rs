//! Casedesk - Admin-gated case-study publishing service

use anyhow::{Result, bail};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use casedesk_api::{AppState, AuthSettings, create_router};
use casedesk_auth::jwt::TokenService;
use casedesk_core::ListingCache;
use casedesk_db::Database;
use casedesk_storage::{ImageStore, LocalStore, S3Config, S3Store};
use config::Config;

/// Casedesk - case-study CMS backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "CASEDESK_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "CASEDESK_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting Casedesk v{}", env!("CARGO_PKG_VERSION"));

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&db_path).await?;

    // Initialize image storage
    let images: Arc<dyn ImageStore> = match config.storage.backend.as_str() {
        "local" => Arc::new(
            LocalStore::new(&config.storage.local.path, &config.server.public_url).await?,
        ),
        "s3" => Arc::new(S3Store::new(S3Config {
            bucket: config.storage.s3.bucket.clone(),
            region: config.storage.s3.region.clone(),
            endpoint: config.storage.s3.endpoint.clone(),
            access_key_id: config.storage.s3.access_key_id.clone(),
            secret_access_key: config.storage.s3.secret_access_key.clone(),
            allow_http: config.storage.s3.allow_http,
        })?),
        other => bail!("Unknown storage backend: {}", other),
    };

    // Initialize the token service; an empty secret aborts startup
    // instead of surfacing as 500s at login time.
    let tokens = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    )?);

    let state = AppState::new(
        db,
        images,
        tokens,
        Arc::new(ListingCache::new()),
        AuthSettings {
            login_key: config.auth.login_key.clone(),
            cookie_secure: config.auth.cookie_secure,
        },
    );

    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
