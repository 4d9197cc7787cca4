//! # covenant-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the attestation pipeline and, alongside
//! it, the periodic Merkle batcher. Binds to a configurable port (default
//! 8080).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use covenant_api::batcher;
use covenant_api::ledger::{Ledger, NullLedger};
use covenant_api::state::{AppConfig, AppState};
use covenant_crypto::{EncryptionKey, SigningKey};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL must be set")?;

    let signing_key_hex = std::env::var("SIGNING_KEY").ok();
    let encryption_key_hex = std::env::var("ENCRYPTION_KEY").ok();

    let unit_cost: f64 = std::env::var("UNIT_COST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.01);

    let batch_size: i64 = std::env::var("BATCH_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(covenant_merkle::MAX_BATCH_SIZE as i64);

    let batch_interval_secs: u64 = std::env::var("BATCH_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);

    let rate_limit_max: u64 = std::env::var("RATE_LIMIT_MAX")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    let rate_limit_window_secs: u64 = std::env::var("RATE_LIMIT_WINDOW_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);

    let config = AppConfig {
        port,
        database_url: Some(database_url.clone()),
        signing_key_hex: signing_key_hex.clone(),
        encryption_key_hex: encryption_key_hex.clone(),
        unit_cost,
        batch_size,
    };

    let db = covenant_api::db::pool::init_pool(&database_url).await.map_err(|e| {
        tracing::error!("database initialization failed: {e}");
        e
    })?;

    // A missing or malformed key degrades the deployment to read-only
    // (verification keeps working, issuance refuses with *internal*) rather
    // than aborting startup — §7.
    let signing_key = match signing_key_hex.as_deref() {
        Some(hex) => match SigningKey::from_hex(hex) {
            Ok(key) => Some(Arc::new(key)),
            Err(e) => {
                tracing::error!("SIGNING_KEY is set but invalid: {e}; issuance disabled");
                None
            }
        },
        None => {
            tracing::warn!("SIGNING_KEY not set; issuance disabled");
            None
        }
    };

    let encryption_key = match encryption_key_hex.as_deref() {
        Some(hex) => match EncryptionKey::from_hex(hex) {
            Ok(key) => Some(Arc::new(key)),
            Err(e) => {
                tracing::error!("ENCRYPTION_KEY is set but invalid: {e}; issuance disabled");
                None
            }
        },
        None => {
            tracing::warn!("ENCRYPTION_KEY not set; issuance disabled");
            None
        }
    };

    let state = AppState {
        config,
        db,
        signing_key,
        encryption_key,
    };

    if !state.can_issue() {
        tracing::warn!("starting in degraded mode: issuance unavailable until both keys are configured");
    }

    let ledger: Arc<dyn Ledger> = Arc::new(NullLedger);
    batcher::spawn(state.clone(), ledger, Duration::from_secs(batch_interval_secs));

    let rate_limit_config = covenant_api::middleware::rate_limit::RateLimitConfig {
        max_requests: rate_limit_max,
        window_secs: rate_limit_window_secs,
    };

    let app = covenant_api::app(state, rate_limit_config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("covenant-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
