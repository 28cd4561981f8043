//! CollabFlow API Server Entry Point
//!
//! Bootstraps configuration, the connection pool, and the broadcast
//! channel, then starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use collabflow_api::{
    create_app, ApiConfig, ApiError, ApiResult, AuthConfig, DbClient, DbConfig,
};
use collabflow_api::ws::WsState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing();

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();
    auth_config.validate_for_production()?;

    let ws_capacity = std::env::var("COLLABFLOW_WS_CAPACITY")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(1000);
    let ws = Arc::new(WsState::new(ws_capacity));

    let app = create_app(db, ws, auth_config, &api_config);

    let addr: SocketAddr = api_config
        .bind_addr
        .parse()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address: {}", e)))?;
    tracing::info!(%addr, "Starting CollabFlow API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("COLLABFLOW_LOG_FORMAT").as_deref() == Ok("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
