//! Faculty API Server Entry Point
//!
//! Bootstraps configuration, wires the store and cache, and starts the Axum
//! HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use faculty_api::telemetry::{init_tracing, TelemetryConfig};
use faculty_api::{
    connect_cache, create_api_router, ApiConfig, ApiError, ApiResult, AppState, CacheSettings,
    DbClient, DbConfig,
};
use faculty_storage::TeacherLookup;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let db_config = DbConfig::from_env();
    let db = DbClient::from_config(&db_config)?;

    let cache_settings = CacheSettings::from_env()?;
    let cache = connect_cache(&cache_settings).await?;

    let lookup = TeacherLookup::new(cache, Arc::new(db), cache_settings.cache_config());

    let api_config = ApiConfig::from_env()?;
    let state = AppState::new(Arc::new(lookup), api_config.request_timeout);
    let app = create_api_router(state, &api_config);

    let addr: SocketAddr = api_config.bind_addr().parse().map_err(|e| {
        ApiError::invalid_input(format!("Invalid bind address {}: {}", api_config.bind_addr(), e))
    })?;
    tracing::info!(%addr, "Starting faculty API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
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
