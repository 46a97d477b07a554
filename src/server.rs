use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    metrics,
    pricing::{RawPricingStore, SqliteStore},
    signals::setup_signal_handlers,
};

/// Start the pricing server
///
/// This function:
/// 1. Connects to the raw pricing store (fatal if unavailable)
/// 2. Initializes metrics
/// 3. Sets up signal handlers for graceful shutdown and config reload
/// 4. Creates the Axum application
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    info!("Connecting to raw pricing store at {}", config.database.url);
    let sqlite = Arc::new(
        SqliteStore::connect(&config.database.url, config.database.max_connections)
            .await
            .context("Raw pricing store unavailable")?,
    );
    let store: Arc<dyn RawPricingStore> = sqlite.clone();

    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    // Wrap config in ArcSwap for atomic reload support
    let config_swap = Arc::new(ArcSwap::from_pointee(config.clone()));

    let (shutdown_tx, signal_handle) = setup_signal_handlers(config_swap.clone(), config_path);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let state = AppState {
        config: config_swap,
        store,
    };
    let app = create_router(state, metrics_handle, &config.metrics.endpoint);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting pricing service on {}", addr);
    info!(
        "Configuration: default region {}, {} AWS and {} Azure compute candidates, request timeout {}s",
        config.pricing.default_region,
        config.aws.compute_candidates.len(),
        config.azure.compute_candidates.len(),
        config.server.request_timeout_seconds
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    sqlite.pool().close().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    state: AppState,
    metrics_handle: Option<Arc<PrometheusHandle>>,
    metrics_endpoint: &str,
) -> Router {
    let mut app = Router::new()
        .route("/pricing/unified", get(handlers::pricing::get_unified))
        .route(
            "/pricing/:provider",
            get(handlers::pricing::get_provider_catalog),
        )
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route(metrics_endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
        AppState {
            config: Arc::new(ArcSwap::from_pointee(Config::default())),
            store: Arc::new(store),
        }
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = create_router(test_state().await, None, "/metrics");

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_only_when_enabled() {
        let app = create_router(test_state().await, None, "/metrics");
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let app = create_router(test_state().await, Some(Arc::new(handle)), "/metrics");
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
