use arc_swap::ArcSwap;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    metrics,
    pricing::{CatalogUnifier, Provider, RawPricingStore, UnifiedComparison, UnifiedResponse},
};

/// Shared state for the pricing routes
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<Config>>,
    pub store: Arc<dyn RawPricingStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegionQuery {
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComparisonQuery {
    pub aws_region: Option<String>,
    pub azure_region: Option<String>,
}

/// GET /pricing/:provider?region=R
pub async fn get_provider_catalog(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<RegionQuery>,
) -> Result<Json<UnifiedResponse>, AppError> {
    let provider: Provider = provider.parse().map_err(AppError::ProviderNotFound)?;
    metrics::record_request(provider.as_str());

    let config = state.config.load_full();
    let region = region_or_default(params.region, &config);
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "pricing_request",
        %request_id,
        provider = %provider,
        region = %region,
    );

    let unifier = CatalogUnifier::new(state.store.clone(), &config);
    let response = with_deadline(&config, unifier.build_catalog(provider, &region))
        .instrument(span)
        .await?;

    Ok(Json(response))
}

/// GET /pricing/unified?aws_region=R1&azure_region=R2
pub async fn get_unified(
    State(state): State<AppState>,
    Query(params): Query<ComparisonQuery>,
) -> Result<Json<UnifiedComparison>, AppError> {
    metrics::record_request("unified");

    let config = state.config.load_full();
    let aws_region = region_or_default(params.aws_region, &config);
    let azure_region = region_or_default(params.azure_region, &config);
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "pricing_request",
        %request_id,
        provider = "unified",
        aws_region = %aws_region,
        azure_region = %azure_region,
    );

    let unifier = CatalogUnifier::new(state.store.clone(), &config);
    let comparison = with_deadline(&config, unifier.build_comparison(&aws_region, &azure_region))
        .instrument(span)
        .await?;

    Ok(Json(comparison))
}

fn region_or_default(region: Option<String>, config: &Config) -> String {
    region
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| config.pricing.default_region.clone())
}

/// Run a catalog build under the request deadline.
///
/// On expiry the build future is dropped, which cancels every pending lookup.
async fn with_deadline<F: Future>(config: &Config, build: F) -> Result<F::Output, AppError> {
    let limit = Duration::from_secs(config.server.request_timeout_seconds);
    tokio::time::timeout(limit, build).await.map_err(|_| {
        warn!(timeout_seconds = limit.as_secs(), "Catalog build exceeded request deadline");
        AppError::Timeout(format!(
            "catalog build did not finish within {}s",
            limit.as_secs()
        ))
    })
}
