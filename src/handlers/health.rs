use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::error::AppError;
use crate::handlers::AppState;

/// Liveness probe
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Readiness probe: the raw pricing store must answer
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    if let Err(e) = state.store.ping().await {
        warn!(error = %e, "Readiness check failed");
        return Err(e.into());
    }

    Ok((StatusCode::OK, Json(json!({ "status": "ready" }))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pricing::store::{
        AwsDocumentFilter, AzureRecord, AzureRecordFilter, RawPricingStore, StoreError,
    };
    use arc_swap::ArcSwap;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct DownStore;

    #[async_trait]
    impl RawPricingStore for DownStore {
        async fn find_aws_document(
            &self,
            _filter: &AwsDocumentFilter<'_>,
        ) -> Result<Option<String>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn find_azure_record(
            &self,
            _filter: &AzureRecordFilter<'_>,
        ) -> Result<Option<AzureRecord>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_fails_when_store_is_down() {
        let state = AppState {
            config: Arc::new(ArcSwap::from_pointee(Config::default())),
            store: Arc::new(DownStore),
        };

        let response = readiness_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
