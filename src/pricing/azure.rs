//! Price extraction from flat Azure retail price records

use crate::config::{AzureConfig, EGRESS_KEY};
use crate::metrics;
use crate::pricing::extractor::PriceExtractor;
use crate::pricing::fallback;
use crate::pricing::models::{Category, ExtractedPrice, PriceMap, Provider, SkuQuery};
use crate::pricing::store::{
    AzureRecordFilter, AzureSkuField, AzureSkuFilter, MatchMode, RawPricingStore,
};
use crate::region;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AzureExtractor {
    store: Arc<dyn RawPricingStore>,
    config: AzureConfig,
}

impl AzureExtractor {
    pub fn new(store: Arc<dyn RawPricingStore>, config: AzureConfig) -> Self {
        Self { store, config }
    }

    /// Read `retail_price` from the first record matching the flat filters.
    ///
    /// `region = None` drops the region predicate.
    pub async fn extract_price(
        &self,
        service: &str,
        region: Option<&str>,
        sku: &AzureSkuFilter,
        price_type: &str,
    ) -> ExtractedPrice {
        let filter = AzureRecordFilter {
            service_name: service,
            region,
            sku,
            price_type,
        };

        match self.store.find_azure_record(&filter).await {
            Ok(Some(record)) => {
                let price = ExtractedPrice::from_option(record.retail_price);
                if !price.found {
                    debug!(
                        service,
                        region,
                        meter = ?record.meter_name,
                        sku = ?record.arm_sku_name,
                        "Retail record has no usable price"
                    );
                }
                price
            }
            Ok(None) => {
                debug!(service, region, sku = %sku.value, "No matching retail record");
                ExtractedPrice::not_found()
            }
            Err(e) => {
                warn!(service, region, error = %e, "Retail record lookup failed");
                ExtractedPrice::not_found()
            }
        }
    }

    fn sku_filter(&self, query: &SkuQuery) -> AzureSkuFilter {
        match query.category {
            Category::Compute => AzureSkuFilter {
                field: AzureSkuField::ArmSkuName,
                value: query.identifier.clone(),
                mode: MatchMode::Exact,
            },
            Category::Storage | Category::Transfer => AzureSkuFilter {
                field: AzureSkuField::MeterName,
                value: query.identifier.clone(),
                mode: MatchMode::Contains,
            },
        }
    }

    fn service(&self, category: Category) -> &str {
        match category {
            Category::Compute => &self.config.compute_service,
            Category::Storage => &self.config.storage_service,
            Category::Transfer => &self.config.transfer_service,
        }
    }
}

#[async_trait]
impl PriceExtractor for AzureExtractor {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    fn candidates(&self, category: Category) -> &[String] {
        match category {
            Category::Compute => &self.config.compute_candidates,
            Category::Storage => &self.config.storage_candidates,
            Category::Transfer => &[],
        }
    }

    fn defaults(&self, category: Category) -> &PriceMap {
        self.config.defaults.get(category)
    }

    async fn lookup(&self, query: &SkuQuery) -> ExtractedPrice {
        let native = region::translate(Provider::Azure, &query.region);
        let sku = self.sku_filter(query);

        let price = self
            .extract_price(
                self.service(query.category),
                Some(&native),
                &sku,
                &self.config.price_type,
            )
            .await;
        metrics::record_lookup(Provider::Azure, query.category, price.found);
        price
    }

    /// Egress price from the region-scoped meter, else the same meter in any
    /// region. An empty map leaves the static default to the fallback policy.
    async fn transfer_prices(&self, region: &str) -> PriceMap {
        let native = region::translate(Provider::Azure, region);
        let sku = AzureSkuFilter {
            field: AzureSkuField::MeterName,
            value: self.config.transfer_meter.clone(),
            mode: MatchMode::Contains,
        };
        let service = self.service(Category::Transfer);
        let price_type = self.config.price_type.as_str();

        let scopes = [Some(native.as_str()), None];
        let hit = fallback::first_available(scopes, |scope| {
            self.extract_price(service, scope, &sku, price_type)
        })
        .await;

        let mut prices = PriceMap::new();
        match hit {
            Some((tier, price)) => {
                let scope = if tier == 0 { "region" } else { "global" };
                info!(region = %native, scope, price, "Resolved egress price");
                metrics::record_lookup(Provider::Azure, Category::Transfer, true);
                prices.insert(EGRESS_KEY.to_string(), price);
            }
            None => {
                metrics::record_lookup(Provider::Azure, Category::Transfer, false);
            }
        }
        prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::store::{AwsDocumentFilter, AzureRecord, StoreError};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records keyed by (region, sku value); a `None` region key matches unscoped lookups
    #[derive(Default)]
    struct FakeStore {
        records: HashMap<(Option<String>, String), Option<f64>>,
        seen: Mutex<Vec<(String, Option<String>, AzureSkuFilter)>>,
    }

    impl FakeStore {
        fn with(mut self, region: Option<&str>, sku: &str, price: Option<f64>) -> Self {
            self.records
                .insert((region.map(str::to_string), sku.to_string()), price);
            self
        }
    }

    #[async_trait]
    impl RawPricingStore for FakeStore {
        async fn find_aws_document(
            &self,
            _filter: &AwsDocumentFilter<'_>,
        ) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        async fn find_azure_record(
            &self,
            filter: &AzureRecordFilter<'_>,
        ) -> Result<Option<AzureRecord>, StoreError> {
            self.seen.lock().unwrap().push((
                filter.service_name.to_string(),
                filter.region.map(str::to_string),
                filter.sku.clone(),
            ));
            let key = (filter.region.map(str::to_string), filter.sku.value.clone());
            Ok(self.records.get(&key).map(|price| AzureRecord {
                retail_price: *price,
                arm_sku_name: None,
                meter_name: Some(filter.sku.value.clone()),
            }))
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_compute_lookup_exact_sku_in_native_region() {
        let store = Arc::new(FakeStore::default().with(Some("eastus"), "Standard_B1s", Some(0.0104)));
        let extractor = AzureExtractor::new(store.clone(), AzureConfig::default());

        let price = extractor
            .lookup(&SkuQuery::new(Category::Compute, "Standard_B1s", "us-east-1"))
            .await;
        assert_eq!(price.price(), Some(0.0104));

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[0].0, "Virtual Machines");
        assert_eq!(seen[0].1.as_deref(), Some("eastus"));
        assert_eq!(seen[0].2.field, AzureSkuField::ArmSkuName);
        assert_eq!(seen[0].2.mode, MatchMode::Exact);
    }

    #[tokio::test]
    async fn test_storage_lookup_matches_meter_name() {
        let store =
            Arc::new(FakeStore::default().with(Some("westeurope"), "Hot LRS Data Stored", Some(0.02)));
        let extractor = AzureExtractor::new(store.clone(), AzureConfig::default());

        let price = extractor
            .lookup(&SkuQuery::new(Category::Storage, "Hot LRS Data Stored", "westeurope"))
            .await;
        assert!(price.found);

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen[0].0, "Storage");
        assert_eq!(seen[0].2.field, AzureSkuField::MeterName);
        assert_eq!(seen[0].2.mode, MatchMode::Contains);
    }

    #[tokio::test]
    async fn test_null_and_negative_prices_are_not_found() {
        let store = Arc::new(
            FakeStore::default()
                .with(Some("eastus"), "Standard_B1s", None)
                .with(Some("eastus"), "Standard_B2s", Some(-1.0)),
        );
        let extractor = AzureExtractor::new(store, AzureConfig::default());

        for sku in ["Standard_B1s", "Standard_B2s"] {
            let price = extractor
                .lookup(&SkuQuery::new(Category::Compute, sku, "eastus"))
                .await;
            assert!(!price.found, "{} should be absent", sku);
        }
    }

    #[tokio::test]
    async fn test_transfer_prefers_region_scoped_price() {
        let store = Arc::new(
            FakeStore::default()
                .with(Some("eastus"), "Data Transfer Out", Some(0.087))
                .with(None, "Data Transfer Out", Some(0.12)),
        );
        let extractor = AzureExtractor::new(store.clone(), AzureConfig::default());

        let prices = extractor.transfer_prices("us-east-1").await;
        assert_eq!(prices.get(EGRESS_KEY), Some(&0.087));
        // the unscoped tier is never consulted
        assert_eq!(store.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_falls_back_to_unscoped_price() {
        let store = Arc::new(
            FakeStore::default()
                .with(Some("eastus"), "Data Transfer Out", Some(0.0))
                .with(None, "Data Transfer Out", Some(0.12)),
        );
        let extractor = AzureExtractor::new(store.clone(), AzureConfig::default());

        let prices = extractor.transfer_prices("eastus").await;
        assert_eq!(prices.get(EGRESS_KEY), Some(&0.12));

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].0, "Bandwidth");
        assert!(seen[1].1.is_none());
    }

    #[test]
    fn test_transfer_has_no_candidate_lookups() {
        let extractor = AzureExtractor::new(Arc::new(FakeStore::default()), AzureConfig::default());

        assert!(extractor.candidates(Category::Transfer).is_empty());
        assert_eq!(extractor.candidates(Category::Compute).len(), 6);
        assert!(extractor.live_transfer());
    }

    #[tokio::test]
    async fn test_transfer_empty_when_no_tier_matches() {
        let store = Arc::new(FakeStore::default());
        let extractor = AzureExtractor::new(store, AzureConfig::default());

        assert!(extractor.transfer_prices("r1").await.is_empty());
    }
}
