//! Price extraction from AWS offer documents
//!
//! Each stored document carries `product.attributes` plus an on-demand term
//! tree keyed by generated codes:
//!
//! ```text
//! terms.OnDemand.<sku>.<sku.offerTermCode>.priceDimensions.<rateCode>.pricePerUnit.USD
//! ```

use crate::config::AwsConfig;
use crate::metrics;
use crate::pricing::extractor::PriceExtractor;
use crate::pricing::models::{Category, ExtractedPrice, PriceMap, Provider, SkuQuery};
use crate::pricing::store::{AttributeFilter, AwsDocumentFilter, RawPricingStore};
use crate::pricing::walker::{walk_price, Step};
use crate::region;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path from the document root to the price dimension holding `pricePerUnit`
const PRICE_DIMENSION_PATH: &[Step<'static>] = &[
    Step::Key("terms"),
    Step::Key("OnDemand"),
    Step::First,
    Step::First,
    Step::Key("priceDimensions"),
    Step::First,
    Step::Key("pricePerUnit"),
];

const CURRENCY: &str = "USD";

/// Attribute carrying the transfer direction on data transfer offers
const TRANSFER_TYPE_ATTRIBUTE: &str = "transferType";

pub struct AwsExtractor {
    store: Arc<dyn RawPricingStore>,
    config: AwsConfig,
}

impl AwsExtractor {
    pub fn new(store: Arc<dyn RawPricingStore>, config: AwsConfig) -> Self {
        Self { store, config }
    }

    /// Find the first offer document matching the filters and read its
    /// on-demand USD price.
    pub async fn extract_price(
        &self,
        service: &str,
        product_family: &str,
        attribute_filters: &[AttributeFilter],
        location: &str,
    ) -> ExtractedPrice {
        let filter = AwsDocumentFilter {
            service_code: service,
            product_family,
            location,
            attributes: attribute_filters,
        };

        let raw = match self.store.find_aws_document(&filter).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(service, product_family, location, "No matching offer document");
                return ExtractedPrice::not_found();
            }
            Err(e) => {
                warn!(service, location, error = %e, "Offer document lookup failed");
                return ExtractedPrice::not_found();
            }
        };

        let document: Value = match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                debug!(service, location, error = %e, "Skipping malformed offer document");
                return ExtractedPrice::not_found();
            }
        };

        let price = walk_price(&document, PRICE_DIMENSION_PATH, CURRENCY);
        if !price.found {
            debug!(service, location, "Offer document has no usable on-demand price");
        }
        price
    }

    fn compute_filters(&self, instance_type: &str) -> Vec<AttributeFilter> {
        let mut filters = vec![AttributeFilter::exact("instanceType", instance_type)];
        filters.extend(
            self.config
                .compute_attributes
                .iter()
                .map(|attr| AttributeFilter::exact(attr.name.as_str(), attr.value.as_str())),
        );
        filters
    }
}

#[async_trait]
impl PriceExtractor for AwsExtractor {
    fn provider(&self) -> Provider {
        Provider::Aws
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
        let location = region::translate(Provider::Aws, &query.region);

        let (service, family, filters) = match query.category {
            Category::Compute => (
                &self.config.compute_service,
                &self.config.compute_family,
                self.compute_filters(&query.identifier),
            ),
            Category::Storage => (
                &self.config.storage_service,
                &self.config.storage_family,
                vec![AttributeFilter::contains("storageClass", query.identifier.as_str())],
            ),
            Category::Transfer => (
                &self.config.transfer_service,
                &self.config.transfer_family,
                vec![AttributeFilter::exact(TRANSFER_TYPE_ATTRIBUTE, query.identifier.as_str())],
            ),
        };

        let price = self.extract_price(service, family, &filters, &location).await;
        metrics::record_lookup(Provider::Aws, query.category, price.found);
        price
    }

    /// AWS egress is never read live; the transfer category is always the
    /// configured constant table.
    fn live_transfer(&self) -> bool {
        false
    }

    async fn transfer_prices(&self, _region: &str) -> PriceMap {
        PriceMap::new()
    }
}
