use crate::config::Config;
use crate::metrics;
use crate::pricing::aws::AwsExtractor;
use crate::pricing::azure::AzureExtractor;
use crate::pricing::extractor::PriceExtractor;
use crate::pricing::fallback;
use crate::pricing::models::{
    Category, PriceCatalog, PriceMap, Provider, SkuQuery, UnifiedComparison, UnifiedResponse,
};
use crate::pricing::store::RawPricingStore;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Builds normalized catalogs for both providers from one config snapshot.
///
/// Constructed per request; holds nothing but the injected store handle and
/// the candidate/default tables.
pub struct CatalogUnifier {
    aws: AwsExtractor,
    azure: AzureExtractor,
}

impl CatalogUnifier {
    pub fn new(store: Arc<dyn RawPricingStore>, config: &Config) -> Self {
        Self {
            aws: AwsExtractor::new(store.clone(), config.aws.clone()),
            azure: AzureExtractor::new(store, config.azure.clone()),
        }
    }

    pub fn extractor(&self, provider: Provider) -> &dyn PriceExtractor {
        match provider {
            Provider::Aws => &self.aws,
            Provider::Azure => &self.azure,
        }
    }

    /// Compute, storage and transfer prices for one provider in `region`
    pub async fn build_catalog(&self, provider: Provider, region: &str) -> UnifiedResponse {
        build_with(self.extractor(provider), region).await
    }

    /// Independent AWS and Azure catalogs, each for its own canonical region
    pub async fn build_comparison(&self, aws_region: &str, azure_region: &str) -> UnifiedComparison {
        let (aws, azure) = tokio::join!(
            self.build_catalog(Provider::Aws, aws_region),
            self.build_catalog(Provider::Azure, azure_region),
        );
        UnifiedComparison { aws, azure }
    }
}

/// Run the category pipeline against any extractor
pub async fn build_with(extractor: &dyn PriceExtractor, region: &str) -> UnifiedResponse {
    let provider = extractor.provider();
    let started = Instant::now();
    let mut catalog = PriceCatalog::default();
    let mut sources = Vec::with_capacity(Category::ALL.len());

    for category in [Category::Compute, Category::Storage] {
        let extracted = extract_category(extractor, category, region).await;
        let (prices, source) =
            fallback::resolve(provider, category, extracted, extractor.defaults(category));
        catalog.set(category, prices);
        sources.push((category, source));
    }

    let (prices, source) = if extractor.live_transfer() {
        let transfer = extractor.transfer_prices(region).await;
        fallback::resolve(
            provider,
            Category::Transfer,
            transfer,
            extractor.defaults(Category::Transfer),
        )
    } else {
        fallback::constant(extractor.defaults(Category::Transfer))
    };
    catalog.set(Category::Transfer, prices);
    sources.push((Category::Transfer, source));

    let elapsed = started.elapsed();
    metrics::record_build_duration(provider, elapsed);
    info!(
        provider = %provider,
        region,
        compute = sources[0].1.as_str(),
        storage = sources[1].1.as_str(),
        transfer = sources[2].1.as_str(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Built price catalog"
    );

    UnifiedResponse {
        provider,
        region: region.to_string(),
        catalog,
    }
}

/// Look up every candidate of `category` concurrently and keep the hits.
///
/// Results are merged in candidate order, so a later candidate mapping to
/// the same canonical key wins.
async fn extract_category(
    extractor: &dyn PriceExtractor,
    category: Category,
    region: &str,
) -> PriceMap {
    let provider = extractor.provider();
    let queries: Vec<SkuQuery> = extractor
        .candidates(category)
        .iter()
        .map(|identifier| SkuQuery::new(category, identifier.as_str(), region))
        .collect();

    let results = join_all(queries.iter().map(|query| extractor.lookup(query))).await;

    let mut prices = PriceMap::new();
    for (query, result) in queries.iter().zip(results) {
        if let Some(price) = result.price() {
            prices.insert(provider.canonical_key(&query.identifier), price);
        }
    }

    debug!(
        provider = %provider,
        category = %category,
        found = prices.len(),
        candidates = queries.len(),
        "Category extraction finished"
    );
    prices
}
