use crate::pricing::models::{Category, ExtractedPrice, PriceMap, Provider, SkuQuery};
use async_trait::async_trait;

/// Per-provider price extraction, as seen by the catalog unifier
#[async_trait]
pub trait PriceExtractor: Send + Sync {
    fn provider(&self) -> Provider;

    /// SKU identifiers tried for `category`, in order
    fn candidates(&self, category: Category) -> &[String];

    /// Static table substituted when `category` yields no live price
    fn defaults(&self, category: Category) -> &PriceMap;

    /// Resolve a single price point; never fails, misses are `found = false`
    async fn lookup(&self, query: &SkuQuery) -> ExtractedPrice;

    /// False when transfer is a configured constant and never read live
    fn live_transfer(&self) -> bool {
        true
    }

    /// Live transfer prices for `region`; empty when nothing usable was found
    async fn transfer_prices(&self, region: &str) -> PriceMap;
}
