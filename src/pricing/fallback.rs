//! Static default substitution
//!
//! Defaults apply per category, never per key: a category with at least one
//! live price is returned exactly as extracted, and a category with none is
//! replaced by its whole default table. Missing keys in a partially-resolved
//! category stay missing.

use crate::metrics;
use crate::pricing::models::{Category, ExtractedPrice, PriceMap, Provider};
use std::future::Future;
use tracing::info;

/// Where a category's prices came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Live,
    Fallback,
    /// Configured fixed table, no lookup attempted
    Constant,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Live => "live",
            PriceSource::Fallback => "fallback",
            PriceSource::Constant => "constant",
        }
    }
}

/// Apply the all-or-nothing fallback rule to one category's extraction result
pub fn resolve(
    provider: Provider,
    category: Category,
    extracted: PriceMap,
    defaults: &PriceMap,
) -> (PriceMap, PriceSource) {
    if !extracted.is_empty() {
        return (extracted, PriceSource::Live);
    }

    info!(
        provider = %provider,
        category = %category,
        entries = defaults.len(),
        "No live prices, using static defaults"
    );
    metrics::record_fallback(provider, category);
    (defaults.clone(), PriceSource::Fallback)
}

/// A category that is never extracted live takes its table as-is, without
/// counting as a fallback
pub fn constant(table: &PriceMap) -> (PriceMap, PriceSource) {
    (table.clone(), PriceSource::Constant)
}

/// Try each tier in order and stop at the first one yielding a usable price.
///
/// Returns the index of the winning tier and its price. Later tiers are not
/// attempted once one succeeds.
pub async fn first_available<T, F, Fut>(
    tiers: impl IntoIterator<Item = T>,
    mut attempt: F,
) -> Option<(usize, f64)>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ExtractedPrice>,
{
    for (index, tier) in tiers.into_iter().enumerate() {
        if let Some(price) = attempt(tier).await.price() {
            return Some((index, price));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, f64)]) -> PriceMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_empty_category_takes_whole_default_table() {
        let defaults = table(&[("tiny", 0.0104), ("small", 0.0208), ("medium", 0.0416)]);

        let (prices, source) = resolve(Provider::Aws, Category::Compute, PriceMap::new(), &defaults);
        assert_eq!(prices, defaults);
        assert_eq!(source, PriceSource::Fallback);
    }

    #[test]
    fn test_partial_category_is_not_filled() {
        let defaults = table(&[("tiny", 0.0104), ("small", 0.0208)]);
        let extracted = table(&[("small", 0.02)]);

        let (prices, source) = resolve(Provider::Azure, Category::Storage, extracted.clone(), &defaults);
        assert_eq!(prices, extracted);
        assert!(!prices.contains_key("tiny"));
        assert_eq!(source, PriceSource::Live);
    }

    #[test]
    fn test_constant_table_is_not_a_fallback() {
        let table = table(&[("internet_egress", 0.09)]);

        let (prices, source) = constant(&table);
        assert_eq!(prices, table);
        assert_eq!(source, PriceSource::Constant);
        assert_eq!(source.as_str(), "constant");
    }

    #[tokio::test]
    async fn test_first_available_stops_at_first_hit() {
        let mut attempted = Vec::new();
        let hit = first_available([0.0, 0.5, 0.7], |value| {
            attempted.push(value);
            async move { ExtractedPrice::from_value(value) }
        })
        .await;

        assert_eq!(hit, Some((1, 0.5)));
        assert_eq!(attempted, vec![0.0, 0.5]);
    }

    #[tokio::test]
    async fn test_first_available_none_when_all_miss() {
        let hit = first_available([-1.0, 0.0], |value| async move { ExtractedPrice::from_value(value) }).await;
        assert_eq!(hit, None);
    }
}
