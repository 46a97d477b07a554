pub mod aws;
pub mod azure;
pub mod extractor;
pub mod fallback;
pub mod models;
pub mod store;
pub mod unifier;
pub mod walker;

pub use aws::AwsExtractor;
pub use azure::AzureExtractor;
pub use extractor::PriceExtractor;
pub use models::{
    Category, ExtractedPrice, PriceCatalog, PriceMap, Provider, SkuQuery, UnifiedComparison,
    UnifiedResponse,
};
pub use store::{RawPricingStore, SqliteStore, StoreError};
pub use unifier::CatalogUnifier;
