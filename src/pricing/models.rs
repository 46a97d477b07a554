use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical key -> price for one category
pub type PriceMap = BTreeMap<String, f64>;

/// Supported cloud providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Nested offer documents
    Aws,
    /// Flat retail price records
    Azure,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
        }
    }

    /// Canonical key for a SKU, class label or meter name.
    ///
    /// Lower-cases and collapses `.`, `-`, `/` and whitespace runs into `_`.
    /// Azure keys additionally drop the `Standard_` tier prefix.
    pub fn canonical_key(&self, identifier: &str) -> String {
        let trimmed = match self {
            Provider::Aws => identifier,
            Provider::Azure => identifier.strip_prefix("Standard_").unwrap_or(identifier),
        };

        let mut key = String::with_capacity(trimmed.len());
        let mut pending_sep = false;
        for ch in trimmed.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                if pending_sep && !key.is_empty() && !key.ends_with('_') {
                    key.push('_');
                }
                pending_sep = false;
                key.push(ch.to_ascii_lowercase());
            } else {
                pending_sep = true;
            }
        }
        key
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "azure" => Ok(Provider::Azure),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Price categories of the unified schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Compute,
    Storage,
    Transfer,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Compute, Category::Storage, Category::Transfer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Compute => "compute",
            Category::Storage => "storage",
            Category::Transfer => "transfer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single SKU lookup within one catalog build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuQuery {
    pub category: Category,
    /// Instance type, storage class label or meter name
    pub identifier: String,
    pub region: String,
}

impl SkuQuery {
    pub fn new(category: Category, identifier: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            category,
            identifier: identifier.into(),
            region: region.into(),
        }
    }
}

/// Result of one extraction attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedPrice {
    pub value: f64,
    pub found: bool,
}

impl ExtractedPrice {
    pub fn not_found() -> Self {
        Self {
            value: 0.0,
            found: false,
        }
    }

    /// Wrap a raw value; zero, negative and non-finite values count as absent.
    pub fn from_value(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self { value, found: true }
        } else {
            Self::not_found()
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map(Self::from_value).unwrap_or_else(Self::not_found)
    }

    pub fn price(&self) -> Option<f64> {
        self.found.then_some(self.value)
    }
}

/// Normalized prices for one provider and region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalog {
    pub compute: PriceMap,
    pub storage: PriceMap,
    pub transfer: PriceMap,
}

impl PriceCatalog {
    pub fn get(&self, category: Category) -> &PriceMap {
        match category {
            Category::Compute => &self.compute,
            Category::Storage => &self.storage,
            Category::Transfer => &self.transfer,
        }
    }

    pub fn set(&mut self, category: Category, prices: PriceMap) {
        match category {
            Category::Compute => self.compute = prices,
            Category::Storage => self.storage = prices,
            Category::Transfer => self.transfer = prices,
        }
    }
}

/// Response body for a single-provider catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedResponse {
    pub provider: Provider,
    pub region: String,
    #[serde(flatten)]
    pub catalog: PriceCatalog,
}

/// Side-by-side catalogs for cross-provider comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedComparison {
    pub aws: UnifiedResponse,
    pub azure: UnifiedResponse,
}
