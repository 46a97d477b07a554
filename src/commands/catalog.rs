use anyhow::{Context, Result};
use cloud_pricing::config;
use cloud_pricing::pricing::{
    Category, CatalogUnifier, PriceMap, Provider, RawPricingStore, SqliteStore, UnifiedResponse,
};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Execute the catalog command
///
/// Builds one provider catalog against the configured database, same
/// pipeline as the HTTP route, and prints it.
pub async fn execute(
    config_path: &Path,
    provider: &str,
    region: Option<String>,
    json: bool,
) -> Result<()> {
    let provider: Provider = provider.parse().map_err(anyhow::Error::msg)?;
    let cfg = config::load_config(config_path)?;
    let region = region.unwrap_or_else(|| cfg.pricing.default_region.clone());

    let sqlite = SqliteStore::connect(&cfg.database.url, cfg.database.max_connections)
        .await
        .context("Raw pricing store unavailable")?;
    let store: Arc<dyn RawPricingStore> = Arc::new(sqlite.clone());

    info!(provider = %provider, region = %region, "Building catalog from CLI");
    let response = CatalogUnifier::new(store, &cfg)
        .build_catalog(provider, &region)
        .await;
    sqlite.pool().close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render(&response));
    }

    Ok(())
}

fn render(response: &UnifiedResponse) -> String {
    let mut out = format!(
        "{} {} ({})\n",
        "Catalog:".green().bold(),
        response.provider.as_str().to_uppercase(),
        response.region
    );
    for category in Category::ALL {
        out.push_str(&format!("\n{}\n", category.as_str().cyan()));
        out.push_str(&render_prices(response.catalog.get(category)));
    }
    out
}

fn render_prices(prices: &PriceMap) -> String {
    let width = prices.keys().map(String::len).max().unwrap_or(0);
    prices
        .iter()
        .map(|(key, price)| format!("  {:<width$}  ${:.6}\n", key, price, width = width))
        .collect()
}
