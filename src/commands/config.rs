use anyhow::Result;
use cloud_pricing::config::{self, Config};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration, file and environment merged
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&cfg)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Default Region: {}", cfg.pricing.default_region);
    println!("  Candidate SKUs: {}", count_candidates(&cfg));
    println!("  Default Prices: {}", count_default_prices(&cfg));

    info!("Configuration validation successful");
    Ok(())
}

/// Compute and storage candidates across both providers
fn count_candidates(cfg: &Config) -> usize {
    cfg.aws.compute_candidates.len()
        + cfg.aws.storage_candidates.len()
        + cfg.azure.compute_candidates.len()
        + cfg.azure.storage_candidates.len()
}

fn count_default_prices(cfg: &Config) -> usize {
    [&cfg.aws.defaults, &cfg.azure.defaults]
        .iter()
        .map(|tables| tables.compute.len() + tables.storage.len() + tables.transfer.len())
        .sum()
}
