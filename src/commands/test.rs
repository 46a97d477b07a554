use anyhow::Result;
use cloud_pricing::config::{self, DefaultTables};
use cloud_pricing::pricing::Category;
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the test command
///
/// This validates the configuration file without starting the server
pub fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration test successful".green());
    println!();

    println!("{}", "Configuration Summary:".bold());
    println!("  {}: {}:{}", "Server".cyan(), cfg.server.host, cfg.server.port);
    println!("  {}: {}", "Log Level".cyan(), cfg.server.log_level);
    println!("  {}: {}", "Log Format".cyan(), cfg.server.log_format);
    println!(
        "  {}: {}s",
        "Request Timeout".cyan(),
        cfg.server.request_timeout_seconds
    );
    println!("  {}: {}", "Database".cyan(), cfg.database.url);
    println!("  {}: {}", "Default Region".cyan(), cfg.pricing.default_region);
    println!();

    println!("{}", "AWS:".cyan());
    println!("    Compute candidates: {}", cfg.aws.compute_candidates.join(", "));
    println!("    Storage candidates: {}", cfg.aws.storage_candidates.join(", "));
    println!("    Defaults: {}", describe_tables(&cfg.aws.defaults));
    println!();

    println!("{}", "Azure:".cyan());
    println!("    Compute candidates: {}", cfg.azure.compute_candidates.join(", "));
    println!("    Storage candidates: {}", cfg.azure.storage_candidates.join(", "));
    println!("    Egress meter: {}", cfg.azure.transfer_meter);
    println!("    Defaults: {}", describe_tables(&cfg.azure.defaults));
    println!();

    println!(
        "  {}: {}",
        "Metrics".cyan(),
        if cfg.metrics.enabled {
            format!("enabled at {}", cfg.metrics.endpoint).green()
        } else {
            "disabled".red()
        }
    );

    info!("Configuration test completed successfully");
    Ok(())
}

/// "compute 7, storage 3, transfer 1"
fn describe_tables(tables: &DefaultTables) -> String {
    Category::ALL
        .iter()
        .map(|category| format!("{} {}", category, tables.get(*category).len()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_pricing::config::AwsConfig;

    #[test]
    fn test_describe_tables() {
        let tables = AwsConfig::default().defaults;
        assert_eq!(describe_tables(&tables), "compute 7, storage 3, transfer 1");
    }
}
