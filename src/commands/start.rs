use anyhow::Result;
use cloud_pricing::{config, server};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration and runs the server until a shutdown signal arrives.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting pricing service...".green());

    let cfg = config::load_config(config_path)?;
    info!("Starting pricing service with {}", config_path.display());

    server::start_server(cfg, config_path.to_path_buf()).await?;

    Ok(())
}
