use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cloud_pricing::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Log settings come from the config file when it loads; otherwise defaults
    let server = config::load_config(&args.config)
        .map(|cfg| cfg.server)
        .unwrap_or_default();
    init_tracing(&server.log_level, &server.log_format);

    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Catalog {
            provider,
            region,
            json,
        } => {
            commands::catalog::execute(&args.config, &provider, region, json).await?;
        }
        cli::Commands::Version => {
            println!("Cloud Pricing v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
