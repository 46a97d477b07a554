use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cloud-pricing", version, about = "Unified AWS/Azure price catalog service")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the pricing server (default)
    Start,

    /// Test configuration file validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Build one provider catalog from the configured database and print it
    Catalog {
        /// Provider: aws or azure
        #[arg(short, long)]
        provider: String,

        /// Canonical region code (defaults to pricing.default_region)
        #[arg(short, long)]
        region: Option<String>,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_start() {
        let cli = Cli {
            config: PathBuf::from("config.toml"),
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Start));
    }

    #[test]
    fn test_cli_parsing_global_config() {
        let args = vec!["cloud-pricing", "test", "-c", "/etc/pricing.toml"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/pricing.toml"));
        assert!(matches!(cli.get_command(), Commands::Test));
    }

    #[test]
    fn test_cli_parsing_catalog() {
        let args = vec!["cloud-pricing", "catalog", "--provider", "azure", "--region", "eu-west-1"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Catalog { provider, region, json } => {
                assert_eq!(provider, "azure");
                assert_eq!(region.as_deref(), Some("eu-west-1"));
                assert!(!json);
            }
            _ => panic!("Expected Catalog command"),
        }
    }

    #[test]
    fn test_cli_parsing_catalog_requires_provider() {
        let args = vec!["cloud-pricing", "catalog"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_config_show() {
        let args = vec!["cloud-pricing", "config", "show"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }
}
