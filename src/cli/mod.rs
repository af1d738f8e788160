//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the pharmacy service using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Pharmacy - Prescription and Inventory Backend
#[derive(Parser, Debug)]
#[command(name = "pharmacy")]
#[command(version, about, long_about = None)]
#[command(author = "Pharmacy Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pharmacy.toml", env = "PHARMACY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PHARMACY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve(commands::serve::ServeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Apply the database schema to PostgreSQL
    Migrate(commands::migrate::MigrateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["pharmacy", "serve"]);
        assert_eq!(cli.config, "pharmacy.toml");
        assert!(matches!(cli.command, Commands::Serve(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["pharmacy", "--config", "custom.toml", "serve"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["pharmacy", "--log-level", "debug", "migrate"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Migrate(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["pharmacy", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init_force() {
        let cli = Cli::parse_from(["pharmacy", "init", "--force"]);
        match cli.command {
            Commands::Init(args) => assert!(args.force),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
