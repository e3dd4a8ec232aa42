// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command-line surface of the `todoapi` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::ConfigCommand;

/// todoapi - User management HTTP service
#[derive(Parser, Debug)]
#[command(name = "todoapi")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "TODOAPI_CONFIG_PATH",
        value_name = "FILE"
    )]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides spec.logging.level
    #[arg(long, global = true, env = "TODOAPI_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Apply database migrations
    #[command(name = "migrate")]
    Migrate {
        /// List pending migrations without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Create a superuser account
    #[command(name = "createsuperuser")]
    CreateSuperuser(SuperuserArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve(ServeArgs::default())
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// HTTP listen host (overrides spec.server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP listen port (overrides spec.server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Create this superuser at startup when it does not exist yet
    #[arg(long, value_name = "USERNAME", requires = "superuser_password")]
    pub superuser: Option<String>,

    /// Password for --superuser
    #[arg(long, env = "TODOAPI_SUPERUSER_PASSWORD", hide_env_values = true)]
    pub superuser_password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SuperuserArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, env = "TODOAPI_SUPERUSER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_means_serve() {
        let cli = Cli::try_parse_from(["todoapi"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.command.unwrap_or_default(), Commands::Serve(_)));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["todoapi", "serve", "--host", "0.0.0.0", "--port", "9000"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(9000));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_createsuperuser_arguments() {
        let cli = Cli::try_parse_from([
            "todoapi",
            "createsuperuser",
            "--username",
            "clark",
            "--email",
            "clark@kent.com",
            "--password",
            "supersecret",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateSuperuser(args)) => {
                assert_eq!(args.username, "clark");
                assert_eq!(args.email, "clark@kent.com");
                assert_eq!(args.password, "supersecret");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["todoapi", "migrate", "--dry-run", "--config", "svc.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("svc.yaml")));
        assert!(matches!(cli.command, Some(Commands::Migrate { dry_run: true })));
    }
}
