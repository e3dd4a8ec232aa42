// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # todoapi CLI
//!
//! The `todoapi` binary hosts the user service HTTP API.
//!
//! ## Commands
//!
//! - `todoapi serve` - Run the HTTP server (default when no command is given)
//! - `todoapi migrate` - Apply database migrations
//! - `todoapi createsuperuser` - Create a superuser account
//! - `todoapi config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::Parser;

use todoapi::cli::{Cli, Commands};
use todoapi::commands;
use todoapi::logging::init_logging;
use todoapi::server;
use todoapi_core::domain::service_config::ServiceConfigManifest;

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = ServiceConfigManifest::load_or_default(cli.config.clone())
        .context("Failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.spec.logging.level.clone());
    init_logging(&level, config.spec.logging.format)?;

    match cli.command.unwrap_or_default() {
        Commands::Serve(args) => server::start_server(config, args).await,
        Commands::Migrate { dry_run } => commands::migrate::execute(&config, dry_run).await,
        Commands::CreateSuperuser(args) => commands::superuser::execute(&config, args).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}
