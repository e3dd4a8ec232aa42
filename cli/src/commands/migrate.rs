// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Database Migrate Command
//!
//! Implements `todoapi migrate`, which brings the PostgreSQL schema in line
//! with the migrations embedded in `todoapi-core`.
//!
//! # Usage
//!
//! ```bash
//! # Apply all pending migrations
//! todoapi migrate
//!
//! # Preview migrations without applying
//! todoapi migrate --dry-run
//! ```
//!
//! The database URL comes from `spec.database.url` or `DATABASE_URL`.

use anyhow::{Context, Result};
use colored::Colorize;

use todoapi_core::domain::repository::StorageBackend;
use todoapi_core::domain::service_config::ServiceConfigManifest;
use todoapi_core::infrastructure::Database;

pub async fn execute(config: &ServiceConfigManifest, dry_run: bool) -> Result<()> {
    println!("{}", "todoapi migrate".bold().green());

    config
        .validate()
        .context("Configuration validation failed")?;

    let postgres = match config.storage_backend() {
        StorageBackend::PostgreSQL(postgres) => postgres,
        StorageBackend::InMemory => {
            println!(
                "{}",
                "In-memory backend configured; there is nothing to migrate.".yellow()
            );
            return Ok(());
        }
    };

    println!("Connecting to database...");
    let db = Database::new(&postgres)
        .await
        .context("Failed to connect to database")?;

    let applied = db.applied_migrations().await;
    let migrator = Database::migrator();
    let available = migrator.iter().count();

    println!("Migration status: {} applied, {} total available.", applied, available);

    if applied >= available {
        println!("{}", "✓ Database is up to date.".green());
        return Ok(());
    }

    if dry_run {
        println!("Pending migrations found (Dry Run):");
        for migration in migrator.iter().skip(applied) {
            println!(" - {} {}", migration.version, migration.description);
        }
        println!("Skipping application due to --dry-run");
        return Ok(());
    }

    println!("Applying pending migrations...");
    db.migrate().await?;
    println!("{}", "✓ Database updated successfully.".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoapi_core::domain::service_config::DatabaseBackend;

    #[tokio::test]
    async fn test_postgres_backend_without_url_is_rejected() {
        let mut config = ServiceConfigManifest::default();
        config.spec.database.backend = DatabaseBackend::Postgres;
        config.spec.database.url = None;

        let err = execute(&config, true).await.unwrap_err();
        assert!(format!("{err:#}").contains("spec.database.url is required"));
    }

    #[tokio::test]
    async fn test_memory_backend_has_nothing_to_migrate() {
        execute(&ServiceConfigManifest::default(), false).await.unwrap();
    }
}
