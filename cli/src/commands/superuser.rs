// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `todoapi createsuperuser`

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use todoapi_core::application::{create_user_repository, StandardUserService};
use todoapi_core::domain::access::SelfOrSuperuser;
use todoapi_core::domain::repository::StorageBackend;
use todoapi_core::domain::service_config::ServiceConfigManifest;

use crate::cli::SuperuserArgs;

pub async fn execute(config: &ServiceConfigManifest, args: SuperuserArgs) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let backend = config.storage_backend();
    if matches!(backend, StorageBackend::InMemory) {
        println!(
            "{}",
            "Warning: in-memory backend configured; the account will not outlive this process. Use `serve --superuser` instead."
                .yellow()
        );
    }

    let users = create_user_repository(&backend)
        .await
        .context("Failed to initialize user store")?;

    let service = StandardUserService::new(users, Arc::new(SelfOrSuperuser::new()));
    let user = service
        .create_superuser(&args.username, &args.email, &args.password)
        .await
        .with_context(|| format!("Failed to create superuser '{}'", args.username))?;

    println!(
        "{}",
        format!("✓ Superuser created: {} (id {})", user.username, user.id).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoapi_core::domain::service_config::DatabaseBackend;

    fn clark() -> SuperuserArgs {
        SuperuserArgs {
            username: "clark".to_string(),
            email: "clark@kent.com".to_string(),
            password: "supersecret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_postgres_backend_without_url_is_rejected() {
        let mut config = ServiceConfigManifest::default();
        config.spec.database.backend = DatabaseBackend::Postgres;
        config.spec.database.url = None;

        let err = execute(&config, clark()).await.unwrap_err();
        assert!(format!("{err:#}").contains("spec.database.url is required"));
    }

    #[tokio::test]
    async fn test_invalid_username_is_reported() {
        let mut args = clark();
        args.username = "clark kent".to_string();
        assert!(execute(&ServiceConfigManifest::default(), args).await.is_err());
    }
}
