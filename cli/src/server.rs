// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server bootstrap

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use todoapi_core::{
    application::{create_user_repository, StandardUserService},
    domain::{access::SelfOrSuperuser, repository::UserRepository, service_config::ServiceConfigManifest},
    presentation::{app, AppState},
};

use crate::cli::ServeArgs;

pub async fn start_server(mut config: ServiceConfigManifest, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.spec.server.host = host;
    }
    if let Some(port) = args.port {
        config.spec.server.port = port;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Configuration loaded: name={} backend={:?}",
        config.metadata.name, config.spec.database.backend
    );

    let users = create_user_repository(&config.storage_backend())
        .await
        .context("Failed to initialize user store")?;

    if let (Some(username), Some(password)) = (&args.superuser, &args.superuser_password) {
        bootstrap_superuser(users.clone(), username, password).await?;
    }

    let router = app(AppState::new(users));

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("todoapi listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("todoapi shutting down");

    Ok(())
}

/// Ensure a superuser exists; an existing account is left untouched.
async fn bootstrap_superuser(
    users: Arc<dyn UserRepository>,
    username: &str,
    password: &str,
) -> Result<()> {
    if users
        .find_by_username(username)
        .await
        .context("Failed to look up bootstrap superuser")?
        .is_some()
    {
        info!("Bootstrap superuser '{}' already exists", username);
        return Ok(());
    }

    let service = StandardUserService::new(users, Arc::new(SelfOrSuperuser::new()));
    service
        .create_superuser(username, "", password)
        .await
        .with_context(|| format!("Failed to create bootstrap superuser '{}'", username))?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoapi_core::infrastructure::InMemoryUserRepository;

    #[tokio::test]
    async fn test_bootstrap_superuser_is_idempotent() {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());

        bootstrap_superuser(users.clone(), "clark", "supersecret").await.unwrap();
        bootstrap_superuser(users.clone(), "clark", "other").await.unwrap();

        assert_eq!(users.count().await.unwrap(), 1);
        let clark = users.find_by_username("clark").await.unwrap().unwrap();
        assert!(clark.is_superuser);
        assert!(clark.is_staff);
    }
}
