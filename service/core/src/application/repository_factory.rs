// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates the concrete `UserRepository` for the configured storage backend,
//! keeping the domain layer free of infrastructure dependencies.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Select and construct the user store at startup

use std::sync::Arc;

use anyhow::Result;

use crate::domain::repository::{StorageBackend, UserRepository};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::{InMemoryUserRepository, PostgresUserRepository};

/// Creates a UserRepository implementation based on the configured backend.
/// The PostgreSQL backend connects eagerly so a bad URL fails at startup.
pub async fn create_user_repository(backend: &StorageBackend) -> Result<Arc<dyn UserRepository>> {
    match backend {
        StorageBackend::InMemory => {
            tracing::info!("Using in-memory user store");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
        StorageBackend::PostgreSQL(config) => {
            let db = Database::new(config).await?;
            tracing::info!("Connected to PostgreSQL user store");
            Ok(Arc::new(PostgresUserRepository::new(db.get_pool().clone())))
        }
    }
}
