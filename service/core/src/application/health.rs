// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Health Probe Application Service
//!
//! Runs every registered [`ConnectivityProbe`] in registration order and folds
//! the outcomes into a [`HealthStatus`]. A probe error or panic is logged and
//! recorded as `down`; [`HealthProbe::check`] itself cannot fail.
//!
//! The only component wired today is `db` ([`UserStoreProbe`]), which reads
//! the first row of the user store.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::domain::health::{
    ComponentStatus, ConnectivityProbe, DependencyError, HealthStatus, OVERALL_KEY,
};
use crate::domain::repository::UserRepository;

pub const DB_COMPONENT: &str = "db";

#[derive(Clone, Default)]
pub struct HealthProbe {
    probes: Vec<(String, Arc<dyn ConnectivityProbe>)>,
}

impl HealthProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named probe. Components are reported in registration order.
    ///
    /// # Panics
    ///
    /// Panics if `name` is [`OVERALL_KEY`] or is already registered, since
    /// either would put a duplicate key in the health body.
    pub fn with_probe(mut self, name: impl Into<String>, probe: Arc<dyn ConnectivityProbe>) -> Self {
        let name = name.into();
        assert_ne!(name, OVERALL_KEY, "`{OVERALL_KEY}` is reserved for the aggregate status");
        assert!(
            !self.probes.iter().any(|(registered, _)| *registered == name),
            "health component `{name}` registered twice"
        );
        self.probes.push((name, probe));
        self
    }

    pub async fn check(&self) -> HealthStatus {
        let mut components = Vec::with_capacity(self.probes.len());
        for (name, probe) in &self.probes {
            let status = probe_component(name, probe.as_ref()).await;
            components.push((name.clone(), status));
        }
        HealthStatus::new(components)
    }
}

/// Run one probe and classify the outcome. The error itself is only logged.
pub async fn probe_component(name: &str, probe: &dyn ConnectivityProbe) -> ComponentStatus {
    let outcome = AssertUnwindSafe(probe.check())
        .catch_unwind()
        .await
        .unwrap_or(Err(DependencyError::Panicked));

    match outcome {
        Ok(()) => {
            debug!(component = name, "health probe up");
            ComponentStatus::Up
        }
        Err(e) => {
            warn!(component = name, error = %e, "health probe down");
            ComponentStatus::Down
        }
    }
}

/// Store reachability: fetching the first user succeeds.
pub struct UserStoreProbe {
    users: Arc<dyn UserRepository>,
}

impl UserStoreProbe {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl ConnectivityProbe for UserStoreProbe {
    async fn check(&self) -> Result<(), DependencyError> {
        self.users
            .first()
            .await
            .map(|_| ())
            .map_err(|e| DependencyError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::RepositoryError;
    use crate::domain::user::{NewUser, User, UserId};
    use crate::infrastructure::repositories::InMemoryUserRepository;
    use serde_json::json;

    struct FixedProbe(bool);

    #[async_trait]
    impl ConnectivityProbe for FixedProbe {
        async fn check(&self) -> Result<(), DependencyError> {
            if self.0 {
                Ok(())
            } else {
                Err(DependencyError::Unavailable("connection refused".to_string()))
            }
        }
    }

    struct PanickingProbe;

    #[async_trait]
    impl ConnectivityProbe for PanickingProbe {
        async fn check(&self) -> Result<(), DependencyError> {
            panic!("driver bug")
        }
    }

    /// A store whose every call fails, standing in for an unreachable database.
    struct UnreachableStore;

    #[async_trait]
    impl UserRepository for UnreachableStore {
        async fn create(&self, _user: &NewUser) -> Result<User, RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
        async fn update(&self, _user: &User) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
        async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
        async fn find_by_username(&self, _username: &str) -> Result<Option<User>, RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
        async fn first(&self) -> Result<Option<User>, RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
        async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
        async fn count(&self) -> Result<u64, RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
        async fn delete(&self, _id: UserId) -> Result<(), RepositoryError> {
            Err(RepositoryError::Database("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn test_db_up() {
        let probe = HealthProbe::new().with_probe(
            DB_COMPONENT,
            Arc::new(UserStoreProbe::new(Arc::new(InMemoryUserRepository::new()))),
        );
        let status = probe.check().await;
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"db": "up", "status": "up"})
        );
    }

    #[tokio::test]
    async fn test_db_down_when_store_errors() {
        let probe = HealthProbe::new()
            .with_probe(DB_COMPONENT, Arc::new(UserStoreProbe::new(Arc::new(UnreachableStore))));
        let status = probe.check().await;
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"db": "down", "status": "down"})
        );
    }

    #[tokio::test]
    async fn test_panicking_probe_is_down_not_propagated() {
        let probe = HealthProbe::new().with_probe("db", Arc::new(PanickingProbe));
        let status = probe.check().await;
        assert_eq!(status.component("db"), Some(ComponentStatus::Down));
        assert_eq!(status.overall(), ComponentStatus::Down);
    }

    #[tokio::test]
    async fn test_components_keep_registration_order() {
        let probe = HealthProbe::new()
            .with_probe("db", Arc::new(FixedProbe(true)))
            .with_probe("cache", Arc::new(FixedProbe(false)));
        let status = probe.check().await;

        let names: Vec<&str> = status.components().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["db", "cache"]);
        assert_eq!(status.component("db"), Some(ComponentStatus::Up));
        assert_eq!(status.overall(), ComponentStatus::Down);
    }

    #[test]
    #[should_panic(expected = "reserved for the aggregate status")]
    fn test_component_cannot_shadow_overall_status() {
        let _ = HealthProbe::new().with_probe(OVERALL_KEY, Arc::new(FixedProbe(true)));
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_component_names_are_unique() {
        let _ = HealthProbe::new()
            .with_probe("db", Arc::new(FixedProbe(true)))
            .with_probe("db", Arc::new(FixedProbe(false)));
    }

    #[tokio::test]
    async fn test_every_probe_runs_on_every_check() {
        let probe = HealthProbe::new().with_probe("db", Arc::new(FixedProbe(false)));
        assert_eq!(probe.check().await.overall(), ComponentStatus::Down);
        assert_eq!(probe.check().await.overall(), ComponentStatus::Down);
    }
}
