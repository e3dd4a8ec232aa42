// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Health Domain Types
//!
//! Status values reported by the `/health` endpoint and the
//! [`ConnectivityProbe`] contract that each monitored dependency implements.
//! Aggregation lives in [`crate::application::health::HealthProbe`].

use async_trait::async_trait;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

/// Key under which the aggregate status is reported next to the components.
pub const OVERALL_KEY: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Up => "up",
            ComponentStatus::Down => "down",
        }
    }
}

/// Result of one health check. Computed per request, never stored.
///
/// Serializes as a flat object: one key per component in probe order,
/// followed by `"status"` for the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    components: Vec<(String, ComponentStatus)>,
}

impl HealthStatus {
    pub fn new(components: Vec<(String, ComponentStatus)>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[(String, ComponentStatus)] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<ComponentStatus> {
        self.components
            .iter()
            .find(|(component, _)| component == name)
            .map(|(_, status)| *status)
    }

    /// Down if and only if at least one component is down.
    pub fn overall(&self) -> ComponentStatus {
        if self
            .components
            .iter()
            .any(|(_, status)| *status == ComponentStatus::Down)
        {
            ComponentStatus::Down
        } else {
            ComponentStatus::Up
        }
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.components.len() + 1))?;
        for (name, status) in &self.components {
            map.serialize_entry(name, status)?;
        }
        map.serialize_entry(OVERALL_KEY, &self.overall())?;
        map.end()
    }
}

/// A monitored dependency could not be reached.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("dependency unavailable: {0}")]
    Unavailable(String),

    #[error("dependency probe panicked")]
    Panicked,
}

/// Checks whether one dependency is reachable. Completing with `Ok` means up.
///
/// Implementations own their timeout policy; the aggregator waits for the
/// probe to finish.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn check(&self) -> Result<(), DependencyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overall_is_up_when_every_component_is_up() {
        let status = HealthStatus::new(vec![
            ("db".to_string(), ComponentStatus::Up),
            ("cache".to_string(), ComponentStatus::Up),
        ]);
        assert_eq!(status.overall(), ComponentStatus::Up);
    }

    #[test]
    fn test_overall_is_down_when_any_component_is_down() {
        let status = HealthStatus::new(vec![
            ("db".to_string(), ComponentStatus::Up),
            ("cache".to_string(), ComponentStatus::Down),
        ]);
        assert_eq!(status.overall(), ComponentStatus::Down);
        assert_eq!(status.component("cache"), Some(ComponentStatus::Down));
    }

    #[test]
    fn test_serializes_components_then_overall() {
        let status = HealthStatus::new(vec![("db".to_string(), ComponentStatus::Down)]);
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"db": "down", "status": "down"})
        );
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"db":"down","status":"down"}"#
        );
    }

    #[test]
    fn test_no_components_is_up() {
        assert_eq!(HealthStatus::new(Vec::new()).overall(), ComponentStatus::Up);
    }
}
