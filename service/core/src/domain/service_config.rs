// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Service Configuration Types
//
// Defines the configuration schema for a todoapi service instance:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP listener settings
// - Storage backend selection (in-memory or PostgreSQL)
// - Logging settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::repository::{PostgresConfig, StorageBackend};

pub const API_VERSION: &str = "todoapi/v1";
pub const KIND: &str = "ServiceConfig";

/// Top-level Kubernetes-style service configuration manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfigManifest {
    /// API version (must be "todoapi/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "ServiceConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: ServiceConfigSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable instance name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,

    /// PostgreSQL connection string (required for the postgres backend)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Memory,
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or an EnvFilter string)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_connections() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "todoapi".to_string(),
                version: Some("1.0.0".to_string()),
            },
            spec: ServiceConfigSpec::default(),
        }
    }
}

impl ServiceConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. TODOAPI_CONFIG_PATH environment variable
    /// 2. ./todoapi-config.yaml (working directory)
    /// 3. ~/.todoapi/config.yaml (user home)
    /// 4. /etc/todoapi/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("TODOAPI_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./todoapi-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".todoapi").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/todoapi/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    /// This allows container deployments to override config via env vars
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("TODOAPI_HOST") {
            tracing::info!("Environment override: TODOAPI_HOST={}", host);
            self.spec.server.host = host;
        }

        if let Some(val) = lookup("TODOAPI_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: TODOAPI_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for TODOAPI_PORT: '{}'. Expected a port number. Ignoring.",
                        val
                    );
                }
            }
        }

        // A database URL in the environment implies the postgres backend
        if let Some(url) = lookup("DATABASE_URL") {
            tracing::info!("Environment override: DATABASE_URL set, using postgres backend");
            self.spec.database.backend = DatabaseBackend::Postgres;
            self.spec.database.url = Some(url);
        }

        if let Some(level) = lookup("TODOAPI_LOG_LEVEL") {
            self.spec.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.server.port == 0 {
            anyhow::bail!("spec.server.port cannot be 0");
        }

        if self.spec.database.max_connections == 0 {
            anyhow::bail!("spec.database.max_connections must be at least 1");
        }

        if self.spec.database.backend == DatabaseBackend::Postgres
            && self.spec.database.url.as_deref().map_or(true, str::is_empty)
        {
            anyhow::bail!("spec.database.url is required for the postgres backend");
        }

        Ok(())
    }

    /// Storage backend selected by this configuration
    pub fn storage_backend(&self) -> StorageBackend {
        match (self.spec.database.backend, &self.spec.database.url) {
            (DatabaseBackend::Postgres, Some(url)) => StorageBackend::PostgreSQL(PostgresConfig {
                connection_string: url.clone(),
                max_connections: self.spec.database.max_connections,
            }),
            _ => StorageBackend::InMemory,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.spec.server.host, self.spec.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_manifest_is_valid() {
        let manifest = ServiceConfigManifest::default();
        assert_eq!(manifest.api_version, API_VERSION);
        assert_eq!(manifest.kind, KIND);
        assert!(manifest.validate().is_ok());
        assert_eq!(manifest.storage_backend(), StorageBackend::InMemory);
        assert_eq!(manifest.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn test_parse_postgres_config() {
        let yaml = r#"
apiVersion: todoapi/v1
kind: ServiceConfig
metadata:
  name: prod
spec:
  server:
    host: 0.0.0.0
    port: 8080
  database:
    backend: postgres
    url: postgres://postgres@db:5432/postgres
    max_connections: 10
  logging:
    level: debug
    format: json
"#;
        let manifest = ServiceConfigManifest::from_yaml_str(yaml).unwrap();
        assert!(manifest.validate().is_ok());
        assert_eq!(manifest.spec.server.port, 8080);
        assert_eq!(manifest.spec.logging.format, LogFormat::Json);
        assert_eq!(
            manifest.storage_backend(),
            StorageBackend::PostgreSQL(PostgresConfig {
                connection_string: "postgres://postgres@db:5432/postgres".to_string(),
                max_connections: 10,
            })
        );
    }

    #[test]
    fn test_missing_spec_sections_use_defaults() {
        let yaml = r#"
apiVersion: todoapi/v1
kind: ServiceConfig
metadata:
  name: minimal
"#;
        let manifest = ServiceConfigManifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.spec, ServiceConfigSpec::default());
    }

    #[test]
    fn test_validate_rejects_postgres_without_url() {
        let mut manifest = ServiceConfigManifest::default();
        manifest.spec.database.backend = DatabaseBackend::Postgres;
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_kind() {
        let mut manifest = ServiceConfigManifest::default();
        manifest.kind = "NodeConfig".to_string();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TODOAPI_PORT", "9000"),
            ("DATABASE_URL", "postgres://localhost/users"),
            ("TODOAPI_LOG_LEVEL", "warn"),
        ]);
        let mut manifest = ServiceConfigManifest::default();
        manifest.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(manifest.spec.server.port, 9000);
        assert_eq!(manifest.spec.database.backend, DatabaseBackend::Postgres);
        assert_eq!(manifest.spec.logging.level, "warn");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut manifest = ServiceConfigManifest::default();
        manifest.apply_overrides_from(|key| (key == "TODOAPI_PORT").then(|| "http".to_string()));
        assert_eq!(manifest.spec.server.port, 8000);
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut manifest = ServiceConfigManifest::default();
        manifest.spec.server.port = 8123;
        manifest.to_yaml_file(&path).unwrap();

        let loaded = ServiceConfigManifest::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.spec.server.port, 8123);
    }
}
