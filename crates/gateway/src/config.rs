// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Server configuration module
//!
//! This module provides configuration structures and logic for the SLP gateway
//! server, supporting different environments, hierarchical loading, and
//! validation of configuration parameters including the backend selection.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::{Result, anyhow, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File};
use serde::{Deserialize, Deserializer, Serialize, de};
use slp_backends::{DataSource, RestIndexerConfig, SlpdbConfig};

use crate::error::{ServerError, ServerResult};

/// A validated server port that ensures the value is appropriate for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerPort {
    port: u16,
    environment: Environment,
}

impl ServerPort {
    /// Create a new `ServerPort`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0 in non-testing environments
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        if port == 0 && environment != Environment::Testing {
            return Err(anyhow!("port cannot be 0 in non-testing environments"));
        }
        Ok(Self { port, environment })
    }

    /// Create a safe default port for development
    pub const fn default_development() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
        }
    }

    /// Create a safe testing port (port 0)
    pub const fn testing() -> Self {
        Self {
            port: 0,
            environment: Environment::Testing,
        }
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.port
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        // Validated during configuration loading once the environment is known
        Ok(Self {
            port,
            environment: Environment::Development,
        })
    }
}

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Create a safe default timeout (30 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(30))
    }

    /// Create a safe testing timeout (5 seconds)
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the timeout value as a duration
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

/// Which backend serves the data interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// SLPDB, the full-capability document-database indexer
    #[serde(rename = "slpdb")]
    Slpdb,
    /// The plain JSON REST indexer
    #[serde(rename = "rest-indexer")]
    RestIndexer,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Slpdb => write!(f, "slpdb"),
            BackendKind::RestIndexer => write!(f, "rest-indexer"),
        }
    }
}

/// Connection settings for the SLPDB backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlpdbSettings {
    /// SLPDB base URL
    pub url: String,
    /// Password of the fixed `BITBOX` basic-auth user
    pub password: String,
    /// Per-query timeout
    #[serde(default)]
    pub timeout_seconds: TimeoutSeconds,
}

/// Connection settings for the REST indexer backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerSettings {
    /// Indexer base URL
    pub url: String,
    /// Per-call timeout
    #[serde(default)]
    pub timeout_seconds: TimeoutSeconds,
}

/// Backend selection and connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Which backend kind to serve from
    pub kind: BackendKind,
    /// SLPDB settings, consulted when `kind` is `slpdb`
    pub slpdb: SlpdbSettings,
    /// Indexer settings, consulted when `kind` is `rest-indexer`
    pub indexer: IndexerSettings,
}

impl BackendConfig {
    /// Build the data source selected by this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the selected backend's settings are
    /// invalid or its HTTP client cannot be created.
    pub fn build_source(&self) -> ServerResult<DataSource> {
        let source = match self.kind {
            BackendKind::Slpdb => {
                let config = SlpdbConfig::new(
                    self.slpdb.url.clone(),
                    self.slpdb.password.clone(),
                    self.slpdb.timeout_seconds.value().as_secs(),
                )
                .map_err(|e| ServerError::Config {
                    message: format!("invalid SLPDB settings: {e}"),
                })?;
                DataSource::slpdb(config)
            }
            BackendKind::RestIndexer => {
                let config = RestIndexerConfig::new(
                    self.indexer.url.clone(),
                    self.indexer.timeout_seconds.value().as_secs(),
                )
                .map_err(|e| ServerError::Config {
                    message: format!("invalid indexer settings: {e}"),
                })?;
                DataSource::rest_indexer(config)
            }
        };

        source.map_err(|e| ServerError::Config {
            message: format!("failed to create {} backend: {e}", self.kind),
        })
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Slpdb,
            slpdb: SlpdbSettings {
                url: "https://slpdb.fountainhead.cash/".to_string(),
                password: String::new(),
                timeout_seconds: TimeoutSeconds::default(),
            },
            indexer: IndexerSettings {
                url: "http://localhost:5001/".to_string(),
                timeout_seconds: TimeoutSeconds::default(),
            },
        }
    }
}

/// Server configuration for different environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: IpAddr,
    /// Server port (validated for environment compatibility)
    pub port: ServerPort,
    /// Request timeout in seconds (validated range: 1-300)
    pub timeout_seconds: TimeoutSeconds,
    /// Environment type
    pub environment: Environment,
    /// Backend selection and connection settings
    pub backend: BackendConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::default_development(),
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::Development,
            backend: BackendConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (config.json)
    /// 3. Environment-specific files (config.{env}.json)
    /// 4. Environment variables with `GATEWAY_` prefix
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let env_var = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut config_builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("timeout_seconds", 30)?
            .set_default("environment", "development")?
            .set_default("backend.kind", "slpdb")?
            .set_default("backend.slpdb.url", "https://slpdb.fountainhead.cash/")?
            .set_default("backend.slpdb.password", "")?
            .set_default("backend.slpdb.timeout_seconds", 30)?
            .set_default("backend.indexer.url", "http://localhost:5001/")?
            .set_default("backend.indexer.timeout_seconds", 30)?
            .add_source(File::with_name("config.json").required(false))
            .add_source(
                File::with_name(&format!("config.{}.json", env_var.to_lowercase())).required(false),
            )
            .add_source(
                ConfigEnv::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            );

        if std::env::var("ENVIRONMENT").is_ok() {
            config_builder = config_builder.set_override("environment", env_var.to_lowercase())?;
        }

        let config = config_builder.build()?;
        let mut server_config: Self = config.try_deserialize()?;

        // Fix the ServerPort to have the correct environment context
        server_config.port = ServerPort::new(server_config.port.value(), server_config.environment)
            .map_err(|e| ConfigError::Message(format!("invalid port configuration: {e}")))?;

        Ok(server_config)
    }

    /// Create configuration optimized for testing, pointed at the given
    /// SLPDB base URL (typically a local mock).
    pub fn for_testing(slpdb_url: impl Into<String>) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(), // let OS choose available port
            timeout_seconds: TimeoutSeconds::testing(),
            environment: Environment::Testing,
            backend: BackendConfig {
                kind: BackendKind::Slpdb,
                slpdb: SlpdbSettings {
                    url: slpdb_url.into(),
                    password: "testing".to_string(),
                    timeout_seconds: TimeoutSeconds::testing(),
                },
                indexer: IndexerSettings {
                    url: "http://localhost:5001/".to_string(),
                    timeout_seconds: TimeoutSeconds::testing(),
                },
            },
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }
}
