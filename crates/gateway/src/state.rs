// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Server state management module
//!
//! This module provides shared application state for the gateway server,
//! including configuration, the selected data source, and coordinated
//! cancellation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use slp_backends::DataSource;
use slp_data::SlpData;
use tokio_util::sync::CancellationToken;

use crate::config::{Environment, ServerConfig};

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// The data source selected at startup
    data_source: Arc<DataSource>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state
    pub fn new(
        config: ServerConfig,
        data_source: Arc<DataSource>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            data_source,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The configured data source
    pub fn data_source(&self) -> &Arc<DataSource> {
        &self.data_source
    }

    /// Current health report of the gateway
    pub fn health_check(&self) -> HealthCheck {
        HealthCheck {
            status: HealthStatus::Up,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            backend: self.data_source.backend_name(),
        }
    }
}

/// Health status of the gateway
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is operational and responding normally
    Up,
}

/// Health check status
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Name of the backend serving the data interface
    pub backend: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testing_state() -> ServerState {
        let config = ServerConfig::for_testing("https://slpdb.example.com");
        let source = config.backend.build_source().expect("builds");
        ServerState::new(config, Arc::new(source), CancellationToken::new())
    }

    #[test]
    fn server_state_creation() {
        let state = testing_state();
        assert!(!state.cancellation_token.is_cancelled());
        assert_eq!(state.data_source().backend_name(), "slpdb");
    }

    #[test]
    fn health_check_reports_backend() {
        let state = testing_state();
        let health = state.health_check();
        assert_eq!(health.status, HealthStatus::Up);
        assert_eq!(health.backend, "slpdb");
        assert_eq!(health.environment, Environment::Testing);
    }
}
