// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Error handling module
//!
//! This module provides error types for server operations, including the
//! mapping of data-source errors onto HTTP status codes and error propagation.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use slp_data::DataError;
use thiserror::Error;

/// Comprehensive error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Task join errors for async operations
    #[error("Task join error: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[source]
        source: tokio::task::JoinError,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Errors surfaced by the configured data source
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// The HTTP status code this error maps to
    ///
    /// Data-source errors keep their distinctions on the wire: missing data,
    /// capability gaps, timeouts, and transport failures each get their own
    /// status so clients can tell them apart.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::TaskJoin { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError(..) => StatusCode::BAD_REQUEST,
            Self::Data(data) => match data {
                DataError::NotFound { .. } => StatusCode::NOT_FOUND,
                DataError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
                DataError::Backend { .. } => StatusCode::SERVICE_UNAVAILABLE,
                DataError::InvalidResponse { .. } => StatusCode::BAD_GATEWAY,
                DataError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                DataError::Address(..) => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));
        (status, body).into_response()
    }
}

/// Convenient From implementations for common async error types
impl From<tokio::task::JoinError> for ServerError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::TaskJoin { source }
    }
}
