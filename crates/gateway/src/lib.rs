// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! SLP Gateway Server Implementation
//!
//! This crate provides the HTTP server for the SLP gateway, built with Axum
//! and designed for production use with hierarchical configuration, middleware,
//! and graceful shutdown capabilities.
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and HTTP response handling with proper status codes
//! - [`state`]: Shared application state with the selected data source
//! - [`server`]: Main server implementation, lifecycle, and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers
//!
//! # Key Features
//!
//! - **Interchangeable Backends**: One data source (SLPDB or REST indexer) is
//!   selected at startup from configuration; handlers never know which
//! - **Graceful Shutdown**: Coordinated termination using `CancellationToken` with timeouts
//! - **Error Fidelity**: Missing data, capability gaps, timeouts, and transport
//!   failures each map to a distinct HTTP status
//! - **Comprehensive Middleware**: Request tracing, CORS, timeouts, and request ids

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{BackendConfig, BackendKind, Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use state::{HealthCheck, ServerState};
