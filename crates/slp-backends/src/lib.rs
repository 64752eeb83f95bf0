// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Backend data-source implementations for the SLP gateway
//!
//! This crate provides the interchangeable implementations of the
//! `slp_data::SlpData` capability interface, along with the query
//! construction and response normalization they share.
//!
//! # Architecture
//!
//! - **Query Construction**: [`slpdb_query`] - pure builders of SLPDB v3
//!   query and aggregation documents
//! - **Transport + Services**: [`slpdb`], [`rest_indexer`] - one module per
//!   backend kind, each composing transport, queries, and normalization into
//!   the full interface
//! - **Normalization**: [`normalize`] - pure raw-record-to-canonical-record
//!   mapping shared by both backends
//! - **Selection**: [`source::DataSource`] - the two-variant sum type chosen
//!   once at startup from configuration
//!
//! # Capability gaps
//!
//! The REST indexer cannot serve history or burn/mint breakdown operations;
//! those fail with `DataError::NotImplemented` by design. Callers selecting a
//! backend at startup accept its capability set for the process lifetime.

pub mod normalize;
pub mod rest_indexer;
pub mod slpdb;
pub mod slpdb_query;
pub mod source;

pub use rest_indexer::{RestIndexerConfig, RestIndexerService};
pub use slpdb::{SlpdbConfig, SlpdbService};
pub use source::DataSource;
