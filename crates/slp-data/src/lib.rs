// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Capability interface and canonical record types for SLP data sources
//!
//! This crate defines the single interface consumed by the gateway handlers,
//! independent of which concrete backend serves it.
//!
//! # Core Abstractions
//!
//! - **`SlpData` Trait**: Common interface for all SLP data sources with async support
//! - **Canonical Records**: Stable public schema ([`Token`], [`Balance`], [`BurnTotal`], ...)
//! - **Error Taxonomy**: [`DataError`] distinguishes missing data, unsupported
//!   operations, and transport failures
//! - **Address Forms**: [`address`] derives the slp/cash/legacy representations
//!   of one underlying address
//!
//! Backends differ in capability: operations a configured backend cannot serve
//! fail with [`DataError::NotImplemented`], which callers must treat as distinct
//! from [`DataError::NotFound`].

use serde_json::Value;
use thiserror::Error;

pub mod address;
pub mod types;

pub use address::AddressForms;
pub use types::*;

/// Generic trait for SLP data sources
///
/// One implementation exists per backend kind. All methods are fallible; which
/// errors an operation can produce depends on the backend serving it.
pub trait SlpData: Send + Sync {
    /// List every known token, newest first, without derived supply totals.
    fn list_all_tokens(&self) -> impl Future<Output = Result<Vec<Token>, DataError>> + Send;

    /// Look up one token by id, including derived supply totals.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] if the backend has no record of the token.
    fn list_single_token(
        &self,
        token_id: &str,
    ) -> impl Future<Output = Result<Token, DataError>> + Send;

    /// Look up several tokens at once.
    ///
    /// The result accounts for every requested id: ids the backend does not
    /// know come back as [`BulkTokenEntry::NotFound`] placeholders. Derived
    /// supply totals are not computed in bulk mode.
    fn list_bulk_token(
        &self,
        token_ids: &[String],
    ) -> impl Future<Output = Result<Vec<BulkTokenEntry>, DataError>> + Send;

    /// All token balances held by one address.
    fn balances_for_address(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Vec<AddressBalance>, DataError>> + Send;

    /// The balance of one token across all holding addresses.
    fn balances_for_token(
        &self,
        token_id: &str,
    ) -> impl Future<Output = Result<Vec<TokenHolderBalance>, DataError>> + Send;

    /// The balance of one token at one address.
    ///
    /// Absence of backend records is not an error: it yields the zero-balance
    /// placeholder for the requested pair.
    fn balance_for_address_by_token_id(
        &self,
        address: &str,
        token_id: &str,
    ) -> impl Future<Output = Result<Balance, DataError>> + Send;

    /// SLP validity of a single transaction.
    fn validate_txid(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<ValidationResult, DataError>> + Send;

    /// SLP validity of a batch of transactions.
    ///
    /// The result has exactly one entry per requested txid, in request order,
    /// including duplicates and ids unknown to the backend.
    fn validate_txid_array(
        &self,
        txids: &[String],
    ) -> impl Future<Output = Result<Vec<ValidationResult>, DataError>> + Send;

    /// Token quantity burned by one transaction.
    fn transaction_burn_total(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<BurnTotal, DataError>> + Send;

    /// Recent transactions of one token touching one address, newest first.
    fn transactions_by_token_id_address(
        &self,
        token_id: &str,
        address: &str,
    ) -> impl Future<Output = Result<Vec<Value>, DataError>> + Send;

    /// Confirmed and unconfirmed SLP transaction history for a set of
    /// addresses, above a block-height floor, newest first.
    fn historical_transactions(
        &self,
        addresses: &[String],
        from_block: u64,
    ) -> impl Future<Output = Result<Vec<Value>, DataError>> + Send;

    /// Full statistics for one token: detail record plus minted, burned, and
    /// circulating supply totals.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] if the token detail lookup yields no
    /// rows, regardless of what the supply aggregations report.
    fn token_stats(&self, token_id: &str)
    -> impl Future<Output = Result<Token, DataError>> + Send;

    /// Total quantity minted after genesis. Zero when no mint records exist.
    fn total_minted(&self, token_id: &str)
    -> impl Future<Output = Result<f64, DataError>> + Send;

    /// Total quantity burned. Zero when no burn records exist.
    fn total_burned(&self, token_id: &str)
    -> impl Future<Output = Result<f64, DataError>> + Send;

    /// The name/identifier of the backend serving this source.
    fn backend_name(&self) -> &'static str;
}

/// Errors surfaced by SLP data sources
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DataError {
    /// Requested token has no backend record
    #[error("token {token_id} could not be found")]
    NotFound { token_id: String },

    /// Operation unsupported by the configured backend
    #[error("{operation} is not supported by the {backend} backend")]
    NotImplemented {
        backend: &'static str,
        operation: &'static str,
    },

    /// Transport failure against the backend
    #[error("backend request failed: {message}")]
    Backend { message: String },

    /// Backend returned a payload this gateway cannot interpret
    #[error("invalid backend response: {message}")]
    InvalidResponse { message: String },

    /// Backend call exceeded its deadline
    #[error("backend request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Supplied address could not be decoded
    #[error("invalid address: {0}")]
    Address(#[from] address::AddressError),
}

impl DataError {
    /// Missing-token error for the given id.
    pub fn not_found(token_id: impl Into<String>) -> Self {
        Self::NotFound {
            token_id: token_id.into(),
        }
    }

    /// Capability-gap error for an operation the backend does not serve.
    pub fn not_implemented(backend: &'static str, operation: &'static str) -> Self {
        Self::NotImplemented { backend, operation }
    }

    /// Transport error wrapping the underlying cause.
    pub fn backend(cause: impl std::fmt::Display) -> Self {
        Self::Backend {
            message: cause.to_string(),
        }
    }

    /// Decode/shape error wrapping the underlying cause.
    pub fn invalid_response(cause: impl std::fmt::Display) -> Self {
        Self::InvalidResponse {
            message: cause.to_string(),
        }
    }
}
