// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Backend selection
//!
//! Exactly one backend serves a gateway process. [`DataSource`] is the sum of
//! the two concrete services, constructed once at startup from configuration
//! and held as an immutable reference for the process lifetime; every
//! interface call dispatches on the selected variant.

use serde_json::Value;
use slp_data::{
    AddressBalance, Balance, BulkTokenEntry, BurnTotal, DataError, SlpData, Token,
    TokenHolderBalance, ValidationResult,
};
use tracing::info;

use crate::{
    rest_indexer::{RestIndexerConfig, RestIndexerService},
    slpdb::{SlpdbConfig, SlpdbService},
};

/// The configured backend data source
#[derive(Debug)]
pub enum DataSource {
    /// SLPDB, the full-capability MongoDB-backed indexer
    Slpdb(SlpdbService),
    /// The plain JSON REST indexer, with designed capability gaps
    RestIndexer(RestIndexerService),
}

impl DataSource {
    /// Build an SLPDB-backed source.
    pub fn slpdb(config: SlpdbConfig) -> Result<Self, DataError> {
        info!(base_url = %config.base_url, "selecting SLPDB backend");
        Ok(Self::Slpdb(SlpdbService::new(config)?))
    }

    /// Build a REST-indexer-backed source.
    pub fn rest_indexer(config: RestIndexerConfig) -> Result<Self, DataError> {
        info!(base_url = %config.base_url, "selecting REST indexer backend");
        Ok(Self::RestIndexer(RestIndexerService::new(config)?))
    }
}

impl SlpData for DataSource {
    async fn list_all_tokens(&self) -> Result<Vec<Token>, DataError> {
        match self {
            Self::Slpdb(service) => service.list_all_tokens().await,
            Self::RestIndexer(service) => service.list_all_tokens().await,
        }
    }

    async fn list_single_token(&self, token_id: &str) -> Result<Token, DataError> {
        match self {
            Self::Slpdb(service) => service.list_single_token(token_id).await,
            Self::RestIndexer(service) => service.list_single_token(token_id).await,
        }
    }

    async fn list_bulk_token(&self, token_ids: &[String]) -> Result<Vec<BulkTokenEntry>, DataError> {
        match self {
            Self::Slpdb(service) => service.list_bulk_token(token_ids).await,
            Self::RestIndexer(service) => service.list_bulk_token(token_ids).await,
        }
    }

    async fn balances_for_address(&self, address: &str) -> Result<Vec<AddressBalance>, DataError> {
        match self {
            Self::Slpdb(service) => service.balances_for_address(address).await,
            Self::RestIndexer(service) => service.balances_for_address(address).await,
        }
    }

    async fn balances_for_token(
        &self,
        token_id: &str,
    ) -> Result<Vec<TokenHolderBalance>, DataError> {
        match self {
            Self::Slpdb(service) => service.balances_for_token(token_id).await,
            Self::RestIndexer(service) => service.balances_for_token(token_id).await,
        }
    }

    async fn balance_for_address_by_token_id(
        &self,
        address: &str,
        token_id: &str,
    ) -> Result<Balance, DataError> {
        match self {
            Self::Slpdb(service) => {
                service
                    .balance_for_address_by_token_id(address, token_id)
                    .await
            }
            Self::RestIndexer(service) => {
                service
                    .balance_for_address_by_token_id(address, token_id)
                    .await
            }
        }
    }

    async fn validate_txid(&self, txid: &str) -> Result<ValidationResult, DataError> {
        match self {
            Self::Slpdb(service) => service.validate_txid(txid).await,
            Self::RestIndexer(service) => service.validate_txid(txid).await,
        }
    }

    async fn validate_txid_array(
        &self,
        txids: &[String],
    ) -> Result<Vec<ValidationResult>, DataError> {
        match self {
            Self::Slpdb(service) => service.validate_txid_array(txids).await,
            Self::RestIndexer(service) => service.validate_txid_array(txids).await,
        }
    }

    async fn transaction_burn_total(&self, txid: &str) -> Result<BurnTotal, DataError> {
        match self {
            Self::Slpdb(service) => service.transaction_burn_total(txid).await,
            Self::RestIndexer(service) => service.transaction_burn_total(txid).await,
        }
    }

    async fn transactions_by_token_id_address(
        &self,
        token_id: &str,
        address: &str,
    ) -> Result<Vec<Value>, DataError> {
        match self {
            Self::Slpdb(service) => {
                service
                    .transactions_by_token_id_address(token_id, address)
                    .await
            }
            Self::RestIndexer(service) => {
                service
                    .transactions_by_token_id_address(token_id, address)
                    .await
            }
        }
    }

    async fn historical_transactions(
        &self,
        addresses: &[String],
        from_block: u64,
    ) -> Result<Vec<Value>, DataError> {
        match self {
            Self::Slpdb(service) => service.historical_transactions(addresses, from_block).await,
            Self::RestIndexer(service) => {
                service.historical_transactions(addresses, from_block).await
            }
        }
    }

    async fn token_stats(&self, token_id: &str) -> Result<Token, DataError> {
        match self {
            Self::Slpdb(service) => service.token_stats(token_id).await,
            Self::RestIndexer(service) => service.token_stats(token_id).await,
        }
    }

    async fn total_minted(&self, token_id: &str) -> Result<f64, DataError> {
        match self {
            Self::Slpdb(service) => service.total_minted(token_id).await,
            Self::RestIndexer(service) => service.total_minted(token_id).await,
        }
    }

    async fn total_burned(&self, token_id: &str) -> Result<f64, DataError> {
        match self {
            Self::Slpdb(service) => service.total_burned(token_id).await,
            Self::RestIndexer(service) => service.total_burned(token_id).await,
        }
    }

    fn backend_name(&self) -> &'static str {
        match self {
            Self::Slpdb(service) => service.backend_name(),
            Self::RestIndexer(service) => service.backend_name(),
        }
    }
}
