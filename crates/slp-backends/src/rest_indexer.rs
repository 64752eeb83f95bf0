// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! REST SLP indexer data source
//!
//! This module implements the [`SlpData`] interface against a plain JSON REST
//! SLP indexer. Each operation maps to one fixed relative path: GET for
//! single lookups, POST with an array body for bulk lookups.
//!
//! This is the lighter-weight backend. It has no graph collection, so the
//! burn/mint breakdown and history operations are a designed capability gap:
//! they fail with [`DataError::NotImplemented`], which callers must handle
//! distinctly from missing data.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use slp_data::{
    AddressBalance, Balance, BulkTokenEntry, BurnTotal, DataError, SlpData, Token,
    TokenHolderBalance, ValidationResult, address,
};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::normalize::{self, RawBalanceRow, RawHolderRow};

const BACKEND: &str = "rest-indexer";

const DEFAULT_INDEXER_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for the REST indexer data source
#[derive(Debug, Clone)]
pub struct RestIndexerConfig {
    /// Base URL of the indexer, with trailing slash
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
}

impl RestIndexerConfig {
    /// Create a new `RestIndexerConfig` with validation.
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self, DataError> {
        let mut base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(DataError::Backend {
                message: "indexer base URL cannot be empty".to_string(),
            });
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            base_url,
            timeout_seconds,
        })
    }

    /// Default configuration for testing against a local mock.
    pub fn default_test(base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        Self {
            base_url: url,
            timeout_seconds: DEFAULT_INDEXER_TIMEOUT_SECONDS,
        }
    }
}

/// REST-indexer-backed implementation of [`SlpData`]
#[derive(Debug)]
pub struct RestIndexerService {
    client: Client,
    config: RestIndexerConfig,
}

impl RestIndexerService {
    /// Create a new REST indexer service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: RestIndexerConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("slp-gateway/0.1.0")
            .build()
            .map_err(DataError::backend)?;

        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token_id_hint: &str,
    ) -> Result<T, DataError> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(url = %url, "querying REST indexer");

        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client.get(&url).send(),
        )
        .await
        .map_err(|_| DataError::Timeout {
            seconds: self.config.timeout_seconds,
        })?
        .map_err(DataError::backend)?;

        Self::decode(response, token_id_hint).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T, DataError> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(url = %url, "posting to REST indexer");

        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client.post(&url).json(body).send(),
        )
        .await
        .map_err(|_| DataError::Timeout {
            seconds: self.config.timeout_seconds,
        })?
        .map_err(DataError::backend)?;

        Self::decode(response, "").await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        token_id_hint: &str,
    ) -> Result<T, DataError> {
        match response.status() {
            StatusCode::OK => response
                .json::<T>()
                .await
                .map_err(DataError::invalid_response),
            StatusCode::NOT_FOUND => Err(DataError::not_found(token_id_hint)),
            status => {
                warn!(
                    status = status.as_u16(),
                    "REST indexer returned an error status"
                );
                Err(DataError::Backend {
                    message: format!("indexer returned status {}", status.as_u16()),
                })
            }
        }
    }
}

impl SlpData for RestIndexerService {
    async fn list_all_tokens(&self) -> Result<Vec<Token>, DataError> {
        Err(DataError::not_implemented(BACKEND, "list_all_tokens"))
    }

    async fn list_single_token(&self, token_id: &str) -> Result<Token, DataError> {
        self.get_json(&format!("list/{token_id}"), token_id).await
    }

    async fn list_bulk_token(&self, token_ids: &[String]) -> Result<Vec<BulkTokenEntry>, DataError> {
        self.post_json("list/", &json!({ "tokenIds": token_ids }))
            .await
    }

    async fn balances_for_address(&self, address: &str) -> Result<Vec<AddressBalance>, DataError> {
        let rows: Vec<RawBalanceRow> = self
            .get_json(&format!("balancesForAddress/{address}"), "")
            .await?;
        rows.into_iter()
            .map(normalize::normalize_address_balance)
            .collect()
    }

    async fn balances_for_token(
        &self,
        token_id: &str,
    ) -> Result<Vec<TokenHolderBalance>, DataError> {
        let rows: Vec<RawHolderRow> = self
            .get_json(&format!("balancesForToken/{token_id}"), token_id)
            .await?;
        rows.into_iter()
            .map(|row| normalize::normalize_holder_balance(token_id, row))
            .collect()
    }

    async fn balance_for_address_by_token_id(
        &self,
        address: &str,
        token_id: &str,
    ) -> Result<Balance, DataError> {
        let forms = address::address_forms(address)?;
        let rows: Vec<RawBalanceRow> = self
            .get_json(&format!("balancesForAddress/{address}"), "")
            .await?;

        for row in rows {
            if row.id == token_id {
                let (balance, balance_string) = normalize::amount_parts(&row.balance)?;
                return Ok(Balance {
                    slp_address: forms.slp_address,
                    cash_address: forms.cash_address,
                    legacy_address: forms.legacy_address,
                    token_id: row.id,
                    balance,
                    balance_string,
                });
            }
        }

        Ok(Balance::zero(&forms, token_id))
    }

    async fn validate_txid(&self, txid: &str) -> Result<ValidationResult, DataError> {
        self.get_json(&format!("validateTxid/{txid}"), "").await
    }

    async fn validate_txid_array(
        &self,
        txids: &[String],
    ) -> Result<Vec<ValidationResult>, DataError> {
        let verdicts: Vec<ValidationResult> = self
            .post_json("validateTxid/", &json!({ "txids": txids }))
            .await?;

        // The indexer may deduplicate or drop unknown ids; restore request
        // ordering and cardinality the same way the SLPDB path does.
        Ok(normalize::reorder_validation_results(txids, verdicts))
    }

    async fn transaction_burn_total(&self, txid: &str) -> Result<BurnTotal, DataError> {
        self.get_json(&format!("burnTotal/{txid}"), "").await
    }

    async fn transactions_by_token_id_address(
        &self,
        _token_id: &str,
        _address: &str,
    ) -> Result<Vec<Value>, DataError> {
        Err(DataError::not_implemented(
            BACKEND,
            "transactions_by_token_id_address",
        ))
    }

    async fn historical_transactions(
        &self,
        _addresses: &[String],
        _from_block: u64,
    ) -> Result<Vec<Value>, DataError> {
        Err(DataError::not_implemented(
            BACKEND,
            "historical_transactions",
        ))
    }

    async fn token_stats(&self, token_id: &str) -> Result<Token, DataError> {
        self.get_json(&format!("tokenStats/{token_id}"), token_id)
            .await
    }

    async fn total_minted(&self, _token_id: &str) -> Result<f64, DataError> {
        Err(DataError::not_implemented(BACKEND, "total_minted"))
    }

    async fn total_burned(&self, _token_id: &str) -> Result<f64, DataError> {
        Err(DataError::not_implemented(BACKEND, "total_burned"))
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}
