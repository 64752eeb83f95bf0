// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! SLPDB data source
//!
//! This module implements the [`SlpData`] interface against SLPDB, the
//! MongoDB-backed SLP indexer. Queries built by [`crate::slpdb_query`] are
//! serialized, base64-encoded onto the query endpoint path, and executed with
//! Basic authentication and a bounded timeout. The response envelope carries
//! one array per queried collection; rows are handed to [`crate::normalize`]
//! to produce the canonical records.
//!
//! This is the full-capability backend: every interface operation is served.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use futures::future::try_join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use slp_data::{
    AddressBalance, Balance, BulkTokenEntry, BurnTotal, DataError, SlpData, Token,
    TokenHolderBalance, ValidationResult, address,
};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    normalize::{
        self, RawAggregateSum, RawBalanceRow, RawBurnTotalRow, RawHolderRow, RawTokenRecord,
        RawValidationRecord,
    },
    slpdb_query as query,
};

/// Fixed Basic-auth username of private SLPDB deployments.
const SLPDB_USERNAME: &str = "BITBOX";

const DEFAULT_SLPDB_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for the SLPDB data source
#[derive(Debug, Clone)]
pub struct SlpdbConfig {
    /// Base URL of the SLPDB query endpoint, with trailing slash
    pub base_url: String,
    /// Basic-auth password paired with the fixed `BITBOX` username
    pub password: String,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
}

impl SlpdbConfig {
    /// Create a new `SlpdbConfig` with validation.
    pub fn new(
        base_url: impl Into<String>,
        password: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self, DataError> {
        let mut base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(DataError::Backend {
                message: "SLPDB base URL cannot be empty".to_string(),
            });
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Ok(Self {
            base_url,
            password: password.into(),
            timeout_seconds,
        })
    }

    /// Default configuration for testing against a local mock.
    pub fn default_test(base_url: impl Into<String>) -> Self {
        Self {
            base_url: {
                let mut url = base_url.into();
                if !url.ends_with('/') {
                    url.push('/');
                }
                url
            },
            password: "BITBOX".to_string(),
            timeout_seconds: DEFAULT_SLPDB_TIMEOUT_SECONDS,
        }
    }
}

/// Response envelope of the SLPDB query endpoint
///
/// One array per source collection: confirmed, unconfirmed, token, graph.
/// Collections the query did not touch are absent and default to empty.
#[derive(Debug, Default, Deserialize)]
pub struct SlpdbEnvelope {
    /// Confirmed-transaction rows
    #[serde(default)]
    pub c: Vec<Value>,
    /// Unconfirmed-transaction rows
    #[serde(default)]
    pub u: Vec<Value>,
    /// Token rows
    #[serde(default)]
    pub t: Vec<Value>,
    /// Graph-transaction rows
    #[serde(default)]
    pub g: Vec<Value>,
}

/// SLPDB-backed implementation of [`SlpData`]
#[derive(Debug)]
pub struct SlpdbService {
    client: Client,
    config: SlpdbConfig,
}

impl SlpdbService {
    /// Create a new SLPDB service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: SlpdbConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("slp-gateway/0.1.0")
            .build()
            .map_err(DataError::backend)?;

        Ok(Self { client, config })
    }

    /// Execute one query document against the SLPDB endpoint.
    ///
    /// The document is compact-serialized, base64-encoded, and appended to
    /// the base path. No retries: failures propagate to the caller.
    async fn run_query(&self, query: &Value) -> Result<SlpdbEnvelope, DataError> {
        let encoded = BASE64.encode(query.to_string());
        let url = format!("{}q/{}", self.config.base_url, encoded);

        debug!(url = %url, "executing SLPDB query");

        let request = self
            .client
            .get(&url)
            .basic_auth(SLPDB_USERNAME, Some(&self.config.password));

        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request.send(),
        )
        .await
        .map_err(|_| DataError::Timeout {
            seconds: self.config.timeout_seconds,
        })?
        .map_err(DataError::backend)?;

        match response.status() {
            StatusCode::OK => response
                .json::<SlpdbEnvelope>()
                .await
                .map_err(DataError::invalid_response),
            StatusCode::UNAUTHORIZED => Err(DataError::Backend {
                message: "SLPDB authentication failed".to_string(),
            }),
            status => {
                warn!(status = status.as_u16(), "SLPDB returned an error status");
                Err(DataError::Backend {
                    message: format!("SLPDB returned status {}", status.as_u16()),
                })
            }
        }
    }

    fn rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, DataError> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(DataError::invalid_response))
            .collect()
    }

    /// Token detail lookup without the derived supply totals.
    async fn token_detail(&self, token_id: &str) -> Result<Token, DataError> {
        let envelope = self.run_query(&query::token_detail(token_id)).await?;
        let mut records: Vec<RawTokenRecord> = Self::rows(envelope.t)?;
        match records.drain(..).next() {
            Some(record) => normalize::normalize_token(record),
            None => Err(DataError::not_found(token_id)),
        }
    }

    /// Decimal places of one token, when the token collection knows it.
    async fn token_decimal_count(&self, token_id: &str) -> Result<Option<u8>, DataError> {
        let envelope = self.run_query(&query::token_decimals(token_id)).await?;
        let records: Vec<RawTokenRecord> = Self::rows(envelope.t)?;
        Ok(records.first().map(|record| record.token_details.decimals))
    }

    async fn balance_rows(&self, slp_address: &str) -> Result<Vec<RawBalanceRow>, DataError> {
        let envelope = self
            .run_query(&query::balances_for_address(slp_address))
            .await?;
        Self::rows(envelope.g)
    }
}

impl SlpData for SlpdbService {
    async fn list_all_tokens(&self) -> Result<Vec<Token>, DataError> {
        let envelope = self.run_query(&query::token_list()).await?;
        let records: Vec<RawTokenRecord> = Self::rows(envelope.t)?;
        records.into_iter().map(normalize::normalize_token).collect()
    }

    async fn list_single_token(&self, token_id: &str) -> Result<Token, DataError> {
        self.token_stats(token_id).await
    }

    async fn list_bulk_token(&self, token_ids: &[String]) -> Result<Vec<BulkTokenEntry>, DataError> {
        let envelope = self.run_query(&query::token_bulk(token_ids)).await?;
        let records: Vec<RawTokenRecord> = Self::rows(envelope.t)?;

        let mut entries = Vec::with_capacity(token_ids.len());
        let mut found = Vec::with_capacity(records.len());
        for record in records {
            let token = normalize::normalize_token(record)?;
            found.push(token.id.clone());
            entries.push(BulkTokenEntry::Found(Box::new(token)));
        }

        // Requested ids the backend does not know are reported explicitly.
        for token_id in token_ids {
            if !found.contains(token_id) {
                entries.push(BulkTokenEntry::not_found(token_id.clone()));
            }
        }

        Ok(entries)
    }

    async fn balances_for_address(&self, address: &str) -> Result<Vec<AddressBalance>, DataError> {
        let slp_address = address::to_slp_address(address)?;
        let rows = self.balance_rows(&slp_address).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut balances = rows
            .into_iter()
            .map(normalize::normalize_address_balance)
            .collect::<Result<Vec<_>, _>>()?;

        // Resolve decimal places per held token, concurrently. One failing
        // lookup fails the whole response.
        let decimal_counts = try_join_all(
            balances
                .iter()
                .map(|balance| self.token_decimal_count(&balance.token_id)),
        )
        .await?;

        for (balance, decimal_count) in balances.iter_mut().zip(decimal_counts) {
            balance.decimal_count = decimal_count;
        }

        Ok(balances)
    }

    async fn balances_for_token(
        &self,
        token_id: &str,
    ) -> Result<Vec<TokenHolderBalance>, DataError> {
        let envelope = self.run_query(&query::balances_for_token(token_id)).await?;
        let rows: Vec<RawHolderRow> = Self::rows(envelope.g)?;
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
        let rows = self.balance_rows(&forms.slp_address).await?;

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
        let requested = [txid.to_string()];
        let envelope = self.run_query(&query::validate_txids(&requested)).await?;

        let mut records: Vec<RawValidationRecord> = Self::rows(envelope.c)?;
        records.extend(Self::rows::<RawValidationRecord>(envelope.u)?);

        Ok(records
            .first()
            .map(normalize::normalize_validation)
            .unwrap_or_else(|| ValidationResult::unknown(txid)))
    }

    async fn validate_txid_array(
        &self,
        txids: &[String],
    ) -> Result<Vec<ValidationResult>, DataError> {
        let envelope = self.run_query(&query::validate_txids(txids)).await?;

        let mut records: Vec<RawValidationRecord> = Self::rows(envelope.c)?;
        records.extend(Self::rows::<RawValidationRecord>(envelope.u)?);

        Ok(normalize::normalize_validation_array(txids, &records))
    }

    async fn transaction_burn_total(&self, txid: &str) -> Result<BurnTotal, DataError> {
        let envelope = self
            .run_query(&query::transaction_burn_total(txid))
            .await?;
        let rows: Vec<RawBurnTotalRow> = Self::rows(envelope.g)?;
        normalize::normalize_burn_total(txid, rows)
    }

    async fn transactions_by_token_id_address(
        &self,
        token_id: &str,
        address: &str,
    ) -> Result<Vec<Value>, DataError> {
        let slp_address = address::to_slp_address(address)?;
        let envelope = self
            .run_query(&query::transactions_by_token_id_address(
                token_id,
                &slp_address,
            ))
            .await?;
        Ok(envelope.c)
    }

    async fn historical_transactions(
        &self,
        addresses: &[String],
        from_block: u64,
    ) -> Result<Vec<Value>, DataError> {
        let forms = addresses
            .iter()
            .map(|addr| address::address_forms(addr))
            .collect::<Result<Vec<_>, _>>()?;

        let envelope = self
            .run_query(&query::historical_transactions(&forms, from_block))
            .await?;

        // Confirmed first, then unconfirmed; both already newest-first.
        let mut transactions = envelope.c;
        transactions.extend(envelope.u);
        Ok(transactions)
    }

    async fn token_stats(&self, token_id: &str) -> Result<Token, DataError> {
        // The three lookups are independent; issue them concurrently and
        // join. A missing token detail is a hard failure regardless of what
        // the supply aggregations returned.
        let (minted, burned, token) = tokio::try_join!(
            self.total_minted(token_id),
            self.total_burned(token_id),
            self.token_detail(token_id),
        )?;

        Ok(normalize::with_supply_totals(token, minted, burned))
    }

    async fn total_minted(&self, token_id: &str) -> Result<f64, DataError> {
        let envelope = self.run_query(&query::total_minted(token_id)).await?;
        let rows: Vec<RawAggregateSum> = Self::rows(envelope.g)?;
        normalize::normalize_aggregate_sum(rows)
    }

    async fn total_burned(&self, token_id: &str) -> Result<f64, DataError> {
        let envelope = self.run_query(&query::total_burned(token_id)).await?;
        let rows: Vec<RawAggregateSum> = Self::rows(envelope.g)?;
        normalize::normalize_aggregate_sum(rows)
    }

    fn backend_name(&self) -> &'static str {
        "slpdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_appends_trailing_slash() {
        let config = SlpdbConfig::new("https://slpdb.example.com", "secret", 30).expect("valid");
        assert_eq!(config.base_url, "https://slpdb.example.com/");

        let config = SlpdbConfig::new("https://slpdb.example.com/", "secret", 30).expect("valid");
        assert_eq!(config.base_url, "https://slpdb.example.com/");
    }

    #[test]
    fn config_rejects_empty_url() {
        assert!(SlpdbConfig::new("  ", "secret", 30).is_err());
    }

    #[test]
    fn envelope_defaults_missing_collections() {
        let envelope: SlpdbEnvelope =
            serde_json::from_str(r#"{"t": [{"x": 1}]}"#).expect("parses");
        assert_eq!(envelope.t.len(), 1);
        assert!(envelope.c.is_empty());
        assert!(envelope.u.is_empty());
        assert!(envelope.g.is_empty());
    }

    #[tokio::test]
    async fn service_creation() {
        let config = SlpdbConfig::default_test("https://slpdb.example.com");
        let service = SlpdbService::new(config).expect("creates");
        assert_eq!(service.backend_name(), "slpdb");
    }
}
