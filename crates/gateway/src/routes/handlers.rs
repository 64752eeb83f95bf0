// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! HTTP request handlers module
//!
//! This module provides HTTP request handlers for the gateway server. Each
//! handler validates its inputs, delegates to the configured data source, and
//! serializes the canonical records straight onto the wire. Data-source errors
//! map onto status codes in [`crate::error`].

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slp_data::{
    AddressBalance, Balance, BulkTokenEntry, BurnTotal, SlpData, Token, TokenHolderBalance,
    ValidationResult,
};

use crate::{error::ServerError, state::ServerState};

/// Upper bound on ids per bulk request
const MAX_BULK_IDS: usize = 20;

fn validate_hex_id(id: &str, what: &str) -> Result<(), ServerError> {
    let well_formed = id.len() == 64
        && id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if well_formed {
        Ok(())
    } else {
        Err(ServerError::ValidationError(format!(
            "{what} must be 64 lowercase hex characters"
        )))
    }
}

fn validate_bulk<T>(items: &[T], what: &str) -> Result<(), ServerError> {
    if items.is_empty() {
        return Err(ServerError::ValidationError(format!(
            "{what} list cannot be empty"
        )));
    }
    if items.len() > MAX_BULK_IDS {
        return Err(ServerError::ValidationError(format!(
            "{what} list cannot exceed {MAX_BULK_IDS} entries"
        )));
    }
    Ok(())
}

/// Health check endpoint handler
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    Json(state.health_check())
}

/// List every known token, newest first
pub async fn list_tokens_handler(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Token>>, ServerError> {
    let tokens = state.data_source().list_all_tokens().await?;
    Ok(Json(tokens))
}

/// Look up one token by id
pub async fn single_token_handler(
    State(state): State<ServerState>,
    Path(token_id): Path<String>,
) -> Result<Json<Token>, ServerError> {
    validate_hex_id(&token_id, "tokenId")?;
    let token = state.data_source().list_single_token(&token_id).await?;
    Ok(Json(token))
}

/// Bulk token lookup request
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTokenRequest {
    /// Token ids to look up (1-20 entries)
    pub token_ids: Vec<String>,
}

/// Look up several tokens at once
///
/// The response accounts for every requested id; unknown ids come back as
/// explicit placeholder entries.
pub async fn bulk_token_handler(
    State(state): State<ServerState>,
    Json(request): Json<BulkTokenRequest>,
) -> Result<Json<Vec<BulkTokenEntry>>, ServerError> {
    validate_bulk(&request.token_ids, "tokenIds")?;
    for token_id in &request.token_ids {
        validate_hex_id(token_id, "tokenId")?;
    }
    let entries = state.data_source().list_bulk_token(&request.token_ids).await?;
    Ok(Json(entries))
}

/// Full statistics for one token, including supply totals
pub async fn token_stats_handler(
    State(state): State<ServerState>,
    Path(token_id): Path<String>,
) -> Result<Json<Token>, ServerError> {
    validate_hex_id(&token_id, "tokenId")?;
    let token = state.data_source().token_stats(&token_id).await?;
    Ok(Json(token))
}

/// All token balances held by one address
pub async fn balances_for_address_handler(
    State(state): State<ServerState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<AddressBalance>>, ServerError> {
    let balances = state.data_source().balances_for_address(&address).await?;
    Ok(Json(balances))
}

/// The balance of one token across all holding addresses
pub async fn balances_for_token_handler(
    State(state): State<ServerState>,
    Path(token_id): Path<String>,
) -> Result<Json<Vec<TokenHolderBalance>>, ServerError> {
    validate_hex_id(&token_id, "tokenId")?;
    let balances = state.data_source().balances_for_token(&token_id).await?;
    Ok(Json(balances))
}

/// The balance of one token at one address
///
/// Absence of backend records is not an error: the zero-balance placeholder
/// for the pair comes back with status 200.
pub async fn balance_handler(
    State(state): State<ServerState>,
    Path((address, token_id)): Path<(String, String)>,
) -> Result<Json<Balance>, ServerError> {
    validate_hex_id(&token_id, "tokenId")?;
    let balance = state
        .data_source()
        .balance_for_address_by_token_id(&address, &token_id)
        .await?;
    Ok(Json(balance))
}

/// SLP validity of a single transaction
pub async fn validate_single_handler(
    State(state): State<ServerState>,
    Path(txid): Path<String>,
) -> Result<Json<ValidationResult>, ServerError> {
    validate_hex_id(&txid, "txid")?;
    let result = state.data_source().validate_txid(&txid).await?;
    Ok(Json(result))
}

/// Bulk validation request
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkValidateRequest {
    /// Transaction ids to validate (1-20 entries)
    pub txids: Vec<String>,
}

/// SLP validity of a batch of transactions
///
/// The response has exactly one verdict per requested txid, in request order,
/// duplicates included.
pub async fn validate_bulk_handler(
    State(state): State<ServerState>,
    Json(request): Json<BulkValidateRequest>,
) -> Result<Json<Vec<ValidationResult>>, ServerError> {
    validate_bulk(&request.txids, "txids")?;
    for txid in &request.txids {
        validate_hex_id(txid, "txid")?;
    }
    let results = state.data_source().validate_txid_array(&request.txids).await?;
    Ok(Json(results))
}

/// Token quantity burned by one transaction
pub async fn burn_total_handler(
    State(state): State<ServerState>,
    Path(txid): Path<String>,
) -> Result<Json<BurnTotal>, ServerError> {
    validate_hex_id(&txid, "txid")?;
    let burn = state.data_source().transaction_burn_total(&txid).await?;
    Ok(Json(burn))
}

/// Recent transactions of one token touching one address
pub async fn transactions_handler(
    State(state): State<ServerState>,
    Path((token_id, address)): Path<(String, String)>,
) -> Result<Json<Vec<Value>>, ServerError> {
    validate_hex_id(&token_id, "tokenId")?;
    let transactions = state
        .data_source()
        .transactions_by_token_id_address(&token_id, &address)
        .await?;
    Ok(Json(transactions))
}

/// Transaction history request across all tokens
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    /// Addresses to fetch history for (1-20 entries)
    pub addresses: Vec<String>,
    /// Only return transactions at or above this block height
    #[serde(default)]
    pub from_block: u64,
}

/// Confirmed and unconfirmed SLP history for a set of addresses
pub async fn transaction_history_handler(
    State(state): State<ServerState>,
    Json(request): Json<HistoryRequest>,
) -> Result<Json<Vec<Value>>, ServerError> {
    validate_bulk(&request.addresses, "addresses")?;
    let transactions = state
        .data_source()
        .historical_transactions(&request.addresses, request.from_block)
        .await?;
    Ok(Json(transactions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_id_validation() {
        assert!(validate_hex_id(&"ab".repeat(32), "tokenId").is_ok());

        // wrong length
        assert!(validate_hex_id("abcd", "tokenId").is_err());
        // uppercase
        assert!(validate_hex_id(&"AB".repeat(32), "tokenId").is_err());
        // non-hex character
        assert!(validate_hex_id(&"zz".repeat(32), "tokenId").is_err());
    }

    #[test]
    fn bulk_bounds() {
        let one = vec!["a".to_string()];
        assert!(validate_bulk(&one, "tokenIds").is_ok());

        let empty: Vec<String> = vec![];
        assert!(validate_bulk(&empty, "tokenIds").is_err());

        let too_many = vec![String::new(); MAX_BULK_IDS + 1];
        assert!(validate_bulk(&too_many, "tokenIds").is_err());
    }
}
