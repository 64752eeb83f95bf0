// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Canonical record types of the public gateway schema
//!
//! All records here are value objects serialized camelCase on the wire. They
//! are constructed fresh from raw backend payloads by the normalization layer
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::address::AddressForms;

/// Canonical token record
///
/// Combines the genesis detail fields with the statistics block lifted onto
/// the top level. The derived supply totals are only populated on single-token
/// stats lookups; bulk listings leave them null because computing them costs
/// two extra aggregation round-trips per token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Token id: the 64-hex-char genesis transaction hash
    pub id: String,
    /// SLP version/type of the token
    pub version_type: Option<u32>,
    /// Genesis document hash, if the token declared one
    pub document_hash: Option<String>,
    /// Ticker symbol
    pub symbol: String,
    /// Human-readable name
    pub name: String,
    /// Genesis document URI
    pub document_uri: String,
    /// Decimal places of the token quantity
    pub decimals: u8,
    /// Genesis timestamp, seconds since epoch
    pub timestamp_unix: Option<i64>,
    /// Quantity created at genesis, parsed from the decimal-string form
    pub initial_token_qty: f64,
    /// Block height of the genesis transaction
    pub block_created: Option<u64>,
    /// Block height of the most recent valid SEND
    pub block_last_active_send: Option<u64>,
    /// Block height of the most recent valid MINT
    pub block_last_active_mint: Option<u64>,
    /// Count of valid transactions since genesis
    pub txns_since_genesis: u64,
    /// Count of addresses currently holding the token
    pub valid_addresses: u64,
    /// Status of the minting baton
    pub minting_baton_status: String,
    /// `initial_token_qty` plus everything minted since genesis
    pub total_minted: Option<f64>,
    /// Total quantity burned
    pub total_burned: Option<f64>,
    /// `total_minted - total_burned`
    pub circulating_supply: Option<f64>,
}

/// One entry of a bulk token listing
///
/// Requested ids the backend has no record of are reported explicitly rather
/// than dropped, so the listing always accounts for every input id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkTokenEntry {
    /// Token found; derived supply totals are null in bulk mode
    Found(Box<Token>),
    /// Requested id with no backend record
    NotFound {
        /// The requested token id
        id: String,
        /// Always `false`
        valid: bool,
    },
}

impl BulkTokenEntry {
    /// Placeholder entry for a requested id the backend does not know.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            valid: false,
        }
    }
}

/// Balance of one token at one address, with all three address forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Address in `simpleledger:` form
    pub slp_address: String,
    /// Address in `bitcoincash:` form
    pub cash_address: String,
    /// Address in legacy base58check form
    pub legacy_address: String,
    /// Token id the balance refers to
    pub token_id: String,
    /// Balance as a float; lossy for very large integer quantities
    pub balance: f64,
    /// Authoritative decimal-string form of the balance
    pub balance_string: String,
}

impl Balance {
    /// Zero-balance placeholder for an (address, token) pair the backend has
    /// no rows for.
    pub fn zero(forms: &AddressForms, token_id: impl Into<String>) -> Self {
        Self {
            slp_address: forms.slp_address.clone(),
            cash_address: forms.cash_address.clone(),
            legacy_address: forms.legacy_address.clone(),
            token_id: token_id.into(),
            balance: 0.0,
            balance_string: "0".to_string(),
        }
    }
}

/// One row of "all token balances of one address"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBalance {
    /// Token id the balance refers to
    pub token_id: String,
    /// Balance as a float
    pub balance: f64,
    /// Authoritative decimal-string form of the balance
    pub balance_string: String,
    /// Holding address in `simpleledger:` form
    pub slp_address: String,
    /// Decimal places of the token, when the detail lookup resolved them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_count: Option<u8>,
}

/// One row of "balance of one token across all addresses"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolderBalance {
    /// Token id the balance refers to
    pub token_id: String,
    /// Balance as a float
    pub token_balance: f64,
    /// Authoritative decimal-string form of the balance
    pub token_balance_string: String,
    /// Holding address in `simpleledger:` form
    pub slp_address: String,
}

/// Token quantity accounting of one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnTotal {
    /// The transaction examined
    pub transaction_id: String,
    /// Sum of token quantities across its inputs
    pub input_total: f64,
    /// Sum of token quantities across its outputs
    pub output_total: f64,
    /// `input_total - output_total`; passed through even if negative
    pub burn_total: f64,
}

impl BurnTotal {
    /// All-zero accounting for a transaction the backend has no graph rows for.
    pub fn empty(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            input_total: 0.0,
            output_total: 0.0,
            burn_total: 0.0,
        }
    }
}

/// SLP validity verdict for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// The transaction examined
    pub txid: String,
    /// Whether the transaction is a valid SLP transaction
    pub valid: bool,
    /// Reason the transaction is invalid; present iff `valid` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
}

impl ValidationResult {
    /// Verdict for a txid the backend has no record of.
    pub fn unknown(txid: impl Into<String>) -> Self {
        Self {
            txid: txid.into(),
            valid: false,
            invalid_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_entry_not_found_serialization() {
        let entry = BulkTokenEntry::not_found("ff".repeat(32));
        let json = serde_json::to_value(&entry).expect("serializable");
        assert_eq!(json["id"], "ff".repeat(32));
        assert_eq!(json["valid"], false);
    }

    #[test]
    fn validation_result_omits_reason_when_valid() {
        let result = ValidationResult {
            txid: "aa".repeat(32),
            valid: true,
            invalid_reason: None,
        };
        let json = serde_json::to_value(&result).expect("serializable");
        assert!(json.get("invalidReason").is_none());
    }

    #[test]
    fn zero_balance_placeholder() {
        let forms = AddressForms {
            slp_address: "simpleledger:qq".to_string(),
            cash_address: "bitcoincash:qq".to_string(),
            legacy_address: "1abc".to_string(),
        };
        let balance = Balance::zero(&forms, "aa".repeat(32));
        assert_eq!(balance.balance_string, "0");
        assert!((balance.balance - 0.0).abs() < f64::EPSILON);
        assert_eq!(balance.token_id, "aa".repeat(32));
    }

    #[test]
    fn burn_total_empty() {
        let burn = BurnTotal::empty("aa".repeat(32));
        assert!((burn.burn_total - 0.0).abs() < f64::EPSILON);
        assert_eq!(burn.transaction_id, "aa".repeat(32));
    }
}
