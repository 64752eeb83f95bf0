// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Response normalization
//!
//! Pure functions mapping raw backend records onto the canonical public
//! schema. Raw payloads are deserialized into the typed records here and a
//! fresh canonical record is constructed from them; decoded backend JSON is
//! never reshaped in place.
//!
//! Backends disagree on field names (`tokenIdHex` vs `id`), on where fields
//! live (stats nested vs top-level), and on whether quantities arrive as JSON
//! numbers or decimal strings. All of that is reconciled here.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use slp_data::{
    AddressBalance, BurnTotal, DataError, Token, TokenHolderBalance, ValidationResult,
};

/// Raw token record as stored in the SLPDB token collection.
#[derive(Debug, Deserialize)]
pub struct RawTokenRecord {
    /// Genesis detail block
    #[serde(rename = "tokenDetails")]
    pub token_details: RawTokenDetails,
    /// Statistics block; absent in narrow projections
    #[serde(rename = "tokenStats", default)]
    pub token_stats: Option<RawTokenStats>,
}

/// The genesis detail block of a raw token record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenDetails {
    /// Token id under its backend name
    pub token_id_hex: String,
    /// SLP version/type
    #[serde(default)]
    pub version_type: Option<u32>,
    /// Genesis document hash under its backend name
    #[serde(default)]
    pub document_sha256_hex: Option<String>,
    /// Ticker symbol
    #[serde(default)]
    pub symbol: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// Genesis document URI
    #[serde(default)]
    pub document_uri: String,
    /// Decimal places
    #[serde(default)]
    pub decimals: u8,
    /// Genesis timestamp, seconds since epoch; snake_case in the raw record
    #[serde(rename = "timestamp_unix", default)]
    pub timestamp_unix: Option<i64>,
    /// Genesis quantity as a decimal string
    #[serde(default)]
    pub genesis_or_mint_quantity: Option<Value>,
}

/// The statistics block of a raw token record (snake_case in the backend).
#[derive(Debug, Default, Deserialize)]
pub struct RawTokenStats {
    /// Block height of the genesis transaction
    #[serde(default)]
    pub block_created: Option<u64>,
    /// Block height of the most recent valid SEND
    #[serde(default)]
    pub block_last_active_send: Option<u64>,
    /// Block height of the most recent valid MINT
    #[serde(default)]
    pub block_last_active_mint: Option<u64>,
    /// Count of valid transactions since genesis
    #[serde(default)]
    pub qty_valid_txns_since_genesis: u64,
    /// Count of addresses currently holding the token
    #[serde(default)]
    pub qty_valid_token_addresses: u64,
    /// Minting baton status
    #[serde(default)]
    pub minting_baton_status: String,
}

/// One row of a balance aggregation grouped by token id.
#[derive(Debug, Deserialize)]
pub struct RawBalanceRow {
    /// Group key: the token id
    #[serde(rename = "_id")]
    pub id: String,
    /// Summed quantity; number or decimal string depending on the backend
    #[serde(rename = "balanceString")]
    pub balance: Value,
    /// Holding address carried through the group stage
    #[serde(rename = "slpAddress", default)]
    pub slp_address: String,
}

/// One row of a balance aggregation grouped by address.
#[derive(Debug, Deserialize)]
pub struct RawHolderRow {
    /// Group key: the holding address
    #[serde(rename = "_id")]
    pub id: String,
    /// Summed quantity
    #[serde(rename = "token_balance")]
    pub token_balance: Value,
}

/// One row of the per-transaction burn-total projection.
#[derive(Debug, Deserialize)]
pub struct RawBurnTotalRow {
    /// Sum over input quantities
    #[serde(rename = "inputTotal")]
    pub input_total: Value,
    /// Sum over output quantities
    #[serde(rename = "outputTotal")]
    pub output_total: Value,
}

/// One row of the aggregate-sum group stage.
#[derive(Debug, Deserialize)]
pub struct RawAggregateSum {
    /// The folded scalar
    pub count: Value,
}

/// One row of the txid validity projection.
#[derive(Debug, Deserialize)]
pub struct RawValidationRecord {
    /// Transaction key block
    pub tx: RawTxKey,
    /// Validity block
    pub slp: RawSlpValidity,
}

/// Transaction key block of a raw record.
#[derive(Debug, Deserialize)]
pub struct RawTxKey {
    /// Transaction hash
    pub h: String,
}

/// Validity block of a raw record.
#[derive(Debug, Deserialize)]
pub struct RawSlpValidity {
    /// Whether the transaction is valid SLP
    #[serde(default)]
    pub valid: bool,
    /// Reason it is invalid, when it is
    #[serde(rename = "invalidReason", default)]
    pub invalid_reason: Option<String>,
}

/// Build a canonical [`Token`] from a raw backend record.
///
/// Renames `tokenIdHex` to `id` and `documentSha256Hex` to `documentHash`,
/// parses the decimal-string genesis quantity, and lifts the six statistics
/// fields onto the top level. Derived supply totals are left null; only the
/// single-token stats path fills them in.
pub fn normalize_token(record: RawTokenRecord) -> Result<Token, DataError> {
    let details = record.token_details;
    let stats = record.token_stats.unwrap_or_default();

    let initial_token_qty = match &details.genesis_or_mint_quantity {
        Some(value) => amount_f64(value)?,
        None => 0.0,
    };

    Ok(Token {
        id: details.token_id_hex,
        version_type: details.version_type,
        document_hash: details.document_sha256_hex,
        symbol: details.symbol,
        name: details.name,
        document_uri: details.document_uri,
        decimals: details.decimals,
        timestamp_unix: details.timestamp_unix,
        initial_token_qty,
        block_created: stats.block_created,
        block_last_active_send: stats.block_last_active_send,
        block_last_active_mint: stats.block_last_active_mint,
        txns_since_genesis: stats.qty_valid_txns_since_genesis,
        valid_addresses: stats.qty_valid_token_addresses,
        minting_baton_status: stats.minting_baton_status,
        total_minted: None,
        total_burned: None,
        circulating_supply: None,
    })
}

/// Fill the derived supply totals on a token from its aggregation results.
pub fn with_supply_totals(mut token: Token, minted_since_genesis: f64, burned: f64) -> Token {
    let total_minted = token.initial_token_qty + minted_since_genesis;
    token.total_minted = Some(total_minted);
    token.total_burned = Some(burned);
    token.circulating_supply = Some(total_minted - burned);
    token
}

/// Canonical balance row from a by-token group row.
pub fn normalize_address_balance(row: RawBalanceRow) -> Result<AddressBalance, DataError> {
    let (balance, balance_string) = amount_parts(&row.balance)?;
    Ok(AddressBalance {
        token_id: row.id,
        balance,
        balance_string,
        slp_address: row.slp_address,
        decimal_count: None,
    })
}

/// Canonical holder row from a by-address group row.
pub fn normalize_holder_balance(
    token_id: &str,
    row: RawHolderRow,
) -> Result<TokenHolderBalance, DataError> {
    let (token_balance, token_balance_string) = amount_parts(&row.token_balance)?;
    Ok(TokenHolderBalance {
        token_id: token_id.to_string(),
        token_balance,
        token_balance_string,
        slp_address: row.id,
    })
}

/// Canonical burn accounting from the projection rows of one transaction.
///
/// No rows means the backend never graphed the transaction: every total is
/// zero. A negative difference is passed through unchanged; this layer
/// reports the backend's accounting, it does not audit it.
pub fn normalize_burn_total(
    txid: &str,
    rows: Vec<RawBurnTotalRow>,
) -> Result<BurnTotal, DataError> {
    let Some(row) = rows.into_iter().next() else {
        return Ok(BurnTotal::empty(txid));
    };

    let input_total = amount_f64(&row.input_total)?;
    let output_total = amount_f64(&row.output_total)?;
    Ok(BurnTotal {
        transaction_id: txid.to_string(),
        input_total,
        output_total,
        burn_total: input_total - output_total,
    })
}

/// Scalar result of a sum aggregation; an empty result set is exactly zero.
pub fn normalize_aggregate_sum(rows: Vec<RawAggregateSum>) -> Result<f64, DataError> {
    match rows.first() {
        Some(row) => amount_f64(&row.count),
        None => Ok(0.0),
    }
}

/// Canonical verdict for one raw validity record.
pub fn normalize_validation(record: &RawValidationRecord) -> ValidationResult {
    ValidationResult {
        txid: record.tx.h.clone(),
        valid: record.slp.valid,
        invalid_reason: if record.slp.valid {
            None
        } else {
            record.slp.invalid_reason.clone()
        },
    }
}

/// Restore request ordering and cardinality over backend validity records.
///
/// The backend deduplicates repeated txids and silently drops unknown ones.
/// An index over the response is consulted once per requested occurrence, so
/// duplicates each get their own resolved entry and unknown ids come back as
/// `valid: false` placeholders. The output length always equals the input
/// length.
pub fn normalize_validation_array(
    requested: &[String],
    records: &[RawValidationRecord],
) -> Vec<ValidationResult> {
    let verdicts: Vec<ValidationResult> = records.iter().map(normalize_validation).collect();
    reorder_validation_results(requested, verdicts)
}

/// The ordering/cardinality restoration of [`normalize_validation_array`],
/// for backends that already speak the canonical verdict shape.
pub fn reorder_validation_results(
    requested: &[String],
    verdicts: Vec<ValidationResult>,
) -> Vec<ValidationResult> {
    let mut by_txid: HashMap<&str, &ValidationResult> = HashMap::with_capacity(verdicts.len());
    for verdict in &verdicts {
        by_txid.entry(verdict.txid.as_str()).or_insert(verdict);
    }

    requested
        .iter()
        .map(|txid| {
            by_txid
                .get(txid.as_str())
                .map(|&verdict| verdict.clone())
                .unwrap_or_else(|| ValidationResult::unknown(txid))
        })
        .collect()
}

/// Float and authoritative-string forms of a backend quantity.
///
/// Aggregation sums arrive as JSON numbers from some deployments and as
/// decimal strings from others; both map onto the same pair.
pub fn amount_parts(value: &Value) -> Result<(f64, String), DataError> {
    match value {
        Value::String(s) => {
            let parsed = s.parse::<f64>().map_err(|_| {
                DataError::invalid_response(format!("unparseable quantity {s:?}"))
            })?;
            Ok((parsed, s.clone()))
        }
        Value::Number(n) => {
            let parsed = n.as_f64().ok_or_else(|| {
                DataError::invalid_response(format!("unrepresentable quantity {n}"))
            })?;
            Ok((parsed, n.to_string()))
        }
        other => Err(DataError::invalid_response(format!(
            "expected a quantity, got {other}"
        ))),
    }
}

/// Float form of a backend quantity.
pub fn amount_f64(value: &Value) -> Result<f64, DataError> {
    amount_parts(value).map(|(parsed, _)| parsed)
}
