// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Integration tests for the SLPDB data source against a mocked endpoint.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::json;
use slp_backends::slpdb::{SlpdbConfig, SlpdbService};
use slp_data::{BulkTokenEntry, DataError, SlpData};
use wiremock::{
    Match, Mock, MockServer, Request, ResponseTemplate,
    matchers::{basic_auth, method},
};

const TOKEN_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const CASH_ADDR: &str = "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";
const SLP_ADDR: &str = "simpleledger:qpm2qsznhks23z7629mms6s4cwef74vcwv6ff8mah3";

/// Matches requests whose base64-encoded query document contains the needle.
struct QueryContains(&'static str);

impl Match for QueryContains {
    fn matches(&self, request: &Request) -> bool {
        let Some(encoded) = request.url.path().strip_prefix("/q/") else {
            return false;
        };
        let Ok(decoded) = BASE64.decode(encoded.as_bytes()) else {
            return false;
        };
        let Ok(text) = String::from_utf8(decoded) else {
            return false;
        };
        text.contains(self.0)
    }
}

async fn service(server: &MockServer) -> SlpdbService {
    let config = SlpdbConfig::new(server.uri(), "secret", 5).expect("valid config");
    SlpdbService::new(config).expect("client builds")
}

fn token_detail_body(genesis_qty: &str) -> serde_json::Value {
    json!({
        "t": [{
            "tokenDetails": {
                "tokenIdHex": TOKEN_ID,
                "documentSha256Hex": null,
                "versionType": 1,
                "symbol": "TOK",
                "name": "A Token",
                "documentUri": "token.example",
                "decimals": 8,
                "timestamp_unix": 1_546_300_800i64,
                "genesisOrMintQuantity": genesis_qty
            },
            "tokenStats": {
                "block_created": 600_000,
                "block_last_active_send": 600_100,
                "block_last_active_mint": null,
                "qty_valid_txns_since_genesis": 300,
                "qty_valid_token_addresses": 12,
                "minting_baton_status": "ALIVE"
            }
        }]
    })
}

/// Mount the three stats queries: minted, burned, detail. The minted query is
/// the only one naming BATON_UNSPENT; the burned query the only one naming
/// EXCESS_INPUT_BURNED.
async fn mount_stats_mocks(
    server: &MockServer,
    minted: serde_json::Value,
    burned: serde_json::Value,
    detail: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(QueryContains("BATON_UNSPENT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(minted))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(QueryContains("EXCESS_INPUT_BURNED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(burned))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(QueryContains("tokenStats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .mount(server)
        .await;
}

#[tokio::test]
async fn token_stats_composes_supply_totals() {
    let server = MockServer::start().await;
    mount_stats_mocks(
        &server,
        json!({ "g": [{ "_id": null, "count": "500" }] }),
        json!({ "g": [{ "_id": null, "count": "200" }] }),
        token_detail_body("1000"),
    )
    .await;

    let token = service(&server)
        .await
        .token_stats(TOKEN_ID)
        .await
        .expect("token stats");

    assert_eq!(token.id, TOKEN_ID);
    assert_eq!(token.total_minted, Some(1500.0));
    assert_eq!(token.total_burned, Some(200.0));
    assert_eq!(token.circulating_supply, Some(1300.0));
}

#[tokio::test]
async fn token_stats_not_found_despite_aggregates() {
    let server = MockServer::start().await;
    mount_stats_mocks(
        &server,
        json!({ "g": [{ "_id": null, "count": "500" }] }),
        json!({ "g": [{ "_id": null, "count": "200" }] }),
        json!({ "t": [] }),
    )
    .await;

    let result = service(&server).await.token_stats(TOKEN_ID).await;
    assert!(matches!(result, Err(DataError::NotFound { .. })));
}

#[tokio::test]
async fn empty_aggregations_are_exactly_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "g": [] })))
        .mount(&server)
        .await;

    let service = service(&server).await;
    let minted = service.total_minted(TOKEN_ID).await.expect("minted");
    let burned = service.total_burned(TOKEN_ID).await.expect("burned");
    assert!((minted - 0.0).abs() < f64::EPSILON);
    assert!((burned - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn queries_carry_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(basic_auth("BITBOX", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "g": [] })))
        .expect(1)
        .mount(&server)
        .await;

    service(&server)
        .await
        .total_minted(TOKEN_ID)
        .await
        .expect("authenticated query");
}

#[tokio::test]
async fn backend_error_status_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = service(&server).await.total_minted(TOKEN_ID).await;
    assert!(matches!(result, Err(DataError::Backend { .. })));
}

#[tokio::test]
async fn bulk_listing_accounts_for_unknown_ids() {
    let unknown = "bb".repeat(32);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("$in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_detail_body("1000")))
        .mount(&server)
        .await;

    let requested = vec![TOKEN_ID.to_string(), unknown.clone()];
    let entries = service(&server)
        .await
        .list_bulk_token(&requested)
        .await
        .expect("bulk listing");

    assert_eq!(entries.len(), 2);
    let BulkTokenEntry::Found(token) = &entries[0] else {
        unreachable!("expected the known token first");
    };
    assert_eq!(token.id, TOKEN_ID);
    // Supply totals cost extra round-trips; bulk mode leaves them null.
    assert_eq!(token.total_minted, None);
    assert_eq!(token.circulating_supply, None);
    assert_eq!(entries[1], BulkTokenEntry::not_found(unknown));
}

#[tokio::test]
async fn validation_array_keeps_request_order_and_length() {
    let txid_known = "aa".repeat(32);
    let txid_unknown = "cc".repeat(32);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("tx.h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": [{ "tx": { "h": txid_known }, "slp": { "valid": true } }],
            "u": []
        })))
        .mount(&server)
        .await;

    // Duplicate and unknown ids: the backend answer is one row.
    let requested = vec![txid_known.clone(), txid_unknown.clone(), txid_known.clone()];
    let results = service(&server)
        .await
        .validate_txid_array(&requested)
        .await
        .expect("validation");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].txid, txid_known);
    assert!(results[0].valid);
    assert_eq!(results[1].txid, txid_unknown);
    assert!(!results[1].valid);
    assert!(results[2].valid);
}

#[tokio::test]
async fn single_validation_merges_confirmed_and_unconfirmed() {
    let txid = "aa".repeat(32);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("tx.h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": [],
            "u": [{ "tx": { "h": txid }, "slp": { "valid": false, "invalidReason": "bad baton" } }]
        })))
        .mount(&server)
        .await;

    let result = service(&server)
        .await
        .validate_txid(&txid)
        .await
        .expect("validation");
    assert!(!result.valid);
    assert_eq!(result.invalid_reason.as_deref(), Some("bad baton"));
}

#[tokio::test]
async fn burn_total_difference_of_projected_sums() {
    let txid = "aa".repeat(32);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("graphTxn.txid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "g": [{ "inputTotal": "300", "outputTotal": "300" }]
        })))
        .mount(&server)
        .await;

    let burn = service(&server)
        .await
        .transaction_burn_total(&txid)
        .await
        .expect("burn total");
    assert!((burn.input_total - 300.0).abs() < f64::EPSILON);
    assert!((burn.burn_total - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn missing_balance_rows_become_zero_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("$elemMatch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "g": [] })))
        .mount(&server)
        .await;

    let balance = service(&server)
        .await
        .balance_for_address_by_token_id(CASH_ADDR, TOKEN_ID)
        .await
        .expect("placeholder");

    assert_eq!(balance.token_id, TOKEN_ID);
    assert_eq!(balance.balance_string, "0");
    assert!((balance.balance - 0.0).abs() < f64::EPSILON);
    assert_eq!(balance.cash_address, CASH_ADDR);
    assert!(balance.slp_address.starts_with("simpleledger:"));
    assert!(!balance.legacy_address.is_empty());
}

#[tokio::test]
async fn address_balances_resolve_decimal_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("$elemMatch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "g": [{
                "_id": TOKEN_ID,
                "balanceString": "12345",
                "slpAddress": SLP_ADDR
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(QueryContains("tokenDetails.decimals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "t": [{ "tokenDetails": { "tokenIdHex": TOKEN_ID, "decimals": 8 } }]
        })))
        .mount(&server)
        .await;

    let balances = service(&server)
        .await
        .balances_for_address(CASH_ADDR)
        .await
        .expect("balances");

    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].token_id, TOKEN_ID);
    assert_eq!(balances[0].balance_string, "12345");
    assert_eq!(balances[0].decimal_count, Some(8));
}

#[tokio::test]
async fn history_concatenates_confirmed_then_unconfirmed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("slp.valid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": [{ "tx": { "h": "aa".repeat(32) }, "blk": { "i": 600_001 } }],
            "u": [{ "tx": { "h": "bb".repeat(32) } }]
        })))
        .mount(&server)
        .await;

    let addresses = vec![CASH_ADDR.to_string()];
    let transactions = service(&server)
        .await
        .historical_transactions(&addresses, 600_000)
        .await
        .expect("history");

    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["blk"]["i"], 600_001);
}
