// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Integration tests for the SLP endpoints, end to end through a running
//! gateway backed by a mocked SLPDB.

use std::{net::SocketAddr, sync::Arc};

use axum::http::StatusCode;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use gateway::{Server, ServerConfig, ShutdownConfig};
use serde_json::{Value, json};
use slp_backends::{DataSource, RestIndexerConfig};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate, matchers::method};

const TOKEN_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Matches SLPDB requests whose base64-encoded query document contains the needle.
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

async fn start_gateway(slpdb: &MockServer) -> SocketAddr {
    let config = ServerConfig::for_testing(slpdb.uri());
    let (addr, _) = Server::new(config, ShutdownConfig::default())
        .expect("Failed to create server")
        .run_for_testing()
        .await
        .expect("Failed to start test server");
    addr
}

fn token_detail_body() -> Value {
    json!({
        "t": [{
            "tokenDetails": {
                "tokenIdHex": TOKEN_ID,
                "versionType": 1,
                "symbol": "TOK",
                "name": "A Token",
                "documentUri": "token.example",
                "decimals": 8,
                "timestamp_unix": 1_546_300_800i64,
                "genesisOrMintQuantity": "1000"
            },
            "tokenStats": {
                "block_created": 600_000,
                "qty_valid_txns_since_genesis": 300,
                "qty_valid_token_addresses": 12,
                "minting_baton_status": "ALIVE"
            }
        }]
    })
}

#[tokio::test]
async fn health_reports_selected_backend() {
    let slpdb = MockServer::start().await;
    let addr = start_gateway(&slpdb).await;

    let response = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to read response");
    assert_eq!(body["status"], "up");
    assert_eq!(body["backend"], "slpdb");
    assert_eq!(body["environment"], "testing");
}

#[tokio::test]
async fn token_stats_round_trip() {
    let slpdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("BATON_UNSPENT"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "g": [{ "_id": null, "count": "500" }] })),
        )
        .mount(&slpdb)
        .await;
    Mock::given(method("GET"))
        .and(QueryContains("EXCESS_INPUT_BURNED"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "g": [{ "_id": null, "count": "200" }] })),
        )
        .mount(&slpdb)
        .await;
    Mock::given(method("GET"))
        .and(QueryContains("tokenStats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_detail_body()))
        .mount(&slpdb)
        .await;

    let addr = start_gateway(&slpdb).await;

    let response = reqwest::get(format!("http://{addr}/v1/slp/tokenStats/{TOKEN_ID}"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to read response");
    assert_eq!(body["id"], TOKEN_ID);
    assert_eq!(body["symbol"], "TOK");
    assert_eq!(body["totalMinted"], 1500.0);
    assert_eq!(body["totalBurned"], 200.0);
    assert_eq!(body["circulatingSupply"], 1300.0);
}

#[tokio::test]
async fn unknown_token_is_404() {
    let slpdb = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "g": [], "t": [] })))
        .mount(&slpdb)
        .await;

    let addr = start_gateway(&slpdb).await;

    let response = reqwest::get(format!("http://{addr}/v1/slp/tokenStats/{TOKEN_ID}"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.expect("Failed to read response");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn malformed_token_id_is_rejected() {
    let slpdb = MockServer::start().await;
    let addr = start_gateway(&slpdb).await;

    let response = reqwest::get(format!("http://{addr}/v1/slp/tokenStats/nonsense"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let text = response.text().await.expect("Failed to read response");
    assert!(text.contains("tokenId must be 64 lowercase hex characters"));
}

#[tokio::test]
async fn bulk_validation_bounds_are_enforced() {
    let slpdb = MockServer::start().await;
    let addr = start_gateway(&slpdb).await;
    let client = reqwest::Client::new();

    let empty_request = json!({ "txids": [] });
    let response = client
        .post(format!("http://{addr}/v1/slp/validateTxid"))
        .json(&empty_request)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let text = response.text().await.expect("Failed to read response");
    assert!(text.contains("txids list cannot be empty"));

    let oversized_request = json!({ "txids": vec!["aa".repeat(32); 21] });
    let response = client
        .post(format!("http://{addr}/v1/slp/validateTxid"))
        .json(&oversized_request)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bulk_validation_round_trip() {
    let txid = "aa".repeat(32);
    let slpdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("tx.h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": [{ "tx": { "h": txid }, "slp": { "valid": true } }],
            "u": []
        })))
        .mount(&slpdb)
        .await;

    let addr = start_gateway(&slpdb).await;
    let client = reqwest::Client::new();

    let request = json!({ "txids": [txid, "bb".repeat(32)] });
    let response = client
        .post(format!("http://{addr}/v1/slp/validateTxid"))
        .json(&request)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to read response");
    let verdicts = body.as_array().expect("array response");
    assert_eq!(verdicts.len(), 2);
    assert_eq!(verdicts[0]["valid"], true);
    assert_eq!(verdicts[1]["valid"], false);
}

#[tokio::test]
async fn burn_total_round_trip() {
    let txid = "aa".repeat(32);
    let slpdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(QueryContains("graphTxn.txid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "g": [{ "inputTotal": "300", "outputTotal": "200" }]
        })))
        .mount(&slpdb)
        .await;

    let addr = start_gateway(&slpdb).await;

    let response = reqwest::get(format!("http://{addr}/v1/slp/burnTotal/{txid}"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to read response");
    assert_eq!(body["transactionId"], txid);
    assert_eq!(body["burnTotal"], 100.0);
}

#[tokio::test]
async fn capability_gaps_surface_as_501() {
    let indexer = MockServer::start().await;
    let config = ServerConfig::for_testing(indexer.uri());
    let source = DataSource::rest_indexer(
        RestIndexerConfig::new(indexer.uri(), 5).expect("valid indexer config"),
    )
    .expect("Failed to create data source");
    let (addr, _) = Server::with_data_source(config, ShutdownConfig::default(), Arc::new(source))
        .expect("Failed to create server")
        .run_for_testing()
        .await
        .expect("Failed to start test server");

    let response = reqwest::get(format!("http://{addr}/v1/slp/list"))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let text = response.text().await.expect("Failed to read response");
    assert!(text.contains("not supported by the rest-indexer backend"));
}
