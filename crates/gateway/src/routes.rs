// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! Routes module
//!
//! This module provides route configuration and handlers for the gateway
//! server. All SLP endpoints are nested under `/v1/slp`; the health endpoint
//! sits at the root for monitoring.

pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    balance_handler, balances_for_address_handler, balances_for_token_handler, bulk_token_handler,
    burn_total_handler, health_handler, list_tokens_handler, single_token_handler,
    token_stats_handler, transaction_history_handler, transactions_handler, validate_bulk_handler,
    validate_single_handler,
};

use crate::state::ServerState;

/// Create application routes
pub fn create_routes() -> Router<ServerState> {
    // Health endpoint is not nested for monitoring purposes
    let health_routes = Router::new().route("/health", get(health_handler));

    let slp_routes = Router::new()
        .route("/list", get(list_tokens_handler).post(bulk_token_handler))
        .route("/list/{token_id}", get(single_token_handler))
        .route("/tokenStats/{token_id}", get(token_stats_handler))
        .route(
            "/balancesForAddress/{address}",
            get(balances_for_address_handler),
        )
        .route(
            "/balancesForToken/{token_id}",
            get(balances_for_token_handler),
        )
        .route("/balance/{address}/{token_id}", get(balance_handler))
        .route("/validateTxid/{txid}", get(validate_single_handler))
        .route("/validateTxid", post(validate_bulk_handler))
        .route("/burnTotal/{txid}", get(burn_total_handler))
        .route(
            "/transactions/{token_id}/{address}",
            get(transactions_handler),
        )
        .route(
            "/transactionHistoryAllTokens",
            post(transaction_history_handler),
        );

    let v1 = Router::new().nest("/v1/slp", slp_routes);

    Router::new().merge(health_routes).merge(v1)
}
