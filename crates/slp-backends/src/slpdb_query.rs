// SPDX-FileCopyrightText: 2025 SLP Gateway Contributors
//
// SPDX-License-Identifier: MIT

//! SLPDB query construction
//!
//! SLPDB exposes its MongoDB collections through a query endpoint that takes a
//! `{v: 3, q: {...}}` document: plain finds against the token (`t`),
//! confirmed (`c`), and unconfirmed (`u`) collections, and aggregation
//! pipelines against the graph-transaction (`g`) collection.
//!
//! Every function here is a pure constructor of such a document. Nothing in
//! this module performs I/O or can fail.

use serde_json::{Value, json};
use slp_data::AddressForms;

/// Cap on unfiltered token listings.
pub const TOKEN_LIST_LIMIT: u64 = 10_000;
/// Cap on balance aggregation output.
pub const BALANCE_LIMIT: u64 = 10_000;
/// Cap on transaction-history results.
pub const HISTORY_LIMIT: u64 = 500;
/// Cap on per-token-and-address history results.
pub const TOKEN_HISTORY_LIMIT: u64 = 100;
/// Cap on bulk txid validation.
pub const VALIDATION_LIMIT: u64 = 300;

/// Output statuses whose quantities count toward the total minted supply.
const MINT_STATUSES: [&str; 3] = [
    "BATON_SPENT_IN_MINT",
    "BATON_UNSPENT",
    "BATON_SPENT_NOT_IN_MINT",
];

/// Output statuses whose quantities count toward the total burned supply.
const BURN_STATUSES: [&str; 8] = [
    "SPENT_NON_SLP",
    "BATON_SPENT_INVALID_SLP",
    "SPENT_INVALID_SLP",
    "BATON_SPENT_NON_SLP",
    "MISSING_BCH_VOUT",
    "BATON_MISSING_BCH_VOUT",
    "BATON_SPENT_NOT_IN_MINT",
    "EXCESS_INPUT_BURNED",
];

/// Detail + stats lookup for one token.
pub fn token_detail(token_id: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["t"],
            "find": {
                "$query": {
                    "tokenDetails.tokenIdHex": token_id
                }
            },
            "project": { "tokenDetails": 1, "tokenStats": 1, "_id": 0 },
            "limit": 1
        }
    })
}

/// Unfiltered token listing, newest genesis first.
pub fn token_list() -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["t"],
            "find": {
                "$query": {}
            },
            "project": { "tokenDetails": 1, "tokenStats": 1, "_id": 0 },
            "sort": { "tokenStats.block_created": -1 },
            "limit": TOKEN_LIST_LIMIT
        }
    })
}

/// Detail + stats lookup for a batch of tokens.
pub fn token_bulk(token_ids: &[String]) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["t"],
            "find": {
                "tokenDetails.tokenIdHex": { "$in": token_ids }
            },
            "project": { "tokenDetails": 1, "tokenStats": 1, "_id": 0 },
            "sort": { "tokenStats.block_created": -1 },
            "limit": TOKEN_LIST_LIMIT
        }
    })
}

/// Minimal projection resolving only a token's decimal places.
pub fn token_decimals(token_id: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["t"],
            "find": {
                "$query": {
                    "tokenDetails.tokenIdHex": token_id
                }
            },
            "project": {
                "tokenDetails.decimals": 1,
                "tokenDetails.tokenIdHex": 1,
                "_id": 0
            },
            "limit": 1
        }
    })
}

/// Sum of output quantities minted for one token.
///
/// Matches every graph transaction carrying a baton-related output status,
/// unwinds the outputs, and folds the quantities into one scalar. An empty
/// result set means nothing was minted after genesis.
pub fn total_minted(token_id: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                {
                    "$match": {
                        "tokenDetails.tokenIdHex": token_id,
                        "graphTxn.outputs.status": { "$in": MINT_STATUSES }
                    }
                },
                { "$unwind": "$graphTxn.outputs" },
                {
                    "$group": {
                        "_id": null,
                        "count": { "$sum": "$graphTxn.outputs.slpAmount" }
                    }
                }
            ],
            "limit": 1
        }
    })
}

/// Sum of output quantities burned for one token.
///
/// The status filter is applied twice: pre-unwind as an array containment
/// test to narrow the candidate documents, and post-unwind as an exact filter
/// so only the burned outputs themselves are summed.
pub fn total_burned(token_id: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                {
                    "$match": {
                        "tokenDetails.tokenIdHex": token_id,
                        "graphTxn.outputs.status": { "$in": BURN_STATUSES }
                    }
                },
                { "$unwind": "$graphTxn.outputs" },
                {
                    "$match": {
                        "graphTxn.outputs.status": { "$in": BURN_STATUSES }
                    }
                },
                {
                    "$group": {
                        "_id": null,
                        "count": { "$sum": "$graphTxn.outputs.slpAmount" }
                    }
                }
            ],
            "limit": 1
        }
    })
}

/// All token balances of one address, grouped by token id.
///
/// The unspent-output predicate appears both pre-unwind (as an `$elemMatch`
/// over the outputs array) and post-unwind (field-by-field), since unwinding
/// surfaces spent outputs of documents that matched on a different element.
pub fn balances_for_address(slp_address: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                {
                    "$match": {
                        "graphTxn.outputs": {
                            "$elemMatch": {
                                "address": slp_address,
                                "status": "UNSPENT",
                                "slpAmount": { "$gte": 0 }
                            }
                        }
                    }
                },
                { "$unwind": "$graphTxn.outputs" },
                {
                    "$match": {
                        "graphTxn.outputs.address": slp_address,
                        "graphTxn.outputs.status": "UNSPENT",
                        "graphTxn.outputs.slpAmount": { "$gte": 0 }
                    }
                },
                {
                    "$project": {
                        "amount": "$graphTxn.outputs.slpAmount",
                        "address": "$graphTxn.outputs.address",
                        "txid": "$graphTxn.txid",
                        "vout": "$graphTxn.outputs.vout",
                        "tokenId": "$tokenDetails.tokenIdHex"
                    }
                },
                {
                    "$group": {
                        "_id": "$tokenId",
                        "balanceString": { "$sum": "$amount" },
                        "slpAddress": { "$first": "$address" }
                    }
                }
            ],
            "limit": BALANCE_LIMIT
        }
    })
}

/// Balance of one token across all holding addresses, grouped by address.
pub fn balances_for_token(token_id: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                {
                    "$match": {
                        "graphTxn.outputs": {
                            "$elemMatch": {
                                "status": "UNSPENT",
                                "slpAmount": { "$gte": 0 }
                            }
                        },
                        "tokenDetails.tokenIdHex": token_id
                    }
                },
                { "$unwind": "$graphTxn.outputs" },
                {
                    "$match": {
                        "graphTxn.outputs.status": "UNSPENT",
                        "graphTxn.outputs.slpAmount": { "$gte": 0 },
                        "tokenDetails.tokenIdHex": token_id
                    }
                },
                {
                    "$project": {
                        "token_balance": "$graphTxn.outputs.slpAmount",
                        "address": "$graphTxn.outputs.address",
                        "txid": "$graphTxn.txid",
                        "vout": "$graphTxn.outputs.vout",
                        "tokenId": "$tokenDetails.tokenIdHex"
                    }
                },
                {
                    "$group": {
                        "_id": "$address",
                        "token_balance": { "$sum": "$token_balance" }
                    }
                }
            ],
            "limit": BALANCE_LIMIT
        }
    })
}

/// Input and output quantity totals of one transaction, as a signed pair.
pub fn transaction_burn_total(txid: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["g"],
            "aggregate": [
                {
                    "$match": {
                        "graphTxn.txid": txid
                    }
                },
                {
                    "$project": {
                        "graphTxn.txid": 1,
                        "inputTotal": { "$sum": "$graphTxn.inputs.slpAmount" },
                        "outputTotal": { "$sum": "$graphTxn.outputs.slpAmount" }
                    }
                }
            ],
            "limit": 1000
        }
    })
}

/// Validity projection for a batch of txids, across both confirmed and
/// unconfirmed collections. SLPDB deduplicates repeated ids; the normalizer
/// restores request cardinality.
pub fn validate_txids(txids: &[String]) -> Value {
    json!({
        "v": 3,
        "q": {
            "db": ["c", "u"],
            "find": {
                "tx.h": { "$in": txids }
            },
            "limit": VALIDATION_LIMIT,
            "project": { "slp.valid": 1, "tx.h": 1, "slp.invalidReason": 1 }
        }
    })
}

/// Recent transactions of one token touching one address, newest first.
pub fn transactions_by_token_id_address(token_id: &str, slp_address: &str) -> Value {
    json!({
        "v": 3,
        "q": {
            "find": {
                "db": ["c", "u"],
                "$query": {
                    "$or": [
                        { "in.e.a": slp_address },
                        { "out.e.a": slp_address }
                    ],
                    "slp.detail.tokenIdHex": token_id
                },
                "$orderby": { "blk.i": -1 }
            },
            "limit": TOKEN_HISTORY_LIMIT
        },
        "r": {
            "f": "[.[] | { txid: .tx.h, tokenDetails: .slp } ]"
        }
    })
}

/// Valid SLP history for a set of addresses above a block floor.
///
/// Two clauses per address: base-chain inputs match on the bare cashaddr
/// payload, token outputs match on the `simpleledger:` form.
pub fn historical_transactions(addresses: &[AddressForms], from_block: u64) -> Value {
    let mut or_clauses = Vec::with_capacity(addresses.len() * 2);
    for forms in addresses {
        or_clauses.push(json!({ "in.e.a": forms.cash_payload() }));
        or_clauses.push(json!({ "slp.detail.outputs.address": forms.slp_address }));
    }

    json!({
        "v": 3,
        "q": {
            "find": {
                "db": ["c", "u"],
                "$query": {
                    "$or": or_clauses,
                    "slp.valid": true,
                    "blk.i": { "$not": { "$lte": from_block } }
                },
                "$orderby": { "blk.i": -1 }
            },
            "project": {
                "_id": 0,
                "tx.h": 1,
                "in.i": 1,
                "in.e": 1,
                "out.e": 1,
                "out.a": 1,
                "slp.detail": 1,
                "blk": 1
            },
            "limit": HISTORY_LIMIT
        }
    })
}
