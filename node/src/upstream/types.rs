//! Wire records exchanged with the upstream JSON-RPC API.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const BLOCK_NUMBER_METHOD: &str = "eth_blockNumber";
pub const GET_LOGS_METHOD: &str = "eth_getLogs";
pub const GET_BLOCK_BY_NUMBER_METHOD: &str = "eth_getBlockByNumber";

/// Outgoing JSON-RPC request body.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
        }
    }
}

/// Raw HTTP-level response before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed JSON body; `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl RawResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }
}

/// `eth_getLogs` filter object. Bounds are omitted when unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from_block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to_block: Option<String>,
}

/// An event log as returned by `eth_getLogs`. Fields we do not use are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub transaction_hash: B256,
    /// Hex quantity, kept verbatim.
    pub block_number: String,
    pub block_hash: B256,
}

/// A block as returned by `eth_getBlockByNumber`; only the timestamp is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub timestamp: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub hash: Option<B256>,
}
