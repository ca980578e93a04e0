//! JSON-RPC client for the three upstream operations.

use super::{
    error::{ApiError, RpcFailure},
    quantity,
    transport::RpcTransport,
    types::{
        BlockRecord, JsonRpcRequest, LogFilter, LogRecord, RawResponse, BLOCK_NUMBER_METHOD,
        GET_BLOCK_BY_NUMBER_METHOD, GET_LOGS_METHOD,
    },
    UpstreamApi,
};
use crate::search::BlockRange;
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Upstream client over any [`RpcTransport`].
///
/// Every call is one round trip; nothing is retried here.
#[derive(Debug)]
pub struct RpcClient<T> {
    transport: T,
    next_id: AtomicU64,
}

impl<T> RpcClient<T>
where
    T: RpcTransport,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<R>(&self, method: &str, params: Value) -> Result<R, RpcFailure>
    where
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);
        trace!(method, id, "upstream request");
        let raw = self.transport.send(&request).await?;
        let result = classify_response(raw)?;
        serde_json::from_value(result)
            .map_err(|err| RpcFailure::Protocol(format!("unexpected {method} result: {err}")))
    }
}

#[async_trait]
impl<T> UpstreamApi for RpcClient<T>
where
    T: RpcTransport,
{
    async fn current_height(&self) -> Result<u64, RpcFailure> {
        let raw: String = self.call(BLOCK_NUMBER_METHOD, json!([])).await?;
        quantity::decode(&raw)
            .map_err(|err| RpcFailure::Protocol(format!("invalid chain height: {err}")))
    }

    async fn get_logs(
        &self,
        address: Address,
        range: BlockRange,
    ) -> Result<Vec<LogRecord>, RpcFailure> {
        let filter = LogFilter {
            address,
            from_block: Some(quantity::encode(range.start())),
            to_block: Some(quantity::encode(range.end())),
        };
        self.call(GET_LOGS_METHOD, json!([filter])).await
    }

    async fn get_block_by_number(
        &self,
        block: &str,
        include_full_transactions: bool,
    ) -> Result<BlockRecord, RpcFailure> {
        self.call(
            GET_BLOCK_BY_NUMBER_METHOD,
            json!([block, include_full_transactions]),
        )
        .await
    }
}

#[derive(Deserialize)]
struct ErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Classify a raw response into its `result` payload or a failure.
///
/// Checks run in a fixed order: transport status, missing body, explicit error
/// object, missing result. `null` members count as missing, like an absent body.
pub fn classify_response(raw: RawResponse) -> Result<Value, RpcFailure> {
    if raw.status != 200 {
        return Err(RpcFailure::Transport {
            status: Some(raw.status),
            reason: format!("upstream responded with HTTP {}", raw.status),
        });
    }

    let mut body = match raw.body {
        Some(Value::Null) | None => {
            return Err(RpcFailure::Protocol("response body was empty".to_string()))
        }
        Some(body) => body,
    };

    if let Some(error) = body.get_mut("error").map(Value::take) {
        if !error.is_null() {
            let error: ErrorObject = serde_json::from_value(error)
                .map_err(|err| RpcFailure::Protocol(format!("malformed error object: {err}")))?;
            return Err(ApiError::new(error.code, error.message).into());
        }
    }

    match body.get_mut("result").map(Value::take) {
        Some(Value::Null) | None => Err(RpcFailure::EmptyResult),
        Some(result) => Ok(result),
    }
}
