//! Shared fixtures for unit tests.

use crate::search::BlockRange;
use crate::upstream::error::codes;
use crate::upstream::types::{JsonRpcRequest, LogFilter, RawResponse};
use crate::upstream::{
    quantity, ApiError, BlockRecord, LogRecord, RpcFailure, RpcTransport, UpstreamApi,
};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use jsonrpsee::{server::ServerBuilder, types::ErrorObjectOwned, RpcModule};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Block hash used for every block in the mocks: derived from the height.
pub fn block_hash(height: u64) -> B256 {
    B256::left_padding_from(&height.to_be_bytes())
}

/// JSON log as the upstream would return it.
pub fn log_json(height: u64, tx_byte: u8) -> Value {
    json!({
        "address": "0x1111111111111111111111111111111111111111",
        "blockHash": block_hash(height),
        "blockNumber": quantity::encode(height),
        "data": "0x",
        "logIndex": "0x0",
        "removed": false,
        "topics": [],
        "transactionHash": B256::with_last_byte(tx_byte),
        "transactionIndex": "0x0",
    })
}

/// When a mocked `eth_getLogs` reports the result set as too large.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooLarge {
    Never,
    /// More than this many logs match.
    MoreThan(usize),
    /// The range spans more than one block.
    WiderThanOneBlock,
    Always,
}

/// In-memory upstream holding logs for any number of addresses.
#[derive(Debug)]
pub struct MockUpstream {
    height: u64,
    logs: HashMap<Address, Vec<LogRecord>>,
    timestamps: HashMap<u64, u64>,
    too_large: TooLarge,
    failing: Vec<(BlockRange, RpcFailure)>,
    queried: Mutex<Vec<BlockRange>>,
    blocks_requested: Mutex<Vec<String>>,
    height_calls: AtomicU64,
}

impl MockUpstream {
    pub fn new(height: u64) -> Self {
        Self {
            height,
            logs: HashMap::new(),
            timestamps: HashMap::new(),
            too_large: TooLarge::Never,
            failing: Vec::new(),
            queried: Mutex::new(Vec::new()),
            blocks_requested: Mutex::new(Vec::new()),
            height_calls: AtomicU64::new(0),
        }
    }

    /// Add one log per entry of `heights` (duplicates allowed), kept in block order.
    pub fn with_logs(mut self, address: Address, heights: &[u64]) -> Self {
        let logs = self.logs.entry(address).or_default();
        for height in heights {
            let tx_byte = (logs.len() % 255) as u8 + 1;
            logs.push(LogRecord {
                transaction_hash: B256::with_last_byte(tx_byte),
                block_number: quantity::encode(*height),
                block_hash: block_hash(*height),
            });
        }
        logs.sort_by_key(|log| quantity::decode(&log.block_number).unwrap_or(u64::MAX));
        self
    }

    pub fn with_timestamp(mut self, height: u64, timestamp: u64) -> Self {
        self.timestamps.insert(height, timestamp);
        self
    }

    pub fn with_too_large(mut self, too_large: TooLarge) -> Self {
        self.too_large = too_large;
        self
    }

    /// Fail `eth_getLogs` for exactly this range.
    pub fn with_failing_range(mut self, range: BlockRange, failure: RpcFailure) -> Self {
        self.failing.push((range, failure));
        self
    }

    pub fn queried_ranges(&self) -> Vec<BlockRange> {
        self.queried.lock().expect("lock").clone()
    }

    pub fn get_logs_calls(&self) -> usize {
        self.queried.lock().expect("lock").len()
    }

    pub fn blocks_requested(&self) -> Vec<String> {
        self.blocks_requested.lock().expect("lock").clone()
    }

    pub fn height_calls(&self) -> u64 {
        self.height_calls.load(Ordering::SeqCst)
    }

    fn too_large_error() -> RpcFailure {
        ApiError::new(
            codes::RESULT_SET_TOO_LARGE,
            "query returned more than 10000 results",
        )
        .into()
    }
}

#[async_trait]
impl UpstreamApi for MockUpstream {
    async fn current_height(&self) -> Result<u64, RpcFailure> {
        self.height_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.height)
    }

    async fn get_logs(
        &self,
        address: Address,
        range: BlockRange,
    ) -> Result<Vec<LogRecord>, RpcFailure> {
        self.queried.lock().expect("lock").push(range);

        if let Some((_, failure)) = self.failing.iter().find(|(failing, _)| *failing == range) {
            return Err(failure.clone());
        }

        let matching: Vec<LogRecord> = self
            .logs
            .get(&address)
            .into_iter()
            .flatten()
            .filter(|log| {
                quantity::decode(&log.block_number)
                    .map(|height| range.contains(height))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let too_large = match self.too_large {
            TooLarge::Never => false,
            TooLarge::MoreThan(limit) => matching.len() > limit,
            TooLarge::WiderThanOneBlock => !range.is_single(),
            TooLarge::Always => true,
        };
        if too_large {
            return Err(Self::too_large_error());
        }
        Ok(matching)
    }

    async fn get_block_by_number(
        &self,
        block: &str,
        _include_full_transactions: bool,
    ) -> Result<BlockRecord, RpcFailure> {
        self.blocks_requested
            .lock()
            .expect("lock")
            .push(block.to_string());
        let height = quantity::decode(block)
            .map_err(|err| RpcFailure::Protocol(err.to_string()))?;
        let timestamp = self
            .timestamps
            .get(&height)
            .copied()
            .ok_or(RpcFailure::EmptyResult)?;
        Ok(BlockRecord {
            timestamp: quantity::encode(timestamp),
            number: Some(block.to_string()),
            hash: Some(block_hash(height)),
        })
    }
}

/// Transport that replays canned responses and records the requests it saw.
#[derive(Debug)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<Value>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<RawResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn send(&self, request: &JsonRpcRequest<'_>) -> Result<RawResponse, RpcFailure> {
        self.requests
            .lock()
            .expect("lock")
            .push(serde_json::to_value(request).expect("serializable request"));
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| RpcFailure::Transport {
                status: None,
                reason: "no scripted response left".to_string(),
            })
    }
}

/// Chain served by [`spawn_fake_upstream`].
#[derive(Debug, Clone, Default)]
pub struct FakeChain {
    pub height: u64,
    /// `(address, height)` per log, any order.
    pub logs: Vec<(Address, u64)>,
    /// Maximum logs per `eth_getLogs` response before answering -32005.
    pub max_logs: usize,
    pub timestamps: HashMap<u64, u64>,
}

/// Start a JSON-RPC server that answers the upstream methods from `chain`.
pub async fn spawn_fake_upstream(chain: FakeChain) -> SocketAddr {
    let server = ServerBuilder::default()
        .build("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = server.local_addr().expect("local addr");

    let mut module = RpcModule::new(chain);
    module
        .register_method("eth_blockNumber", |_, chain, _| {
            Ok::<_, ErrorObjectOwned>(quantity::encode(chain.height))
        })
        .expect("register eth_blockNumber");
    module
        .register_method("eth_getLogs", |params, chain, _| -> Result<Vec<Value>, ErrorObjectOwned> {
            let filter: LogFilter = params.one()?;
            let bound = |raw: &Option<String>, default: u64| {
                raw.as_deref()
                    .map(quantity::decode)
                    .transpose()
                    .map(|value| value.unwrap_or(default))
                    .map_err(|err| ErrorObjectOwned::owned(-32602, err.to_string(), None::<()>))
            };
            let from = bound(&filter.from_block, 0)?;
            let to = bound(&filter.to_block, chain.height)?;

            let mut heights: Vec<u64> = chain
                .logs
                .iter()
                .filter(|(address, height)| *address == filter.address && (from..=to).contains(height))
                .map(|(_, height)| *height)
                .collect();
            if heights.len() > chain.max_logs {
                return Err(ErrorObjectOwned::owned(
                    codes::RESULT_SET_TOO_LARGE as i32,
                    format!("query returned more than {} results", chain.max_logs),
                    None::<()>,
                ));
            }
            heights.sort_unstable();
            Ok(heights
                .iter()
                .enumerate()
                .map(|(idx, height)| log_json(*height, idx as u8 + 1))
                .collect())
        })
        .expect("register eth_getLogs");
    module
        .register_method("eth_getBlockByNumber", |params, chain, _| {
            let (block, _full): (String, bool) = params.parse()?;
            let height = quantity::decode(&block)
                .map_err(|err| ErrorObjectOwned::owned(-32602, err.to_string(), None::<()>))?;
            Ok::<_, ErrorObjectOwned>(chain.timestamps.get(&height).map(|timestamp| {
                json!({
                    "number": block,
                    "hash": block_hash(height),
                    "timestamp": quantity::encode(*timestamp),
                })
            }))
        })
        .expect("register eth_getBlockByNumber");

    let handle = server.start(module);
    tokio::spawn(handle.stopped());
    addr
}
