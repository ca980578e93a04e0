//! Upstream JSON-RPC access: transport, response classification, and wire records.

mod client;
pub mod error;
pub mod quantity;
mod transport;
pub mod types;

pub use client::{classify_response, RpcClient};
pub use error::{ApiError, ApiErrorCode, RpcFailure};
pub use transport::{HttpTransport, HttpTransportConfig, RpcTransport};
pub use types::{BlockRecord, LogRecord};

use crate::search::BlockRange;
use alloy_primitives::Address;
use async_trait::async_trait;

/// The three upstream operations the resolver depends on.
#[async_trait]
pub trait UpstreamApi: Send + Sync {
    /// Latest block height known to the upstream.
    async fn current_height(&self) -> Result<u64, RpcFailure>;

    /// Logs emitted by `address` within the inclusive `range`.
    async fn get_logs(&self, address: Address, range: BlockRange)
        -> Result<Vec<LogRecord>, RpcFailure>;

    /// Block lookup by hex height as the upstream reported it.
    async fn get_block_by_number(
        &self,
        block: &str,
        include_full_transactions: bool,
    ) -> Result<BlockRecord, RpcFailure>;
}
