//! Contract creation lookup.

use crate::search::{self, BlockRange, SearchError};
use crate::upstream::{quantity, RpcFailure, UpstreamApi};
use alloy_primitives::{Address, B256};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Transaction and block in which a contract emitted its first log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationRecord {
    pub transaction_hash: B256,
    /// Hex quantity exactly as the upstream reported it.
    pub block_number: String,
    pub block_hash: B256,
    /// Block timestamp, seconds since the unix epoch.
    pub timestamp: u64,
}

/// Resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Upstream(#[from] RpcFailure),
    #[error("block {block} has more logs than the upstream returns per query; search range cannot be narrowed further")]
    SearchExhausted { block: u64 },
    #[error("no logs found for address {address}")]
    NoLogsFound { address: Address },
}

impl From<SearchError> for ResolveError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Upstream(failure) => Self::Upstream(failure),
            SearchError::Exhausted { block } => Self::SearchExhausted { block },
        }
    }
}

/// Resolves contract addresses against one upstream.
#[derive(Debug)]
pub struct ContractResolver<A> {
    api: A,
}

impl<A> ContractResolver<A>
where
    A: UpstreamApi,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Find the creation record for `address`.
    pub async fn resolve(&self, address: Address) -> Result<CreationRecord, ResolveError> {
        let height = self.api.current_height().await?;
        debug!(%address, height, "resolving contract");

        let outcome = search::find_oldest_logs(&self.api, address, BlockRange::up_to(height)).await?;
        debug!(
            %address,
            queries = outcome.stats.queries,
            splits = outcome.stats.splits,
            max_depth = outcome.stats.max_depth,
            "range search finished"
        );

        let Some(first) = outcome.logs.into_iter().next() else {
            return Err(ResolveError::NoLogsFound { address });
        };

        let block = self.api.get_block_by_number(&first.block_number, false).await?;
        let timestamp = quantity::decode(&block.timestamp).map_err(|err| {
            RpcFailure::Protocol(format!("invalid block timestamp: {err}"))
        })?;

        info!(
            %address,
            transaction_hash = %first.transaction_hash,
            block_number = %first.block_number,
            "contract creation resolved"
        );
        Ok(CreationRecord {
            transaction_hash: first.transaction_hash,
            block_number: first.block_number,
            block_hash: first.block_hash,
            timestamp,
        })
    }
}
