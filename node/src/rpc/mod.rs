//! JSON-RPC server exposing contract lookups.

use crate::resolver::{ContractResolver, CreationRecord, ResolveError};
use crate::upstream::UpstreamApi;
use alloy_primitives::Address;
use eyre::{Result, WrapErr};
use jsonrpsee::{
    server::{ServerBuilder, ServerHandle},
    types::ErrorObjectOwned,
    RpcModule,
};
use serde::Serialize;
use std::net::SocketAddr;

pub const CONTRACT_METHOD: &str = "contract_getCreation";

/// JSON-RPC error codes returned by the server.
pub mod codes {
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const RESOURCE_NOT_FOUND: i32 = -32001;
    pub const LIMIT_EXCEEDED: i32 = -32005;
}

/// Response body of [`CONTRACT_METHOD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub created_in_transaction: CreationRecord,
}

impl From<ResolveError> for ErrorObjectOwned {
    fn from(err: ResolveError) -> Self {
        let code = match &err {
            ResolveError::NoLogsFound { .. } => codes::RESOURCE_NOT_FOUND,
            ResolveError::SearchExhausted { .. } => codes::LIMIT_EXCEEDED,
            ResolveError::Upstream(_) => codes::INTERNAL_ERROR,
        };
        ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
    }
}

/// Start the JSON-RPC server and return its handle.
pub async fn start<A>(bind: SocketAddr, resolver: ContractResolver<A>) -> Result<ServerHandle>
where
    A: UpstreamApi + 'static,
{
    let server = ServerBuilder::default()
        .build(bind)
        .await
        .wrap_err("failed to bind RPC server")?;

    Ok(server.start(module(resolver)?))
}

pub fn module<A>(resolver: ContractResolver<A>) -> Result<RpcModule<ContractResolver<A>>>
where
    A: UpstreamApi + 'static,
{
    let mut module = RpcModule::new(resolver);
    module
        .register_async_method(CONTRACT_METHOD, |params, resolver, _| async move {
            let raw: String = params.one()?;
            let address = parse_address(&raw)?;
            let created_in_transaction = resolver.resolve(address).await?;
            Ok::<_, ErrorObjectOwned>(ContractInfo {
                created_in_transaction,
            })
        })
        .wrap_err("failed to register contract_getCreation")?;

    Ok(module)
}

fn parse_address(raw: &str) -> Result<Address, ErrorObjectOwned> {
    raw.trim().parse::<Address>().map_err(|err| {
        ErrorObjectOwned::owned(
            codes::INVALID_PARAMS,
            format!("invalid address `{raw}`: {err}"),
            None::<()>,
        )
    })
}
