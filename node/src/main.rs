use alloy_primitives::Address;
use contract_origin::{
    cli::{Command, NodeConfig},
    logging,
    resolver::ContractResolver,
    rpc,
    upstream::{HttpTransport, HttpTransportConfig, RpcClient},
};
use eyre::{Result, WrapErr};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_args();
    logging::init_tracing(&config);

    let transport = HttpTransport::new(HttpTransportConfig {
        base_url: config.upstream_url.clone(),
        project_id: config.project_id.clone(),
        project_secret: config.project_secret.clone(),
        timeout: config.request_timeout(),
    })?;
    info!(
        upstream = %transport.endpoint().origin().ascii_serialization(),
        timeout_ms = config.request_timeout_ms,
        "upstream configured"
    );
    let resolver = ContractResolver::new(RpcClient::new(transport));

    match &config.command {
        Command::Resolve(args) => {
            let address: Address = args
                .address
                .trim()
                .parse()
                .wrap_err_with(|| format!("invalid contract address `{}`", args.address))?;
            let record = resolver
                .resolve(address)
                .await
                .wrap_err_with(|| format!("failed to resolve contract {address}"))?;
            let output = serde_json::to_string_pretty(&rpc::ContractInfo {
                created_in_transaction: record,
            })?;
            println!("{output}");
        }
        Command::Serve(args) => {
            let handle = rpc::start(args.rpc_bind, resolver).await?;
            info!(rpc_bind = %args.rpc_bind, method = rpc::CONTRACT_METHOD, "rpc server started");

            tokio::signal::ctrl_c().await?;
            warn!("shutdown signal received");
            if handle.stop().is_ok() {
                handle.stopped().await;
            }
        }
    }

    Ok(())
}
