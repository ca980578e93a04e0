//! CLI and config handling.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};

pub const DEFAULT_UPSTREAM_URL: &str = "https://mainnet.infura.io/v3/";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RPC_BIND: &str = "127.0.0.1:8545";

/// Contract origin lookup configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(
    name = "contract-origin",
    about = "Find the transaction that created a contract from its oldest event log"
)]
pub struct NodeConfig {
    /// Upstream JSON-RPC base url.
    #[arg(long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,
    /// Project id appended to the upstream url path.
    #[arg(long, env = "INFURA_PROJECT_ID")]
    pub project_id: Option<String>,
    /// Project secret sent as HTTP basic auth.
    #[arg(long, env = "INFURA_PROJECT_SECRET", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub project_secret: Option<String>,
    /// Per-request upstream timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    /// Resolve one contract address and print its creation record as JSON.
    Resolve(ResolveArgs),
    /// Serve contract lookups over JSON-RPC until interrupted.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ResolveArgs {
    /// Contract address (0x-prefixed, 20 bytes).
    pub address: String,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ServeArgs {
    /// JSON-RPC bind address.
    #[arg(long, default_value = DEFAULT_RPC_BIND)]
    pub rpc_bind: SocketAddr,
}

impl NodeConfig {
    /// Parse configuration from CLI args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}
