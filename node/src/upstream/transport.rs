//! Transport boundary for upstream calls.

use super::{
    error::RpcFailure,
    types::{JsonRpcRequest, RawResponse},
};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use reqwest::{Client, Url};
use std::time::Duration;

/// Sends one JSON-RPC request and returns the raw response.
///
/// Implementations report connection-level problems as [`RpcFailure::Transport`]
/// and leave every other judgement to the client's classifier.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(&self, request: &JsonRpcRequest<'_>) -> Result<RawResponse, RpcFailure>;
}

/// HTTP transport settings.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub base_url: String,
    pub project_id: Option<String>,
    pub project_secret: Option<String>,
    pub timeout: Duration,
}

/// JSON-RPC over HTTP POST.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    secret: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let endpoint = endpoint_url(&config.base_url, config.project_id.as_deref())?;
        let client = Client::builder()
            .build()
            .wrap_err("failed to build upstream http client")?;
        Ok(Self {
            client,
            endpoint,
            secret: config.project_secret,
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, request: &JsonRpcRequest<'_>) -> Result<RawResponse, RpcFailure> {
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(request);
        if let Some(secret) = &self.secret {
            builder = builder.basic_auth("", Some(secret));
        }

        let response = builder.send().await.map_err(|err| RpcFailure::Transport {
            status: None,
            reason: err.to_string(),
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| RpcFailure::Transport {
            status: Some(status.as_u16()),
            reason: err.to_string(),
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            body: serde_json::from_slice(&bytes).ok(),
        })
    }
}

/// Join the project id onto the base url as a path segment.
fn endpoint_url(base_url: &str, project_id: Option<&str>) -> Result<Url> {
    let base = Url::parse(base_url).wrap_err_with(|| format!("invalid upstream url `{base_url}`"))?;
    match project_id.filter(|id| !id.is_empty()) {
        Some(id) => base
            .join(id)
            .wrap_err_with(|| format!("invalid project id `{id}`")),
        None => Ok(base),
    }
}
