//! Classified upstream failures.

use thiserror::Error;

/// Reserved JSON-RPC error codes the client understands.
pub mod codes {
    /// `eth_getLogs` matched more results than the provider returns per call.
    pub const RESULT_SET_TOO_LARGE: i64 = -32005;
}

/// Outcome of a single upstream round trip that did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcFailure {
    /// The transport did not report success (connect error, timeout, non-200 status).
    #[error("upstream transport failed{}: {reason}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport { status: Option<u16>, reason: String },
    /// The response body was absent or malformed.
    #[error("upstream response was malformed: {0}")]
    Protocol(String),
    /// A well-formed response without a `result` member.
    #[error("upstream response had no result")]
    EmptyResult,
    /// The upstream answered with an explicit error object.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RpcFailure {
    /// Returns true when a narrower query could succeed.
    pub fn is_result_set_too_large(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError {
                code: ApiErrorCode::ResultSetTooLarge,
                ..
            })
        )
    }
}

/// Explicit error object from the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upstream error [{}]: {message}", .code.code())]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: ApiErrorCode::from_code(code),
            message: message.into(),
        }
    }
}

/// Upstream error codes, split into the ones the client acts on and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    ResultSetTooLarge,
    Other(i64),
}

impl ApiErrorCode {
    pub const fn from_code(code: i64) -> Self {
        match code {
            codes::RESULT_SET_TOO_LARGE => Self::ResultSetTooLarge,
            other => Self::Other(other),
        }
    }

    pub const fn code(self) -> i64 {
        match self {
            Self::ResultSetTooLarge => codes::RESULT_SET_TOO_LARGE,
            Self::Other(code) => code,
        }
    }
}
