//! Error taxonomy for the explorer pipeline.
//!
//! Every error is terminal for the request that raised it. Callers convert the
//! top-level [`ExplorerError`] into one user-facing line with
//! [`ExplorerError::user_message`].

use thiserror::Error;

/// Failures of a single JSON-RPC or REST exchange.
#[derive(Error, Debug)]
pub enum RpcCallError {
    /// The endpoint could not be reached or the connection broke mid-flight.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success HTTP status.
    #[error("endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
    /// The server returned a JSON-RPC `error` object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    /// The response did not match the documented shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl RpcCallError {
    /// True when the endpoint never produced an answer we could read.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RpcCallError::Transport(_) | RpcCallError::Status(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please enter a wallet address or SuiNS domain")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Neither name service produced an address. Carries the identifier as typed.
    #[error("domain \"{domain}\" is not registered")]
    DomainNotRegistered { domain: String },
    /// Both name services were unreachable, so registration is unknown.
    #[error("name services unavailable while resolving \"{domain}\": {reason}")]
    ServiceUnavailable { domain: String, reason: String },
}

impl ResolutionError {
    pub fn domain(&self) -> &str {
        match self {
            ResolutionError::DomainNotRegistered { domain }
            | ResolutionError::ServiceUnavailable { domain, .. } => domain,
        }
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    /// Protocol-level error reported by the ledger, message kept verbatim.
    #[error("{message}")]
    RpcError { code: i64, message: String },
    #[error("ledger endpoint unreachable: {0}")]
    Transport(String),
    #[error("unexpected ledger response: {0}")]
    Protocol(String),
}

impl From<RpcCallError> for QueryError {
    fn from(err: RpcCallError) -> Self {
        match err {
            RpcCallError::Rpc { code, message } => QueryError::RpcError { code, message },
            RpcCallError::Transport(e) => QueryError::Transport(e.to_string()),
            RpcCallError::Status(status) => QueryError::Transport(format!("HTTP {}", status)),
            RpcCallError::Protocol(msg) => QueryError::Protocol(msg),
        }
    }
}

/// Top-level error of one search request.
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Query(#[from] QueryError),
    /// A newer request was started; this one must not publish anything.
    #[error("request {generation} superseded by a newer search")]
    Superseded { generation: u64 },
}

impl ExplorerError {
    /// The single message shown to the user for this failure.
    ///
    /// Both resolution failures share one message; the variants stay distinct
    /// for logging and for the HTTP status mapping.
    pub fn user_message(&self) -> String {
        match self {
            ExplorerError::Input(e) => e.to_string(),
            ExplorerError::Resolution(e) => format!(
                "Could not resolve SuiNS domain \"{}\". The domain may not be registered.",
                e.domain()
            ),
            ExplorerError::Query(QueryError::RpcError { message, .. }) => message.clone(),
            ExplorerError::Query(e) => e.to_string(),
            ExplorerError::Superseded { .. } => "Search cancelled".to_string(),
        }
    }
}
