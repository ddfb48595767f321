//! JSON-RPC 2.0 client for the Sui fullnode.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::RpcCallError;

/// Build the HTTP client shared by every outbound call.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    message: String,
}

/// Client for a single JSON-RPC endpoint. One attempt per call, no failover.
pub struct RpcClient {
    url: String,
    http: Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, http: Client) -> Self {
        Self {
            url: url.into(),
            http,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and decode `result`.
    ///
    /// `Ok(None)` means the server answered with `"result": null`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, RpcCallError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::debug!(url = %self.url, method, id = body.id, "Sending JSON-RPC request");

        let resp = self.http.post(&self.url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, method, status = %status, "RPC endpoint returned error status");
            return Err(RpcCallError::Status(status));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RpcCallError::Protocol(format!("invalid JSON body: {}", e)))?;

        decode_envelope(json, body.id)
    }
}

/// Decode a response envelope. `jsonrpc` must be `"2.0"` and `id` must echo the
/// request; error responses may carry a null `id`.
fn decode_envelope<T: DeserializeOwned>(
    json: serde_json::Value,
    expected_id: u64,
) -> Result<Option<T>, RpcCallError> {
    if json.get("jsonrpc").and_then(|v| v.as_str()) != Some("2.0") {
        return Err(RpcCallError::Protocol(
            "response is not a JSON-RPC 2.0 envelope".to_string(),
        ));
    }

    let error = json.get("error").filter(|e| !e.is_null());
    match json.get("id") {
        Some(id) if id.as_u64() == Some(expected_id) => {}
        Some(serde_json::Value::Null) if error.is_some() => {}
        other => {
            return Err(RpcCallError::Protocol(format!(
                "response id {:?} does not match request id {}",
                other, expected_id
            )))
        }
    }

    if let Some(err) = error {
        let err: RpcErrorObject = serde_json::from_value(err.clone())
            .map_err(|e| RpcCallError::Protocol(format!("malformed error object: {}", e)))?;
        return Err(RpcCallError::Rpc {
            code: err.code,
            message: err.message,
        });
    }

    match json.get("result") {
        None => Err(RpcCallError::Protocol(
            "response has neither result nor error".to_string(),
        )),
        Some(serde_json::Value::Null) => Ok(None),
        Some(result) => serde_json::from_value(result.clone())
            .map(Some)
            .map_err(|e| RpcCallError::Protocol(format!("unexpected result shape: {}", e))),
    }
}
