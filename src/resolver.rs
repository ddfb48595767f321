//! SuiNS name resolution with a REST fallback.
//!
//! Address literals pass straight through. Domain names are lowercased and sent
//! to the fullnode's name service first; only if that yields nothing is the
//! independent REST resolver asked. At most two calls, never concurrent.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use crate::error::{ResolutionError, RpcCallError};
use crate::identifier::{CanonicalAddress, Identifier};
use crate::rpc::RpcClient;

/// A service that maps a normalized domain to an address.
pub trait NameService {
    /// Short label used in logs.
    fn label(&self) -> &'static str;

    /// `Ok(None)` when the service answered but knows no address for `domain`.
    fn lookup(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Option<String>, RpcCallError>> + Send;
}

/// Primary tier: `suix_resolveNameServiceAddress` on the ledger endpoint.
pub struct SuiNsRpc {
    rpc: Arc<RpcClient>,
}

impl SuiNsRpc {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

impl NameService for SuiNsRpc {
    fn label(&self) -> &'static str {
        "suins-rpc"
    }

    async fn lookup(&self, domain: &str) -> Result<Option<String>, RpcCallError> {
        self.rpc
            .call::<String>("suix_resolveNameServiceAddress", serde_json::json!([domain]))
            .await
    }
}

#[derive(Debug, Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct NameResponse {
    data: Option<String>,
    error: Option<serde_json::Value>,
}

/// Secondary tier: `POST {base}/name/address` on an independent resolver.
pub struct SuiNsRest {
    endpoint: String,
    http: Client,
}

impl SuiNsRest {
    pub fn new(base_url: &str, http: Client) -> Self {
        Self {
            endpoint: format!("{}/name/address", base_url.trim_end_matches('/')),
            http,
        }
    }
}

impl NameService for SuiNsRest {
    fn label(&self) -> &'static str {
        "suins-rest"
    }

    async fn lookup(&self, domain: &str) -> Result<Option<String>, RpcCallError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&NameRequest { name: domain })
            .send()
            .await?;

        let status = resp.status();
        let body: serde_json::Value = match resp.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => return Err(RpcCallError::Status(status)),
            Err(e) => return Err(RpcCallError::Protocol(format!("invalid JSON body: {}", e))),
        };
        let has_data = body.get("data").is_some();

        // The resolver reports unknown names as an error body, sometimes with a 4xx.
        let parsed: NameResponse = serde_json::from_value(body)
            .map_err(|e| RpcCallError::Protocol(format!("unexpected body shape: {}", e)))?;

        if let Some(err) = parsed.error.filter(|e| !e.is_null()) {
            let message = match err {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(RpcCallError::Rpc { code: 0, message });
        }

        if !status.is_success() {
            return Err(RpcCallError::Status(status));
        }

        if !has_data {
            return Err(RpcCallError::Protocol(
                "response has neither data nor error".to_string(),
            ));
        }

        Ok(parsed.data)
    }
}

/// Why one tier did not produce an address.
#[derive(Debug)]
enum Miss {
    NoRecord,
    Unreachable(String),
    Failed(String),
}

impl Miss {
    fn describe(&self) -> &str {
        match self {
            Miss::NoRecord => "no record",
            Miss::Unreachable(reason) | Miss::Failed(reason) => reason,
        }
    }
}

/// Two-tier resolver.
pub struct Resolver<P, S> {
    primary: P,
    secondary: S,
}

impl<P: NameService + Sync, S: NameService + Sync> Resolver<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub async fn resolve(&self, identifier: &Identifier) -> Result<CanonicalAddress, ResolutionError> {
        let domain = match identifier {
            Identifier::AddressLiteral(address) => return Ok(address.clone()),
            Identifier::DomainName(_) => identifier.normalized_domain().unwrap_or_default(),
        };

        let primary_miss = match attempt(&self.primary, &domain).await {
            Ok(address) => return Ok(address),
            Err(miss) => miss,
        };

        let secondary_miss = match attempt(&self.secondary, &domain).await {
            Ok(address) => return Ok(address),
            Err(miss) => miss,
        };

        let original = identifier.as_str().to_string();
        match (&primary_miss, &secondary_miss) {
            (Miss::Unreachable(_), Miss::Unreachable(_)) => {
                Err(ResolutionError::ServiceUnavailable {
                    domain: original,
                    reason: format!(
                        "{}: {}; {}: {}",
                        self.primary.label(),
                        primary_miss.describe(),
                        self.secondary.label(),
                        secondary_miss.describe()
                    ),
                })
            }
            _ => Err(ResolutionError::DomainNotRegistered { domain: original }),
        }
    }
}

async fn attempt<N: NameService>(service: &N, domain: &str) -> Result<CanonicalAddress, Miss> {
    tracing::debug!(service = service.label(), domain, "Resolving SuiNS domain");

    let miss = match service.lookup(domain).await {
        Ok(Some(raw)) => match CanonicalAddress::new(raw) {
            Some(address) => {
                tracing::info!(service = service.label(), domain, address = %address, "SuiNS domain resolved");
                return Ok(address);
            }
            None => Miss::NoRecord,
        },
        Ok(None) => Miss::NoRecord,
        Err(e) if e.is_unreachable() => Miss::Unreachable(e.to_string()),
        Err(e) => Miss::Failed(e.to_string()),
    };

    tracing::warn!(service = service.label(), domain, reason = miss.describe(), "SuiNS resolution attempt failed");
    Err(miss)
}
