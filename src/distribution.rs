//! Lookup of the airdrop package's most recent `distribution::distribute` call.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::identifier::TypeFilter;
use crate::rpc::RpcClient;

pub const DISTRIBUTION_MODULE: &str = "distribution";
pub const DISTRIBUTION_FUNCTION: &str = "distribute";

#[derive(Debug, Deserialize)]
struct TxInput {
    #[serde(default)]
    data: Option<TxInputData>,
}

#[derive(Debug, Deserialize)]
struct TxInputData {
    #[serde(default)]
    sender: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxBlock {
    digest: String,
    #[serde(default)]
    timestamp_ms: Option<String>,
    #[serde(default)]
    transaction: Option<TxInput>,
    #[serde(default)]
    object_changes: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    effects: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TxPage {
    data: Vec<TxBlock>,
}

/// Summary of one distribution transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionTx {
    pub digest: String,
    pub timestamp_ms: Option<u64>,
    pub executed_at: Option<String>,
    pub sender: Option<String>,
    pub object_changes: usize,
    pub status: Option<String>,
}

impl From<TxBlock> for DistributionTx {
    fn from(tx: TxBlock) -> Self {
        let timestamp_ms = tx.timestamp_ms.as_deref().and_then(|t| t.parse::<u64>().ok());
        let executed_at = timestamp_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339());
        let status = tx
            .effects
            .as_ref()
            .and_then(|e| e.get("status"))
            .and_then(|s| s.get("status"))
            .and_then(|s| s.as_str())
            .map(str::to_string);

        Self {
            digest: tx.digest,
            timestamp_ms,
            executed_at,
            sender: tx.transaction.and_then(|t| t.data).and_then(|d| d.sender),
            object_changes: tx.object_changes.map(|c| c.len()).unwrap_or(0),
            status,
        }
    }
}

pub fn distribution_params(package: &str) -> serde_json::Value {
    serde_json::json!([
        {
            "filter": {
                "MoveFunction": {
                    "package": package,
                    "module": DISTRIBUTION_MODULE,
                    "function": DISTRIBUTION_FUNCTION
                }
            },
            "options": {
                "showEffects": true,
                "showObjectChanges": true,
                "showInput": true
            }
        },
        null,
        1,
        true
    ])
}

/// Newest distribution transaction for the package of `airdrop_type`, if any.
pub async fn latest_distribution(
    rpc: &RpcClient,
    airdrop_type: &TypeFilter,
) -> Result<Option<DistributionTx>, QueryError> {
    tracing::debug!(package = airdrop_type.package(), "Querying latest distribution transaction");

    let page: TxPage = rpc
        .call("suix_queryTransactionBlocks", distribution_params(airdrop_type.package()))
        .await?
        .ok_or_else(|| {
            QueryError::Protocol("null result for suix_queryTransactionBlocks".to_string())
        })?;

    Ok(page.data.into_iter().next().map(DistributionTx::from))
}
