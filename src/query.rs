//! Owned-object lookup against the ledger (`suix_getOwnedObjects`).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::QueryError;
use crate::identifier::{CanonicalAddress, TypeFilter};
use crate::rpc::RpcClient;

/// Display metadata attached by the object's Display template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDisplay {
    #[serde(default)]
    pub data: Option<DisplayFields>,
}

/// Move struct content; `fields` is free-form and differs per airdrop type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectContent {
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// One owned object as returned by the fullnode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOwnedObject {
    pub object_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(rename = "type", default)]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub display: Option<ObjectDisplay>,
    #[serde(default)]
    pub content: Option<ObjectContent>,
}

impl RawOwnedObject {
    pub fn display_fields(&self) -> Option<&DisplayFields> {
        self.display.as_ref().and_then(|d| d.data.as_ref())
    }

    pub fn content_fields(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.content.as_ref().map(|c| &c.fields)
    }
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    #[serde(default)]
    data: Option<RawOwnedObject>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnedObjectsPage {
    data: Vec<ObjectResponse>,
    #[serde(default)]
    has_next_page: bool,
}

/// Params for `suix_getOwnedObjects`: a single `StructType` predicate under `MatchAll`.
pub fn owned_objects_params(address: &CanonicalAddress, filter: &TypeFilter) -> serde_json::Value {
    serde_json::json!([
        address.as_str(),
        {
            "filter": {
                "MatchAll": [
                    { "StructType": filter.struct_type() }
                ]
            },
            "options": {
                "showContent": true,
                "showType": true,
                "showDisplay": true
            }
        }
    ])
}

pub struct ObjectQuery {
    rpc: Arc<RpcClient>,
}

impl ObjectQuery {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Fetch the first page of objects of type `filter` owned by `address`.
    ///
    /// Order is the ledger's. Later pages are not requested.
    pub async fn fetch_owned_objects(
        &self,
        address: &CanonicalAddress,
        filter: &TypeFilter,
    ) -> Result<Vec<RawOwnedObject>, QueryError> {
        tracing::debug!(address = %address, filter = %filter, "Querying owned objects");

        let page: OwnedObjectsPage = self
            .rpc
            .call("suix_getOwnedObjects", owned_objects_params(address, filter))
            .await
            .map_err(|e| {
                tracing::warn!(address = %address, error = %e, "Owned object query failed");
                QueryError::from(e)
            })?
            .ok_or_else(|| QueryError::Protocol("null result for suix_getOwnedObjects".to_string()))?;

        if page.has_next_page {
            tracing::warn!(
                address = %address,
                returned = page.data.len(),
                "More owned objects exist than one page; showing first page only"
            );
        }

        let objects: Vec<RawOwnedObject> = page
            .data
            .into_iter()
            .filter_map(|entry| {
                if entry.data.is_none() {
                    tracing::debug!(error = ?entry.error, "Skipping owned object entry without data");
                }
                entry.data
            })
            .collect();

        tracing::info!(address = %address, count = objects.len(), "Owned objects fetched");
        Ok(objects)
    }
}
